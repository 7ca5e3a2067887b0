use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, ScheduleEntry};

/// Headline figures of a schedule, as shown on summary cards and quoted in
/// contract narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub total_principal: Money,
    pub total_interest: Money,
    pub total_fees: Money,
    pub total_repayment: Money,
    /// Most frequent installment amount; "the monthly payment" even for
    /// schedules that are not level.
    pub representative_installment: Money,
    pub number_of_payments: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity_date: Option<NaiveDate>,
    pub final_payment: Money,
}

/// Sums saturate at the decimal range instead of panicking. Schedules from
/// the generator never get there; hand-built ones from outer surfaces might.
pub fn summarize(schedule: &[ScheduleEntry]) -> Totals {
    let sum = |field: fn(&ScheduleEntry) -> Money| {
        schedule
            .iter()
            .map(field)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    };
    let total_principal = sum(|e| e.principal_portion);
    let total_interest = sum(|e| e.interest_portion);
    let total_fees = sum(|e| e.management_fee_portion);

    Totals {
        total_principal,
        total_interest,
        total_fees,
        total_repayment: total_principal
            .saturating_add(total_interest)
            .saturating_add(total_fees),
        representative_installment: modal_payment(schedule),
        number_of_payments: schedule.len() as u32,
        first_due_date: schedule.first().map(|e| e.due_date),
        maturity_date: schedule.last().map(|e| e.due_date),
        final_payment: schedule
            .last()
            .map(|e| e.total_payment)
            .unwrap_or(Decimal::ZERO),
    }
}

/// Modal `total_payment`; ties go to the amount that appears first.
fn modal_payment(schedule: &[ScheduleEntry]) -> Money {
    // normalize() so 100.0 and 100.00 count as the same amount
    let mut counts: HashMap<Decimal, (usize, usize)> = HashMap::new();
    for (idx, entry) in schedule.iter().enumerate() {
        let slot = counts
            .entry(entry.total_payment.normalize())
            .or_insert((0, idx));
        slot.0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(_, (_, first))| schedule[first].total_payment)
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::test_support::terms;
    use crate::schedule::generator::generate_schedule;
    use crate::types::CalculationMethod;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_summarize_reducing_balance() {
        let t = terms(dec!(1_200_000), dec!(0.035), Decimal::ZERO, 12, CalculationMethod::ReducingBalance);
        let totals = summarize(&generate_schedule(&t));

        assert_eq!(totals.total_principal, dec!(1_200_000));
        assert_eq!(totals.total_interest, dec!(290168.87));
        assert_eq!(totals.total_fees, Decimal::ZERO);
        assert_eq!(totals.total_repayment, dec!(1490168.87));
        assert_eq!(totals.representative_installment, dec!(124180.74));
        assert_eq!(totals.final_payment, dec!(124180.73));
        assert_eq!(totals.number_of_payments, 12);
        assert_eq!(totals.first_due_date, NaiveDate::from_ymd_opt(2025, 2, 1));
        assert_eq!(totals.maturity_date, NaiveDate::from_ymd_opt(2026, 1, 1));
    }

    #[test]
    fn test_balloon_representative_installment_is_interest_payment() {
        let t = terms(dec!(500_000), dec!(0.02), dec!(0.005), 4, CalculationMethod::BalloonStructure);
        let totals = summarize(&generate_schedule(&t));

        assert_eq!(totals.representative_installment, dec!(12500));
        assert_eq!(totals.final_payment, dec!(512500));
        assert_eq!(totals.total_interest, dec!(40000));
        assert_eq!(totals.total_fees, dec!(10000));
        assert_eq!(totals.total_repayment, dec!(550000));
    }

    #[test]
    fn test_modal_tie_prefers_first_amount() {
        let t = terms(dec!(1000), dec!(0.02), dec!(0.01), 2, CalculationMethod::FlatRate);
        let mut schedule = generate_schedule(&t);
        schedule[1].total_payment = dec!(999);
        assert_eq!(modal_payment(&schedule), schedule[0].total_payment);
    }

    #[test]
    fn test_summarize_saturates_instead_of_panicking() {
        let t = terms(dec!(1000), dec!(0.02), dec!(0.01), 2, CalculationMethod::FlatRate);
        let mut schedule = generate_schedule(&t);
        for entry in &mut schedule {
            entry.interest_portion = Decimal::MAX;
        }
        let totals = summarize(&schedule);
        assert_eq!(totals.total_interest, Decimal::MAX);
        assert_eq!(totals.total_repayment, Decimal::MAX);
    }

    #[test]
    fn test_summarize_empty_schedule() {
        let totals = summarize(&[]);
        assert_eq!(totals.total_repayment, Decimal::ZERO);
        assert_eq!(totals.representative_installment, Decimal::ZERO);
        assert_eq!(totals.number_of_payments, 0);
        assert_eq!(totals.first_due_date, None);
        assert_eq!(totals.maturity_date, None);
    }
}
