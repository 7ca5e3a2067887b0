use rust_decimal::Decimal;

use super::{PaymentMethod, PeriodSplit};
use crate::types::{CalculationMethod, LoanTerms, Money};

/// Interest and fee only until maturity; the principal is repaid in one
/// balloon payment with the last installment.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalloonStructure;

impl PaymentMethod for BalloonStructure {
    fn method(&self) -> CalculationMethod {
        CalculationMethod::BalloonStructure
    }

    fn compute_period(
        &self,
        remaining_balance: Money,
        terms: &LoanTerms,
        period_index: u32,
    ) -> Option<PeriodSplit> {
        let is_final = i64::from(period_index) >= i64::from(terms.term_months);

        Some(PeriodSplit {
            principal: if is_final {
                remaining_balance
            } else {
                Decimal::ZERO
            },
            interest: remaining_balance.checked_mul(terms.monthly_interest_rate)?,
            fee: remaining_balance.checked_mul(terms.monthly_management_fee_rate)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::test_support::terms;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balloon_interest_only_until_maturity() {
        let t = terms(dec!(500_000), dec!(0.02), dec!(0.005), 4, CalculationMethod::BalloonStructure);

        let early = BalloonStructure.compute_period(dec!(500_000), &t, 1).unwrap();
        assert_eq!(early.principal, Decimal::ZERO);
        assert_eq!(early.interest, dec!(10_000));
        assert_eq!(early.fee, dec!(2_500));

        let last = BalloonStructure.compute_period(dec!(500_000), &t, 4).unwrap();
        assert_eq!(last.principal, dec!(500_000));
        assert_eq!(last.total(), Some(dec!(512_500)));
    }

    #[test]
    fn test_balloon_out_of_range_interest() {
        let t = terms(Decimal::MAX, dec!(2), Decimal::ZERO, 4, CalculationMethod::BalloonStructure);
        assert_eq!(BalloonStructure.compute_period(Decimal::MAX, &t, 1), None);
    }
}
