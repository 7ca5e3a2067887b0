//! Payment methods: how one period's installment splits into principal,
//! interest and management fee.

pub mod balloon;
pub mod flat_rate;
pub mod reducing_balance;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rounding::RoundingPolicy;
use crate::types::{CalculationMethod, LoanTerms, Money};
use crate::AmortizationResult;

pub use balloon::BalloonStructure;
pub use flat_rate::FlatRate;
pub use reducing_balance::ReducingBalance;

/// Decomposition of a single period's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSplit {
    pub principal: Money,
    pub interest: Money,
    pub fee: Money,
}

impl PeriodSplit {
    /// Sum of the three components; `None` if it leaves the decimal range.
    pub fn total(&self) -> Option<Money> {
        self.principal
            .checked_add(self.interest)?
            .checked_add(self.fee)
    }
}

impl Default for PeriodSplit {
    fn default() -> Self {
        Self {
            principal: Decimal::ZERO,
            interest: Decimal::ZERO,
            fee: Decimal::ZERO,
        }
    }
}

pub trait PaymentMethod: Send + Sync {
    fn method(&self) -> CalculationMethod;

    /// Split for period `period_index` (1-based) given the balance still
    /// outstanding before that period's payment. `None` when an amount
    /// leaves the decimal range.
    fn compute_period(
        &self,
        remaining_balance: Money,
        terms: &LoanTerms,
        period_index: u32,
    ) -> Option<PeriodSplit>;
}

/// Build the strategy for `terms.calculation_method`.
pub fn payment_method_for(
    terms: &LoanTerms,
    policy: &RoundingPolicy,
) -> AmortizationResult<Box<dyn PaymentMethod>> {
    Ok(match terms.calculation_method {
        CalculationMethod::FlatRate => Box::new(FlatRate),
        CalculationMethod::ReducingBalance => Box::new(ReducingBalance::new(terms, *policy)?),
        CalculationMethod::BalloonStructure => Box::new(BalloonStructure),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::types::{CalculationMethod, LoanTerms, Rate};

    pub fn terms(
        principal: Decimal,
        rate: Rate,
        fee_rate: Rate,
        term_months: i32,
        method: CalculationMethod,
    ) -> LoanTerms {
        LoanTerms {
            principal,
            monthly_interest_rate: rate,
            monthly_management_fee_rate: fee_rate,
            term_months,
            disbursement_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            calculation_method: method,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::terms;
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_factory_selects_declared_method() {
        let policy = RoundingPolicy::default();
        for method in CalculationMethod::ALL {
            let t = terms(dec!(1000), dec!(0.02), dec!(0.01), 6, method);
            let strategy = payment_method_for(&t, &policy).unwrap();
            assert_eq!(strategy.method(), method);
        }
    }

    #[test]
    fn test_split_total() {
        let split = PeriodSplit {
            principal: dec!(100.10),
            interest: dec!(20.02),
            fee: dec!(3.33),
        };
        assert_eq!(split.total(), Some(dec!(123.45)));
    }

    #[test]
    fn test_split_total_overflow() {
        let split = PeriodSplit {
            principal: Decimal::MAX,
            interest: dec!(1),
            fee: Decimal::ZERO,
        };
        assert_eq!(split.total(), None);
    }
}
