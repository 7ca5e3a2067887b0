use rust_decimal::Decimal;

use super::{PaymentMethod, PeriodSplit};
use crate::types::{CalculationMethod, LoanTerms, Money};

/// Interest and fee charged on the original principal for the whole term,
/// spread evenly over the installments.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatRate;

impl PaymentMethod for FlatRate {
    fn method(&self) -> CalculationMethod {
        CalculationMethod::FlatRate
    }

    fn compute_period(
        &self,
        _remaining_balance: Money,
        terms: &LoanTerms,
        _period_index: u32,
    ) -> Option<PeriodSplit> {
        let n = Decimal::from(terms.term_months.max(1));
        let total_interest = terms
            .principal
            .checked_mul(terms.monthly_interest_rate)?
            .checked_mul(n)?;
        let total_fee = terms
            .principal
            .checked_mul(terms.monthly_management_fee_rate)?
            .checked_mul(n)?;

        Some(PeriodSplit {
            principal: terms.principal / n,
            interest: total_interest / n,
            fee: total_fee / n,
        })
    }
}
