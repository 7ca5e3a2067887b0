use rust_decimal::Decimal;

use super::{PaymentMethod, PeriodSplit};
use crate::error::AmortizationError;
use crate::rounding::RoundingPolicy;
use crate::time_value::level_installment;
use crate::types::{CalculationMethod, LoanTerms, Money};
use crate::AmortizationResult;

/// Equated monthly installment (EMI/PMT) on the combined interest + fee
/// rate, with interest and fee charged on the declining balance.
#[derive(Debug, Clone, Copy)]
pub struct ReducingBalance {
    /// Rounded once so every non-final period pays the identical total.
    installment: Money,
    policy: RoundingPolicy,
}

impl ReducingBalance {
    pub fn new(terms: &LoanTerms, policy: RoundingPolicy) -> AmortizationResult<Self> {
        let nper = u32::try_from(terms.term_months).unwrap_or(0);
        let rate = terms.combined_rate().ok_or_else(|| AmortizationError::Overflow {
            context: "combined monthly rate".into(),
        })?;
        let raw = level_installment(terms.principal, rate, nper)?;
        Ok(Self {
            installment: policy.round(raw),
            policy,
        })
    }

    pub fn installment(&self) -> Money {
        self.installment
    }
}

impl PaymentMethod for ReducingBalance {
    fn method(&self) -> CalculationMethod {
        CalculationMethod::ReducingBalance
    }

    fn compute_period(
        &self,
        remaining_balance: Money,
        terms: &LoanTerms,
        _period_index: u32,
    ) -> Option<PeriodSplit> {
        let interest = self
            .policy
            .round(remaining_balance.checked_mul(terms.monthly_interest_rate)?);
        let fee = self
            .policy
            .round(remaining_balance.checked_mul(terms.monthly_management_fee_rate)?);
        let principal = self
            .installment
            .checked_sub(interest)?
            .checked_sub(fee)?
            .max(Decimal::ZERO);

        Some(PeriodSplit {
            principal,
            interest,
            fee,
        })
    }
}
