use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AmortizationError;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.035 = 3.5% per month). Never as percentages.
pub type Rate = Decimal;

/// How a loan's installments are split between principal, interest and fees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    /// Interest and fees charged on the original principal every month.
    FlatRate,
    /// Level installment (EMI), interest and fees on the declining balance.
    #[default]
    ReducingBalance,
    /// Interest and fees only, full principal repaid in the last month.
    BalloonStructure,
}

impl CalculationMethod {
    pub const ALL: [CalculationMethod; 3] = [
        CalculationMethod::FlatRate,
        CalculationMethod::ReducingBalance,
        CalculationMethod::BalloonStructure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationMethod::FlatRate => "flat_rate",
            CalculationMethod::ReducingBalance => "reducing_balance",
            CalculationMethod::BalloonStructure => "balloon_structure",
        }
    }

    /// Parse a method name as stored by older loan applications.
    ///
    /// Accepts the historical aliases (`flat`, `emi`, `pmt`, `declining`,
    /// `balloon`, ...) and falls back to [`CalculationMethod::ReducingBalance`]
    /// for anything unrecognised. The boolean is `true` when that fallback
    /// was taken, so callers can surface it.
    pub fn parse_lenient(value: &str) -> (CalculationMethod, bool) {
        match value.parse::<CalculationMethod>() {
            Ok(method) => (method, false),
            Err(_) => match normalize(value).as_str() {
                "flat" | "simple" | "fixed" => (CalculationMethod::FlatRate, false),
                "emi" | "pmt" | "annuity" | "reducing" | "declining" | "declining_balance"
                | "amortized" => (CalculationMethod::ReducingBalance, false),
                "balloon" | "bullet" | "interest_only" => {
                    (CalculationMethod::BalloonStructure, false)
                }
                _ => (CalculationMethod::ReducingBalance, true),
            },
        }
    }
}

impl fmt::Display for CalculationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalculationMethod {
    type Err = AmortizationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "flat_rate" | "flatrate" => Ok(CalculationMethod::FlatRate),
            "reducing_balance" | "reducingbalance" => Ok(CalculationMethod::ReducingBalance),
            "balloon_structure" | "balloonstructure" => Ok(CalculationMethod::BalloonStructure),
            _ => Err(AmortizationError::UnknownMethod(s.to_string())),
        }
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

/// Terms of a single loan, as captured at origination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub monthly_interest_rate: Rate,
    #[serde(default)]
    pub monthly_management_fee_rate: Rate,
    /// Signed so that a half-filled form (0 or negative) maps to "no schedule yet".
    pub term_months: i32,
    pub disbursement_date: NaiveDate,
    #[serde(default)]
    pub calculation_method: CalculationMethod,
}

impl LoanTerms {
    /// Combined monthly rate used for level-installment methods; `None` if
    /// the sum leaves the decimal range.
    pub fn combined_rate(&self) -> Option<Rate> {
        self.monthly_interest_rate
            .checked_add(self.monthly_management_fee_rate)
    }

    /// True when the terms are complete enough to produce a schedule.
    pub fn is_schedulable(&self) -> bool {
        self.principal > Decimal::ZERO
            && self.term_months > 0
            && self.monthly_interest_rate >= Decimal::ZERO
            && self.monthly_management_fee_rate >= Decimal::ZERO
    }
}

/// One row of a repayment schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub payment_number: u32,
    pub due_date: NaiveDate,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub management_fee_portion: Money,
    /// Always `principal_portion + interest_portion + management_fee_portion`.
    pub total_payment: Money,
    pub remaining_balance: Money,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_strict_parse_accepts_canonical_names() {
        assert_eq!(
            "flat_rate".parse::<CalculationMethod>().unwrap(),
            CalculationMethod::FlatRate
        );
        assert_eq!(
            "Reducing-Balance".parse::<CalculationMethod>().unwrap(),
            CalculationMethod::ReducingBalance
        );
        assert_eq!(
            "BalloonStructure".parse::<CalculationMethod>().unwrap(),
            CalculationMethod::BalloonStructure
        );
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        let err = "emi".parse::<CalculationMethod>().unwrap_err();
        assert!(matches!(err, AmortizationError::UnknownMethod(ref m) if m == "emi"));
    }

    #[test]
    fn test_lenient_parse_aliases_and_fallback() {
        assert_eq!(
            CalculationMethod::parse_lenient("emi"),
            (CalculationMethod::ReducingBalance, false)
        );
        assert_eq!(
            CalculationMethod::parse_lenient("Flat"),
            (CalculationMethod::FlatRate, false)
        );
        assert_eq!(
            CalculationMethod::parse_lenient("balloon"),
            (CalculationMethod::BalloonStructure, false)
        );
        assert_eq!(
            CalculationMethod::parse_lenient("weekly-magic"),
            (CalculationMethod::ReducingBalance, true)
        );
    }

    #[test]
    fn test_loan_terms_deserialize_defaults() {
        let json = r#"{
            "principal": "250000",
            "monthly_interest_rate": "0.03",
            "term_months": 6,
            "disbursement_date": "2025-03-15"
        }"#;
        let terms: LoanTerms = serde_json::from_str(json).unwrap();
        assert_eq!(terms.monthly_management_fee_rate, Decimal::ZERO);
        assert_eq!(terms.calculation_method, CalculationMethod::ReducingBalance);
        assert_eq!(terms.combined_rate(), Some(dec!(0.03)));
        assert!(terms.is_schedulable());
    }

    #[test]
    fn test_negative_rate_is_not_schedulable() {
        let terms = LoanTerms {
            principal: dec!(1000),
            monthly_interest_rate: dec!(-0.01),
            monthly_management_fee_rate: Decimal::ZERO,
            term_months: 3,
            disbursement_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            calculation_method: CalculationMethod::FlatRate,
        };
        assert!(!terms.is_schedulable());
    }
}
