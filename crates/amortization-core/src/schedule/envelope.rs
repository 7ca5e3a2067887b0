use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::warn;

use super::generator::{try_generate_schedule, ScheduleOptions};
use super::totals::{summarize, Totals};
use crate::error::AmortizationError;
use crate::types::{
    with_metadata, CalculationMethod, ComputationOutput, LoanTerms, Money, Rate, ScheduleEntry,
};
use crate::AmortizationResult;

/// Longest term accepted on the strict path (50 years).
pub const MAX_TERM_MONTHS: i32 = 600;

/// Loan terms as received from an outer surface (CLI, bindings, stored
/// applications), with the method still in its textual form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub principal: Money,
    pub monthly_interest_rate: Rate,
    #[serde(default)]
    pub monthly_management_fee_rate: Rate,
    pub term_months: i32,
    pub disbursement_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_method: Option<String>,
    #[serde(default)]
    pub options: ScheduleOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub calculation_method: CalculationMethod,
    pub schedule: Vec<ScheduleEntry>,
    pub totals: Totals,
}

impl ScheduleRequest {
    /// Resolve the textual method into typed [`LoanTerms`].
    ///
    /// Unknown methods are an error unless `options.legacy_method_names` is
    /// set, in which case they fall back to reducing balance and a warning
    /// is appended.
    pub fn resolve_terms(&self, warnings: &mut Vec<String>) -> AmortizationResult<LoanTerms> {
        let calculation_method = match self.calculation_method.as_deref() {
            None => CalculationMethod::default(),
            Some(name) if self.options.legacy_method_names => {
                let (method, fell_back) = CalculationMethod::parse_lenient(name);
                if fell_back {
                    warn!(method = name, "unknown calculation method, using reducing balance");
                    warnings.push(format!(
                        "Unknown calculation method '{name}'; reducing balance applied"
                    ));
                }
                method
            }
            Some(name) => name.parse()?,
        };

        Ok(LoanTerms {
            principal: self.principal,
            monthly_interest_rate: self.monthly_interest_rate,
            monthly_management_fee_rate: self.monthly_management_fee_rate,
            term_months: self.term_months,
            disbursement_date: self.disbursement_date,
            calculation_method,
        })
    }
}

/// Generate a schedule and its totals, wrapped in the standard envelope.
///
/// Stricter than [`super::generate_schedule`]: negative rates, overlong terms,
/// unknown methods, due dates past the calendar range and amounts past the
/// decimal range are reported as errors. Incomplete terms (principal
/// or term not positive) still produce an empty schedule, with a warning.
pub fn build_repayment_schedule(
    request: &ScheduleRequest,
) -> AmortizationResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let terms = request.resolve_terms(&mut warnings)?;
    validate_terms(&terms)?;

    if terms.principal <= Decimal::ZERO {
        warnings.push("Principal is not positive; no schedule generated".into());
    }
    if terms.term_months <= 0 {
        warnings.push("Term is not positive; no schedule generated".into());
    }

    let schedule = try_generate_schedule(&terms, &request.options)?;
    let totals = summarize(&schedule);

    let output = ScheduleOutput {
        calculation_method: terms.calculation_method,
        schedule,
        totals,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology(terms.calculation_method),
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "monthly_interest_rate": terms.monthly_interest_rate.to_string(),
            "monthly_management_fee_rate": terms.monthly_management_fee_rate.to_string(),
            "term_months": terms.term_months,
            "disbursement_date": terms.disbursement_date.to_string(),
            "rounding": request.options.rounding,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn methodology(method: CalculationMethod) -> &'static str {
    match method {
        CalculationMethod::FlatRate => {
            "Flat rate: interest and fees on original principal, equal principal instalments"
        }
        CalculationMethod::ReducingBalance => {
            "Reducing balance: level EMI on combined rate, interest and fees on declining balance"
        }
        CalculationMethod::BalloonStructure => {
            "Balloon: interest and fees only, full principal in final instalment"
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_terms(terms: &LoanTerms) -> AmortizationResult<()> {
    if terms.monthly_interest_rate < Decimal::ZERO {
        return Err(AmortizationError::InvalidInput {
            field: "monthly_interest_rate".into(),
            reason: "Interest rate must be non-negative".into(),
        });
    }
    if terms.monthly_management_fee_rate < Decimal::ZERO {
        return Err(AmortizationError::InvalidInput {
            field: "monthly_management_fee_rate".into(),
            reason: "Management fee rate must be non-negative".into(),
        });
    }
    if terms.term_months > MAX_TERM_MONTHS {
        return Err(AmortizationError::InvalidInput {
            field: "term_months".into(),
            reason: format!("Term cannot exceed {MAX_TERM_MONTHS} months"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(method: Option<&str>) -> ScheduleRequest {
        ScheduleRequest {
            principal: dec!(1_200_000),
            monthly_interest_rate: dec!(0.035),
            monthly_management_fee_rate: Decimal::ZERO,
            term_months: 12,
            disbursement_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            calculation_method: method.map(String::from),
            options: ScheduleOptions::default(),
        }
    }

    #[test]
    fn test_envelope_carries_schedule_and_totals() {
        let out = build_repayment_schedule(&request(Some("reducing_balance"))).unwrap();
        assert_eq!(out.result.schedule.len(), 12);
        assert_eq!(out.result.totals.total_principal, dec!(1_200_000));
        assert_eq!(out.result.calculation_method, CalculationMethod::ReducingBalance);
        assert!(out.warnings.is_empty());
        assert!(out.methodology.contains("Reducing balance"));
        assert_eq!(out.assumptions["term_months"], 12);
    }

    #[test]
    fn test_missing_method_defaults_to_reducing_balance() {
        let out = build_repayment_schedule(&request(None)).unwrap();
        assert_eq!(out.result.calculation_method, CalculationMethod::ReducingBalance);
    }

    #[test]
    fn test_unknown_method_rejected_without_legacy_flag() {
        let err = build_repayment_schedule(&request(Some("emi"))).unwrap_err();
        assert!(matches!(err, AmortizationError::UnknownMethod(_)));
    }

    #[test]
    fn test_legacy_flag_accepts_aliases_and_warns_on_fallback() {
        let mut req = request(Some("emi"));
        req.options.legacy_method_names = true;
        let out = build_repayment_schedule(&req).unwrap();
        assert_eq!(out.result.calculation_method, CalculationMethod::ReducingBalance);
        assert!(out.warnings.is_empty());

        req.calculation_method = Some("quarterly-special".into());
        let out = build_repayment_schedule(&req).unwrap();
        assert_eq!(out.result.calculation_method, CalculationMethod::ReducingBalance);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("quarterly-special"));
    }

    #[test]
    fn test_negative_rate_is_invalid_input() {
        let mut req = request(None);
        req.monthly_interest_rate = dec!(-0.01);
        let err = build_repayment_schedule(&req).unwrap_err();
        match err {
            AmortizationError::InvalidInput { field, .. } => {
                assert_eq!(field, "monthly_interest_rate")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_overlong_term_is_invalid_input() {
        let mut req = request(None);
        req.term_months = 601;
        assert!(build_repayment_schedule(&req).is_err());
    }

    #[test]
    fn test_due_date_past_calendar_end_is_date_error() {
        let mut req = request(None);
        req.principal = dec!(1000);
        req.disbursement_date = NaiveDate::MAX - chrono::Days::new(40);
        let err = build_repayment_schedule(&req).unwrap_err();
        assert!(matches!(err, AmortizationError::DateError(_)));
    }

    #[test]
    fn test_out_of_range_principal_is_an_error_not_a_panic() {
        for method in ["flat_rate", "reducing_balance", "balloon_structure"] {
            let mut req = request(Some(method));
            req.principal = Decimal::MAX;
            req.monthly_interest_rate = dec!(0.5);
            let err = build_repayment_schedule(&req).unwrap_err();
            assert!(matches!(err, AmortizationError::Overflow { .. }), "{method}: {err:?}");
        }
    }

    #[test]
    fn test_incomplete_terms_warn_with_empty_schedule() {
        let mut req = request(None);
        req.principal = Decimal::ZERO;
        let out = build_repayment_schedule(&req).unwrap();
        assert!(out.result.schedule.is_empty());
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.result.totals.total_repayment, Decimal::ZERO);
    }

    #[test]
    fn test_request_from_json() {
        let json = r#"{
            "principal": "300000",
            "monthly_interest_rate": "0.04",
            "monthly_management_fee_rate": "0.01",
            "term_months": 6,
            "disbursement_date": "2025-06-10",
            "calculation_method": "flat_rate",
            "options": { "rounding": "bankers" }
        }"#;
        let req: ScheduleRequest = serde_json::from_str(json).unwrap();
        assert!(!req.options.legacy_method_names);
        let out = build_repayment_schedule(&req).unwrap();
        assert_eq!(out.result.calculation_method, CalculationMethod::FlatRate);
        assert_eq!(out.result.schedule[0].total_payment, dec!(65000));
    }
}
