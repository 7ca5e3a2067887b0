//! Period iteration for repayment schedules.
//!
//! A schedule is a pure function of [`LoanTerms`]: the same terms always
//! yield the same entries. The generator never reads the clock; the
//! disbursement date is always supplied by the caller.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AmortizationError;
use crate::methods::payment_method_for;
use crate::rounding::{RoundingMode, RoundingPolicy};
use crate::types::{LoanTerms, ScheduleEntry};
use crate::AmortizationResult;

/// Knobs callers may set around schedule generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleOptions {
    pub rounding: RoundingMode,
    /// Accept legacy method names and fall back to reducing balance for
    /// unknown ones instead of rejecting them.
    pub legacy_method_names: bool,
}

/// Generate the repayment schedule with default options.
///
/// Returns an empty schedule when the terms are not complete yet
/// (non-positive principal or term) or violate the input contract
/// (negative rates, due dates beyond the calendar range, amounts beyond
/// the decimal range). Never panics.
pub fn generate_schedule(terms: &LoanTerms) -> Vec<ScheduleEntry> {
    generate_schedule_with(terms, &ScheduleOptions::default())
}

pub fn generate_schedule_with(terms: &LoanTerms, options: &ScheduleOptions) -> Vec<ScheduleEntry> {
    try_generate_schedule(terms, options).unwrap_or_else(|e| {
        warn!(error = %e, "no schedule produced");
        Vec::new()
    })
}

/// Like [`generate_schedule_with`], but contract violations are returned as
/// errors instead of an empty schedule. Incomplete terms still yield `Ok`
/// with no entries.
pub fn try_generate_schedule(
    terms: &LoanTerms,
    options: &ScheduleOptions,
) -> AmortizationResult<Vec<ScheduleEntry>> {
    if terms.principal <= Decimal::ZERO || terms.term_months <= 0 {
        return Ok(Vec::new());
    }
    if !terms.is_schedulable() {
        return Err(AmortizationError::InvalidInput {
            field: "monthly_interest_rate".into(),
            reason: format!(
                "Rates must be non-negative (interest {}, fee {})",
                terms.monthly_interest_rate, terms.monthly_management_fee_rate
            ),
        });
    }

    let n = terms.term_months as u32;
    // Checked up front: the last due date is the latest one.
    if due_date(terms.disbursement_date, n).is_none() {
        return Err(AmortizationError::DateError(format!(
            "{} plus {} months is beyond the supported calendar range",
            terms.disbursement_date, n
        )));
    }

    let policy = RoundingPolicy::new(options.rounding);
    let method = payment_method_for(terms, &policy)?;
    let overflow = |period: u32| AmortizationError::Overflow {
        context: format!("period {period} amounts"),
    };

    let mut schedule = Vec::with_capacity(n as usize);
    let mut remaining = policy.round(terms.principal);
    // Running sum of installments, so totals over the schedule stay in range.
    let mut repaid = Decimal::ZERO;

    for i in 1..=n {
        let due_date = due_date(terms.disbursement_date, i)
            .ok_or_else(|| AmortizationError::DateError(format!("period {i} due date")))?;

        let mut split = method
            .compute_period(remaining, terms, i)
            .ok_or_else(|| overflow(i))?;
        if i == n {
            split = policy.finalize_last_period(split, remaining);
        }
        let mut split = policy.round_split(split);
        split.principal = split.principal.clamp(Decimal::ZERO, remaining);

        let total_payment = split.total().ok_or_else(|| overflow(i))?;
        repaid = repaid.checked_add(total_payment).ok_or_else(|| overflow(i))?;

        remaining -= split.principal;
        if remaining < Decimal::ZERO {
            remaining = Decimal::ZERO;
        }

        schedule.push(ScheduleEntry {
            payment_number: i,
            due_date,
            principal_portion: split.principal,
            interest_portion: split.interest,
            management_fee_portion: split.fee,
            total_payment,
            remaining_balance: remaining,
        });
    }

    debug!(
        method = %method.method(),
        periods = schedule.len(),
        principal = %terms.principal,
        "repayment schedule generated"
    );

    Ok(schedule)
}

/// Due date of period `period`: the disbursement date plus that many months.
pub fn due_date(disbursement_date: NaiveDate, period: u32) -> Option<NaiveDate> {
    disbursement_date.checked_add_months(Months::new(period))
}
