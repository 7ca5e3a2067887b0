use amortization_core::{
    build_repayment_schedule, embed_schedule_table, summarize, to_display_table,
    to_persistence_rows, DisplayLocale, ScheduleEntry, ScheduleRequest,
};
use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_schedule(schedule_json: &str) -> NapiResult<Vec<ScheduleEntry>> {
    serde_json::from_str(schedule_json).map_err(to_napi_error)
}

/// A locale is either a preset tag ("en-US", "fr-XOF") or a full
/// `DisplayLocale` object as JSON.
fn parse_locale(locale: &str) -> NapiResult<DisplayLocale> {
    if locale.trim_start().starts_with('{') {
        serde_json::from_str(locale).map_err(to_napi_error)
    } else {
        DisplayLocale::from_tag(locale).map_err(to_napi_error)
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let input: ScheduleRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = build_repayment_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn summarize_schedule(schedule_json: String) -> NapiResult<String> {
    let schedule = parse_schedule(&schedule_json)?;
    serde_json::to_string(&summarize(&schedule)).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Formatters
// ---------------------------------------------------------------------------

#[napi]
pub fn persistence_rows(schedule_json: String, loan_id: String) -> NapiResult<String> {
    if loan_id.trim().is_empty() {
        return Err(to_napi_error("loan_id must not be empty"));
    }
    let schedule = parse_schedule(&schedule_json)?;
    let rows = to_persistence_rows(&schedule, &loan_id);
    serde_json::to_string(&rows).map_err(to_napi_error)
}

#[napi]
pub fn display_table(schedule_json: String, locale: String) -> NapiResult<String> {
    let schedule = parse_schedule(&schedule_json)?;
    let locale = parse_locale(&locale)?;
    Ok(to_display_table(&schedule, &locale))
}

#[napi]
pub fn embed_contract_schedule(
    template: String,
    schedule_json: String,
    locale: String,
) -> NapiResult<String> {
    let schedule = parse_schedule(&schedule_json)?;
    let locale = parse_locale(&locale)?;
    Ok(embed_schedule_table(&template, &schedule, &locale))
}
