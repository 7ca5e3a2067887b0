use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use amortization_core::rounding::RoundingMode;
use amortization_core::{
    build_repayment_schedule, embed_schedule_table, to_display_table, to_persistence_rows,
    DisplayLocale, ScheduleOptions, ScheduleRequest,
};

use crate::input;

/// Loan terms, from flags or a JSON/YAML request
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScheduleArgs {
    /// Path to JSON or YAML request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount disbursed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Monthly interest rate as a decimal (0.035 = 3.5%/month)
    #[arg(long, alias = "interest-rate")]
    pub rate: Option<Decimal>,

    /// Monthly management fee rate as a decimal
    #[arg(long, default_value = "0")]
    pub fee_rate: Decimal,

    /// Term in months
    #[arg(long, alias = "term-months")]
    pub term: Option<i32>,

    /// flat_rate, reducing_balance or balloon_structure
    #[arg(long)]
    pub method: Option<String>,

    /// Disbursement date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub disbursement_date: Option<NaiveDate>,

    /// Accept legacy method names (emi, flat, declining, ...) and fall back
    /// to reducing balance for unknown ones
    #[arg(long)]
    pub legacy_methods: bool,

    /// Use banker's rounding instead of round-half-up
    #[arg(long)]
    pub bankers_rounding: bool,
}

/// Arguments for persistence rows
#[derive(Args)]
pub struct RowsArgs {
    #[command(flatten)]
    pub loan: ScheduleArgs,

    /// Loan identifier the rows are keyed by
    #[arg(long)]
    pub loan_id: String,
}

/// Arguments for the contract schedule table
#[derive(Args)]
pub struct ContractTableArgs {
    #[command(flatten)]
    pub loan: ScheduleArgs,

    /// Locale preset: en-US or fr-XOF
    #[arg(long, default_value = "en-US")]
    pub locale: String,

    /// Contract template containing {{repayment_schedule}}; the table is
    /// embedded into it instead of printed alone
    #[arg(long)]
    pub template: Option<String>,
}

fn resolve_request(args: &ScheduleArgs) -> Result<ScheduleRequest, Box<dyn std::error::Error>> {
    let mut request: ScheduleRequest = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ScheduleRequest {
            principal: args.principal
                .ok_or("--principal is required (or provide --input)")?,
            monthly_interest_rate: args.rate
                .ok_or("--rate is required (or provide --input)")?,
            monthly_management_fee_rate: args.fee_rate,
            term_months: args.term
                .ok_or("--term is required (or provide --input)")?,
            // The engine never reads the clock; "today" is resolved here.
            disbursement_date: args
                .disbursement_date
                .unwrap_or_else(|| Local::now().date_naive()),
            calculation_method: args.method.clone(),
            options: ScheduleOptions::default(),
        }
    };

    if args.legacy_methods {
        request.options.legacy_method_names = true;
    }
    if args.bankers_rounding {
        request.options.rounding = RoundingMode::Bankers;
    }
    debug!(
        principal = %request.principal,
        term_months = request.term_months,
        method = request.calculation_method.as_deref().unwrap_or("default"),
        "resolved schedule request"
    );
    Ok(request)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = resolve_request(&args)?;
    let result = build_repayment_schedule(&request)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_summary(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = resolve_request(&args)?;
    let result = build_repayment_schedule(&request)?;
    Ok(serde_json::json!({
        "result": result.result.totals,
        "methodology": result.methodology,
        "warnings": result.warnings,
    }))
}

pub fn run_rows(args: RowsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.loan_id.trim().is_empty() {
        return Err("--loan-id must not be empty".into());
    }
    let request = resolve_request(&args.loan)?;
    let result = build_repayment_schedule(&request)?;
    let rows = to_persistence_rows(&result.result.schedule, &args.loan_id);
    Ok(serde_json::to_value(rows)?)
}

pub fn run_contract_table(args: ContractTableArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let locale = DisplayLocale::from_tag(&args.locale)?;
    let request = resolve_request(&args.loan)?;
    let result = build_repayment_schedule(&request)?;
    let schedule = &result.result.schedule;

    let html = match args.template {
        Some(ref path) => {
            let template = input::file::read_text(path)?;
            embed_schedule_table(&template, schedule, &locale)
        }
        None => to_display_table(schedule, &locale),
    };
    Ok(Value::String(html))
}
