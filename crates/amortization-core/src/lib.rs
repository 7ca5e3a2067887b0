//! Loan repayment schedule engine.
//!
//! Produces month-by-month breakdowns of principal, interest, management
//! fee and remaining balance for flat-rate, reducing-balance (EMI) and
//! balloon loans. All amounts are `rust_decimal::Decimal`, rounded to the
//! currency unit by a single [`rounding::RoundingPolicy`].

pub mod error;
pub mod methods;
pub mod rounding;
pub mod schedule;
pub mod time_value;
pub mod types;

#[cfg(feature = "formatter")]
pub mod formatter;

#[cfg(feature = "store")]
pub mod store;

pub use error::AmortizationError;
pub use schedule::{
    build_repayment_schedule, generate_schedule, generate_schedule_with, summarize,
    try_generate_schedule, ScheduleOptions, ScheduleOutput, ScheduleRequest, Totals,
};
pub use types::*;

#[cfg(feature = "formatter")]
pub use formatter::{embed_schedule_table, to_display_table, to_persistence_rows, DisplayLocale, PersistRow};

/// Standard result type for all amortization operations
pub type AmortizationResult<T> = Result<T, AmortizationError>;
