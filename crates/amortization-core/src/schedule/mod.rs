pub mod envelope;
pub mod generator;
pub mod totals;

pub use envelope::{build_repayment_schedule, ScheduleOutput, ScheduleRequest};
pub use generator::{generate_schedule, generate_schedule_with, try_generate_schedule, ScheduleOptions};
pub use totals::{summarize, Totals};
