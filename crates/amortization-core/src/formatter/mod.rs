//! Projections of a schedule into the shapes its consumers need.

pub mod display;
pub mod persistence;

pub use display::{embed_schedule_table, to_display_table, DisplayLocale, SCHEDULE_PLACEHOLDER};
pub use persistence::{to_persistence_rows, PersistRow};
