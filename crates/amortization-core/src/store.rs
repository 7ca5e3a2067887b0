//! Port for the repayment-schedule store.
//!
//! The engine may be re-run whenever loan terms change before disbursement
//! is final, so persisting a schedule is always "replace everything for this
//! loan": idempotent, and atomic so that a half-written schedule is never
//! observable. Database adapters implement [`ScheduleStore`] outside this
//! crate; [`InMemoryScheduleStore`] is the reference adapter.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use crate::error::AmortizationError;
use crate::formatter::PersistRow;
use crate::AmortizationResult;

pub trait ScheduleStore: Send + Sync {
    /// Replace the stored schedule of `loan_id` with `rows` in one batch.
    fn replace_schedule(&self, loan_id: &str, rows: Vec<PersistRow>) -> AmortizationResult<()>;

    /// Rows of `loan_id` ordered by payment number; empty if none stored.
    fn schedule_for(&self, loan_id: &str) -> AmortizationResult<Vec<PersistRow>>;
}

/// Reject batches that would not be a coherent schedule for `loan_id`.
pub fn validate_batch(loan_id: &str, rows: &[PersistRow]) -> AmortizationResult<()> {
    if loan_id.trim().is_empty() {
        return Err(AmortizationError::InvalidInput {
            field: "loan_id".into(),
            reason: "Loan id must not be empty".into(),
        });
    }
    for (idx, row) in rows.iter().enumerate() {
        if row.loan_id != loan_id {
            return Err(AmortizationError::PersistenceError(format!(
                "Row {} belongs to loan '{}', expected '{}'",
                idx + 1,
                row.loan_id,
                loan_id
            )));
        }
        if row.payment_number as usize != idx + 1 {
            return Err(AmortizationError::PersistenceError(format!(
                "Row {} has payment number {}; rows must be numbered 1..n in order",
                idx + 1,
                row.payment_number
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct InMemoryScheduleStore {
    schedules: Mutex<HashMap<String, Vec<PersistRow>>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of loans with a stored schedule.
    pub fn loan_count(&self) -> AmortizationResult<usize> {
        let schedules = self
            .schedules
            .lock()
            .map_err(|e| AmortizationError::PersistenceError(e.to_string()))?;
        Ok(schedules.len())
    }
}

impl ScheduleStore for InMemoryScheduleStore {
    fn replace_schedule(&self, loan_id: &str, rows: Vec<PersistRow>) -> AmortizationResult<()> {
        validate_batch(loan_id, &rows)?;

        let mut schedules = self
            .schedules
            .lock()
            .map_err(|e| AmortizationError::PersistenceError(e.to_string()))?;
        debug!(loan_id, rows = rows.len(), "replacing repayment schedule");
        if rows.is_empty() {
            schedules.remove(loan_id);
        } else {
            schedules.insert(loan_id.to_string(), rows);
        }
        Ok(())
    }

    fn schedule_for(&self, loan_id: &str) -> AmortizationResult<Vec<PersistRow>> {
        let schedules = self
            .schedules
            .lock()
            .map_err(|e| AmortizationError::PersistenceError(e.to_string()))?;
        Ok(schedules.get(loan_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::to_persistence_rows;
    use crate::methods::test_support::terms;
    use crate::schedule::generate_schedule;
    use crate::types::CalculationMethod;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn rows(loan_id: &str, term: i32) -> Vec<PersistRow> {
        let t = terms(dec!(10_000), dec!(0.03), dec!(0.01), term, CalculationMethod::ReducingBalance);
        to_persistence_rows(&generate_schedule(&t), loan_id)
    }

    #[test]
    fn test_replace_is_idempotent() {
        let store = InMemoryScheduleStore::new();
        store.replace_schedule("LN-1", rows("LN-1", 6)).unwrap();
        store.replace_schedule("LN-1", rows("LN-1", 6)).unwrap();

        assert_eq!(store.loan_count().unwrap(), 1);
        assert_eq!(store.schedule_for("LN-1").unwrap(), rows("LN-1", 6));
    }

    #[test]
    fn test_replace_discards_previous_schedule() {
        let store = InMemoryScheduleStore::new();
        store.replace_schedule("LN-1", rows("LN-1", 12)).unwrap();
        store.replace_schedule("LN-1", rows("LN-1", 4)).unwrap();
        assert_eq!(store.schedule_for("LN-1").unwrap().len(), 4);
    }

    #[test]
    fn test_foreign_rows_rejected_without_partial_write() {
        let store = InMemoryScheduleStore::new();
        store.replace_schedule("LN-1", rows("LN-1", 3)).unwrap();

        let mut mixed = rows("LN-1", 3);
        mixed[2].loan_id = "LN-2".into();
        let err = store.replace_schedule("LN-1", mixed).unwrap_err();

        assert!(matches!(err, AmortizationError::PersistenceError(_)));
        assert_eq!(store.schedule_for("LN-1").unwrap(), rows("LN-1", 3));
    }

    #[test]
    fn test_out_of_order_rows_rejected() {
        let store = InMemoryScheduleStore::new();
        let mut batch = rows("LN-9", 3);
        batch.swap(0, 1);
        assert!(store.replace_schedule("LN-9", batch).is_err());
        assert!(store.schedule_for("LN-9").unwrap().is_empty());
    }

    #[test]
    fn test_empty_batch_clears_loan() {
        let store = InMemoryScheduleStore::new();
        store.replace_schedule("LN-1", rows("LN-1", 3)).unwrap();
        store.replace_schedule("LN-1", Vec::new()).unwrap();
        assert_eq!(store.loan_count().unwrap(), 0);
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        use std::sync::Arc;

        let store = Arc::new(InMemoryScheduleStore::new());
        let writer = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = writer.schedules.lock().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert!(matches!(
            store.loan_count(),
            Err(AmortizationError::PersistenceError(_))
        ));
        assert!(store.schedule_for("LN-1").is_err());
    }

    #[test]
    fn test_blank_loan_id_rejected() {
        let store = InMemoryScheduleStore::new();
        assert!(store.replace_schedule("  ", Vec::new()).is_err());
    }
}
