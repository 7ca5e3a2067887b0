use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Money, ScheduleEntry};

/// Flat record inserted into the repayment-schedule store at disbursement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistRow {
    pub loan_id: String,
    pub payment_number: u32,
    pub due_date: NaiveDate,
    pub principal_amount: Money,
    pub interest_amount: Money,
    pub management_fee_amount: Money,
    pub total_amount: Money,
    pub remaining_balance: Money,
    pub is_paid: bool,
}

/// One unpaid row per schedule entry, keyed by `loan_id`.
pub fn to_persistence_rows(schedule: &[ScheduleEntry], loan_id: &str) -> Vec<PersistRow> {
    schedule
        .iter()
        .map(|entry| PersistRow {
            loan_id: loan_id.to_string(),
            payment_number: entry.payment_number,
            due_date: entry.due_date,
            principal_amount: entry.principal_portion,
            interest_amount: entry.interest_portion,
            management_fee_amount: entry.management_fee_portion,
            total_amount: entry.total_payment,
            remaining_balance: entry.remaining_balance,
            is_paid: false,
        })
        .collect()
}
