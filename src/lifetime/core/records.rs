//! Transaction records, the raw input of a lifetime-value batch.
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One line of a transaction log.
///
/// Several records may share a `transaction_id` (one per invoice line); the
/// aggregator counts distinct transaction IDs and sums all amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub customer_id: String,
    pub transaction_id: String,
    pub timestamp: NaiveDateTime,
    pub amount: f64,
}

impl TransactionRecord {
    pub fn new(
        customer_id: impl Into<String>, transaction_id: impl Into<String>,
        timestamp: NaiveDateTime, amount: f64,
    ) -> Self {
        TransactionRecord {
            customer_id: customer_id.into(),
            transaction_id: transaction_id.into(),
            timestamp,
            amount,
        }
    }
}
