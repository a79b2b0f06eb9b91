//! Behavioral aggregation — transaction log to per-customer features.
//!
//! Purpose
//! -------
//! Reduce an unordered transaction log to one [`CustomerFeatures`] row per
//! repeat customer, measured relative to a fixed analysis date.
//!
//! Key behaviors
//! -------------
//! - Records are grouped by customer ID; output rows are sorted by that ID,
//!   so the same log always yields the same table.
//! - `age = analysis − first`, `recency = last − first`, both in weeks
//!   (elapsed milliseconds ÷ 604 800 000).
//! - `frequency` counts repeat transactions: distinct transaction IDs − 1.
//!   `monetary` is total spend over all distinct transactions.
//! - Customers with a single transaction (`frequency == 0`) are dropped and
//!   counted, not reported as errors.
//! - Invalid customers either abort the run or are set aside, depending on
//!   [`InvalidRowPolicy`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Every emitted row has `frequency ≥ 1`, `0 ≤ recency ≤ age`, `age > 0`
//!   and `monetary > 0`. A repeat customer whose first purchase falls on the
//!   analysis date has no observation window and is a row-level
//!   [`CltvError::ZeroAge`].
//! - Amounts must already be positive; cancellation filtering belongs to
//!   `preprocessing::cleaning`.
//!
//! Downstream usage
//! ----------------
//! - `lifetime::core::data` re-validates rows when building model inputs, so
//!   hand-built feature tables get the same guarantees.
use crate::lifetime::{
    core::{
        options::{InvalidRowPolicy, MILLIS_PER_WEEK},
        records::TransactionRecord,
    },
    errors::{CltvError, CltvResult},
};
use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Per-customer behavioral summary.
///
/// Fields
/// ------
/// - `frequency`: repeat purchases (distinct transactions − 1).
/// - `recency`: weeks between first and last purchase.
/// - `age`: weeks between first purchase and the analysis date.
/// - `monetary`: average spend per transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerFeatures {
    pub customer_id: String,
    pub frequency: u32,
    pub recency: f64,
    pub age: f64,
    pub monetary: f64,
}

impl CustomerFeatures {
    pub fn new(
        customer_id: impl Into<String>, frequency: u32, recency: f64, age: f64, monetary: f64,
    ) -> Self {
        CustomerFeatures { customer_id: customer_id.into(), frequency, recency, age, monetary }
    }
}

/// A customer set aside under [`InvalidRowPolicy::SkipAndReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedCustomer {
    pub customer_id: String,
    pub error: CltvError,
}

/// Output of [`aggregate`].
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationOutcome {
    /// Eligible customers, sorted by ID.
    pub features: Vec<CustomerFeatures>,
    /// Customers with exactly one transaction.
    pub single_purchase: usize,
    /// Invalid customers; always empty under `FailFast`.
    pub rejected: Vec<RejectedCustomer>,
}

/// Build the feature table for `analysis_date`.
///
/// # Errors
/// - [`CltvError::EmptyTransactions`] when `records` is empty.
/// - Under [`InvalidRowPolicy::FailFast`], the first customer-level error:
///   [`CltvError::EmptyCustomerId`], [`CltvError::NonFiniteAmount`],
///   [`CltvError::NonPositiveAmount`] or [`CltvError::NegativeAge`].
///
/// # Examples
/// ```rust
/// use chrono::NaiveDate;
/// use rust_cltv::lifetime::core::{
///     features::aggregate, options::InvalidRowPolicy, records::TransactionRecord,
/// };
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let records = vec![
///     TransactionRecord::new("c1", "t1", day(1), 10.0),
///     TransactionRecord::new("c1", "t2", day(8), 30.0),
///     TransactionRecord::new("c2", "t3", day(3), 5.0),
/// ];
/// let outcome = aggregate(&records, day(15), InvalidRowPolicy::FailFast).unwrap();
/// assert_eq!(outcome.features.len(), 1);
/// assert_eq!(outcome.features[0].frequency, 1);
/// assert_eq!(outcome.features[0].recency, 1.0);
/// assert_eq!(outcome.features[0].age, 2.0);
/// assert_eq!(outcome.features[0].monetary, 20.0);
/// assert_eq!(outcome.single_purchase, 1);
/// ```
pub fn aggregate(
    records: &[TransactionRecord], analysis_date: NaiveDateTime, policy: InvalidRowPolicy,
) -> CltvResult<AggregationOutcome> {
    if records.is_empty() {
        return Err(CltvError::EmptyTransactions);
    }

    let mut by_customer: BTreeMap<&str, Vec<&TransactionRecord>> = BTreeMap::new();
    let mut rejected = Vec::new();
    for record in records {
        if record.customer_id.is_empty() {
            let error =
                CltvError::EmptyCustomerId { transaction_id: record.transaction_id.clone() };
            match policy {
                InvalidRowPolicy::FailFast => return Err(error),
                InvalidRowPolicy::SkipAndReport => {
                    rejected.push(RejectedCustomer { customer_id: String::new(), error });
                    continue;
                }
            }
        }
        by_customer.entry(record.customer_id.as_str()).or_default().push(record);
    }

    let mut features = Vec::with_capacity(by_customer.len());
    let mut single_purchase = 0;
    for (customer_id, rows) in by_customer {
        match summarize_customer(customer_id, &rows, analysis_date) {
            Ok(row) if row.frequency == 0 => single_purchase += 1,
            Ok(row) => features.push(row),
            Err(error) => match policy {
                InvalidRowPolicy::FailFast => return Err(error),
                InvalidRowPolicy::SkipAndReport => {
                    log::debug!("Rejecting customer {customer_id}: {error}");
                    rejected.push(RejectedCustomer { customer_id: customer_id.to_string(), error });
                }
            },
        }
    }

    log::info!(
        "Aggregated {} records: {} repeat customers, {} single-purchase dropped, {} rejected",
        records.len(),
        features.len(),
        single_purchase,
        rejected.len()
    );
    Ok(AggregationOutcome { features, single_purchase, rejected })
}

// ---- Helper methods ----

// Features for one customer; frequency may be 0 here and is filtered by the caller.
fn summarize_customer(
    customer_id: &str, rows: &[&TransactionRecord], analysis_date: NaiveDateTime,
) -> CltvResult<CustomerFeatures> {
    let mut transactions: HashSet<&str> = HashSet::with_capacity(rows.len());
    let mut total = 0.0;
    let mut first = NaiveDateTime::MAX;
    let mut last = NaiveDateTime::MIN;

    for row in rows {
        if !row.amount.is_finite() {
            return Err(CltvError::NonFiniteAmount {
                customer_id: customer_id.to_string(),
                transaction_id: row.transaction_id.clone(),
                value: row.amount,
            });
        }
        if row.amount <= 0.0 {
            return Err(CltvError::NonPositiveAmount {
                customer_id: customer_id.to_string(),
                transaction_id: row.transaction_id.clone(),
                value: row.amount,
            });
        }
        transactions.insert(row.transaction_id.as_str());
        total += row.amount;
        first = first.min(row.timestamp);
        last = last.max(row.timestamp);
    }

    if last > analysis_date {
        return Err(CltvError::NegativeAge {
            customer_id: customer_id.to_string(),
            latest_purchase: last,
            analysis_date,
        });
    }

    let distinct = transactions.len();
    if distinct > 1 && first == analysis_date {
        return Err(CltvError::ZeroAge { customer_id: customer_id.to_string(), analysis_date });
    }
    Ok(CustomerFeatures {
        customer_id: customer_id.to_string(),
        frequency: (distinct - 1) as u32,
        recency: to_weeks(last - first),
        age: to_weeks(analysis_date - first),
        monetary: total / distinct as f64,
    })
}

fn to_weeks(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / MILLIS_PER_WEEK
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Feature arithmetic: repeat count, week units, multi-line invoices.
    // - Filtering of single-purchase customers and output ordering.
    // - Both row policies on invalid customers.
    // - Empty input and a purchase after the analysis date.
    // - Repeat customers with no observation window (age 0).
    // -------------------------------------------------------------------------

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid timestamp")
    }

    #[test]
    // Purpose
    // -------
    // Multi-line invoices count once for frequency but fully for spend.
    //
    // Given
    // -----
    // - Invoice A (two lines: 4 + 6) on day 1, invoice B (20) on day 8,
    //   invoice C (30) on day 15, analysis on day 22.
    //
    // Expect
    // ------
    // - frequency 2, recency 2 weeks, age 3 weeks, monetary 60 / 3 = 20.
    fn multi_line_invoices_and_week_units() {
        // Arrange
        let records = vec![
            TransactionRecord::new("c1", "A", at(1, 0), 4.0),
            TransactionRecord::new("c1", "A", at(1, 0), 6.0),
            TransactionRecord::new("c1", "B", at(8, 0), 20.0),
            TransactionRecord::new("c1", "C", at(15, 0), 30.0),
        ];

        // Act
        let outcome = aggregate(&records, at(22, 0), InvalidRowPolicy::FailFast)
            .expect("valid records");

        // Assert
        let row = &outcome.features[0];
        assert_eq!(row.frequency, 2);
        assert_eq!(row.recency, 2.0);
        assert_eq!(row.age, 3.0);
        assert_eq!(row.monetary, 20.0);
    }

    #[test]
    // Purpose
    // -------
    // Output is sorted by customer ID and excludes single purchasers.
    //
    // Given
    // -----
    // - Customers "z" and "a" with two purchases each, "m" with one.
    //
    // Expect
    // ------
    // - IDs ["a", "z"], `single_purchase == 1`, recency ≤ age on every row.
    fn output_sorted_and_single_purchasers_dropped() {
        // Arrange
        let records = vec![
            TransactionRecord::new("z", "1", at(2, 0), 5.0),
            TransactionRecord::new("m", "2", at(2, 0), 5.0),
            TransactionRecord::new("a", "3", at(3, 12), 5.0),
            TransactionRecord::new("z", "4", at(5, 0), 5.0),
            TransactionRecord::new("a", "5", at(4, 0), 5.0),
        ];

        // Act
        let outcome = aggregate(&records, at(10, 0), InvalidRowPolicy::FailFast)
            .expect("valid records");

        // Assert
        let ids: Vec<&str> = outcome.features.iter().map(|f| f.customer_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "z"]);
        assert_eq!(outcome.single_purchase, 1);
        assert!(outcome.features.iter().all(|f| f.recency <= f.age));
    }

    #[test]
    // Purpose
    // -------
    // A non-positive amount aborts under FailFast and is reported under
    // SkipAndReport while other customers are kept.
    //
    // Given
    // -----
    // - "bad" with a zero amount, "good" with two valid purchases.
    //
    // Expect
    // ------
    // - FailFast: `NonPositiveAmount`.
    // - SkipAndReport: one feature row ("good"), one rejection ("bad").
    fn row_policies_on_invalid_customer() {
        // Arrange
        let records = vec![
            TransactionRecord::new("bad", "1", at(1, 0), 0.0),
            TransactionRecord::new("bad", "2", at(2, 0), 3.0),
            TransactionRecord::new("good", "3", at(1, 0), 3.0),
            TransactionRecord::new("good", "4", at(2, 0), 3.0),
        ];

        // Act
        let strict = aggregate(&records, at(9, 0), InvalidRowPolicy::FailFast);
        let lenient = aggregate(&records, at(9, 0), InvalidRowPolicy::SkipAndReport)
            .expect("skip policy keeps valid customers");

        // Assert
        assert!(matches!(strict, Err(CltvError::NonPositiveAmount { .. })));
        assert_eq!(lenient.features.len(), 1);
        assert_eq!(lenient.features[0].customer_id, "good");
        assert_eq!(lenient.rejected.len(), 1);
        assert_eq!(lenient.rejected[0].customer_id, "bad");
    }

    #[test]
    // Purpose
    // -------
    // Empty input and purchases after the analysis date are invalid input.
    //
    // Given
    // -----
    // - No records; a customer buying on day 12 with analysis on day 10.
    //
    // Expect
    // ------
    // - `EmptyTransactions` and `NegativeAge`.
    fn empty_input_and_purchase_after_analysis_date() {
        assert_eq!(
            aggregate(&[], at(10, 0), InvalidRowPolicy::FailFast),
            Err(CltvError::EmptyTransactions)
        );
        let records = vec![
            TransactionRecord::new("c", "1", at(1, 0), 1.0),
            TransactionRecord::new("c", "2", at(12, 0), 1.0),
        ];
        let err = aggregate(&records, at(10, 0), InvalidRowPolicy::FailFast)
            .expect_err("purchase after analysis date");
        assert!(matches!(err, CltvError::NegativeAge { .. }));
        assert_eq!(err.kind(), crate::lifetime::errors::ErrorKind::InvalidInput);
    }

    #[test]
    // Purpose
    // -------
    // A repeat customer whose purchases all fall on the analysis date is a
    // row-level rejection, so it never reaches the fitters.
    //
    // Given
    // -----
    // - "b" with two invoices at the analysis instant, "a" with a normal
    //   history, and "s" buying once at the analysis instant.
    //
    // Expect
    // ------
    // - FailFast: `ZeroAge` for "b" of kind InvalidInput.
    // - SkipAndReport: "b" rejected, "a" kept, "s" counted as single
    //   purchase, every emitted age > 0.
    fn zero_age_repeat_customer_is_rejected_per_row() {
        // Arrange
        let records = vec![
            TransactionRecord::new("a", "1", at(1, 0), 4.0),
            TransactionRecord::new("a", "2", at(5, 0), 4.0),
            TransactionRecord::new("b", "3", at(10, 0), 7.0),
            TransactionRecord::new("b", "4", at(10, 0), 9.0),
            TransactionRecord::new("s", "5", at(10, 0), 2.0),
        ];

        // Act
        let strict = aggregate(&records, at(10, 0), InvalidRowPolicy::FailFast)
            .expect_err("zero observation window");
        let lenient = aggregate(&records, at(10, 0), InvalidRowPolicy::SkipAndReport)
            .expect("skip policy keeps valid customers");

        // Assert
        assert!(matches!(&strict, CltvError::ZeroAge { customer_id, .. } if customer_id == "b"));
        assert_eq!(strict.kind(), crate::lifetime::errors::ErrorKind::InvalidInput);
        assert_eq!(lenient.rejected.len(), 1);
        assert_eq!(lenient.rejected[0].customer_id, "b");
        assert_eq!(lenient.features.len(), 1);
        assert_eq!(lenient.features[0].customer_id, "a");
        assert_eq!(lenient.single_purchase, 1);
        assert!(lenient.features.iter().all(|f| f.age > 0.0));
    }
}
