//! Transaction cleaning — cancellations and extreme amounts.
//!
//! Purpose
//! -------
//! Prepare a raw transaction log for aggregation: remove cancelled and
//! non-positive transactions, and pull extreme amounts in to fixed limits.
//!
//! Key behaviors
//! -------------
//! - [`drop_cancelled`] removes records whose transaction ID contains
//!   [`CANCELLATION_MARKER`] and records with `amount ≤ 0`.
//! - [`outlier_thresholds`] returns `(q_lo − 1.5·R, q_hi + 1.5·R)` with
//!   `R = q_hi − q_lo`, using the same type-7 quantiles as the segmenter.
//! - [`cap_amounts`] windsorizes amounts in place to those limits.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every function rejects an empty log and non-finite amounts.
//! - Nothing here performs I/O; callers own loading and storage.
use crate::{
    lifetime::{
        core::records::TransactionRecord,
        errors::{CltvError, CltvResult},
    },
    statistical_tests::quantiles::quantiles,
};

/// Substring marking a cancelled transaction ID.
pub const CANCELLATION_MARKER: char = 'C';

/// Default lower quantile for outlier limits.
pub const DEFAULT_LOWER_QUANTILE: f64 = 0.01;

/// Default upper quantile for outlier limits.
pub const DEFAULT_UPPER_QUANTILE: f64 = 0.99;

/// Multiplier on the inter-quantile range.
const RANGE_MULTIPLIER: f64 = 1.5;

/// Keep only completed, positive-amount transactions.
///
/// # Errors
/// - [`CltvError::EmptyTransactions`] for an empty log.
/// - [`CltvError::NonFiniteAmount`] for a NaN/±inf amount.
pub fn drop_cancelled(records: &[TransactionRecord]) -> CltvResult<Vec<TransactionRecord>> {
    check_amounts(records)?;
    let kept: Vec<TransactionRecord> = records
        .iter()
        .filter(|r| !r.transaction_id.contains(CANCELLATION_MARKER) && r.amount > 0.0)
        .cloned()
        .collect();
    log::info!(
        "Dropped {} cancelled or non-positive transactions, {} kept",
        records.len() - kept.len(),
        kept.len()
    );
    Ok(kept)
}

/// Lower and upper outlier limits for `values`.
///
/// # Errors
/// - [`CltvError::InvalidQuantileBounds`] unless `0 ≤ lower_q < upper_q ≤ 1`.
/// - [`CltvError::EmptyTransactions`] for an empty slice.
/// - [`CltvError::NonFiniteValue`] for a NaN/±inf entry.
pub fn outlier_thresholds(values: &[f64], lower_q: f64, upper_q: f64) -> CltvResult<(f64, f64)> {
    if !(0.0 <= lower_q && lower_q < upper_q && upper_q <= 1.0) {
        return Err(CltvError::InvalidQuantileBounds { lower: lower_q, upper: upper_q });
    }
    if values.is_empty() {
        return Err(CltvError::EmptyTransactions);
    }
    if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(CltvError::NonFiniteValue { index, value });
    }
    let q = quantiles(values, &[lower_q, upper_q])?;
    let range = q[1] - q[0];
    Ok((q[0] - RANGE_MULTIPLIER * range, q[1] + RANGE_MULTIPLIER * range))
}

/// Windsorize amounts to [`outlier_thresholds`] at the default quantiles.
///
/// Returns the limits applied.
pub fn cap_amounts(records: &mut [TransactionRecord]) -> CltvResult<(f64, f64)> {
    cap_amounts_with(records, DEFAULT_LOWER_QUANTILE, DEFAULT_UPPER_QUANTILE)
}

/// Windsorize amounts to limits computed at `(lower_q, upper_q)`.
///
/// # Errors
/// As [`outlier_thresholds`], with [`CltvError::NonFiniteAmount`] naming the
/// offending record.
pub fn cap_amounts_with(
    records: &mut [TransactionRecord], lower_q: f64, upper_q: f64,
) -> CltvResult<(f64, f64)> {
    check_amounts(records)?;
    let amounts: Vec<f64> = records.iter().map(|r| r.amount).collect();
    let (low, high) = outlier_thresholds(&amounts, lower_q, upper_q)?;

    let mut capped = 0usize;
    for record in records.iter_mut() {
        let clamped = record.amount.clamp(low, high);
        if clamped != record.amount {
            record.amount = clamped;
            capped += 1;
        }
    }
    log::debug!("Capped {capped} amounts to [{low:.4}, {high:.4}]");
    Ok((low, high))
}

// ---- Helper methods ----

fn check_amounts(records: &[TransactionRecord]) -> CltvResult<()> {
    if records.is_empty() {
        return Err(CltvError::EmptyTransactions);
    }
    match records.iter().find(|r| !r.amount.is_finite()) {
        Some(r) => Err(CltvError::NonFiniteAmount {
            customer_id: r.customer_id.clone(),
            transaction_id: r.transaction_id.clone(),
            value: r.amount,
        }),
        None => Ok(()),
    }
}
