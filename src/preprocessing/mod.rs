//! preprocessing — transaction-log cleaning ahead of aggregation.
//!
//! - [`cleaning::drop_cancelled`] removes cancelled and non-positive
//!   transactions.
//! - [`cleaning::cap_amounts`] windsorizes extreme amounts.

pub mod cleaning;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::cleaning::{cap_amounts, cap_amounts_with, drop_cancelled, outlier_thresholds};
