//! core — shared lifetime-value inputs, parameters and numerics.
//!
//! Purpose
//! -------
//! Collect the building blocks the BG/NBD and Gamma-Gamma models share:
//! transaction records and their aggregation into customer features,
//! validated model inputs, parameter sets with their θ mapping, options,
//! starting values and the hypergeometric series.
//!
//! Key behaviors
//! -------------
//! - [`features::aggregate`] reduces a transaction log to one
//!   [`CustomerFeatures`] row per repeat customer.
//! - [`PurchaseData`] / [`MonetaryData`] are the per-model column views
//!   handed to the fitters.
//! - [`PurchaseTimingParams`] / [`MonetaryValueParams`] map to and from the
//!   optimizer's log-parameter vector.
//! - [`special::hyp2f1`] evaluates ₂F₁ with log-rescaling for the BG/NBD
//!   conditional expectation.
//!
//! Conventions
//! -----------
//! - Time is measured in weeks throughout.
//! - Nothing in this module logs except the aggregator's run summary.

pub mod data;
pub mod features;
pub mod init;
pub mod options;
pub mod params;
pub mod records;
pub mod special;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::data::{MonetaryData, PurchaseData};
pub use self::features::{AggregationOutcome, CustomerFeatures, RejectedCustomer, aggregate};
pub use self::init::Init;
pub use self::options::{CltvConfig, FitOptions, InvalidRowPolicy, ProjectionOptions};
pub use self::params::{MonetaryValueParams, PurchaseTimingParams};
pub use self::records::TransactionRecord;
