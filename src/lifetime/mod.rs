//! lifetime — customer lifetime value from transaction logs.
//!
//! Purpose
//! -------
//! Model purchase timing (BG/NBD) and spend per transaction (Gamma-Gamma) as
//! independent processes, combine their forecasts into a discounted
//! lifetime value, and segment customers by it.
//!
//! Key behaviors
//! -------------
//! - [`core`]: records, feature aggregation, model inputs, parameters,
//!   options and special functions.
//! - [`models`]: the two penalized maximum-likelihood fitters and their
//!   predictors.
//! - [`valuation`]: projection, segmentation and the batch pipeline.
//! - [`errors`]: [`CltvError`](errors::CltvError) and its
//!   [`ErrorKind`](errors::ErrorKind) classification.
//!
//! Conventions
//! -----------
//! - Time is measured in weeks.
//! - Fitted parameters are immutable snapshots; refitting returns new values.
//! - The library logs through the `log` facade and never installs a logger.

pub mod core;
pub mod errors;
pub mod models;
pub mod valuation;

pub mod prelude {
    pub use super::core::{
        CltvConfig, CustomerFeatures, FitOptions, Init, InvalidRowPolicy, MonetaryValueParams,
        ProjectionOptions, PurchaseTimingParams, TransactionRecord,
    };
    pub use super::errors::{CltvError, CltvResult, ErrorKind};
    pub use super::models::prelude::*;
    pub use super::valuation::{CltvPipeline, CltvReport, CustomerForecast, Segment};
}
