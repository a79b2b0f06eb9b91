//! rust_cltv — customer lifetime value from transaction logs.
//!
//! Purpose
//! -------
//! Estimate how much each customer is worth over a finite horizon by
//! modeling purchase timing (BG/NBD) and spend per transaction
//! (Gamma-Gamma) as independent processes, then rank customers into
//! quartile segments.
//!
//! Key behaviors
//! -------------
//! - [`preprocessing`]: cancellation filtering and outlier capping of the raw
//!   log.
//! - [`lifetime`]: feature aggregation, the two penalized MLE fitters with
//!   their predictors, discounted projection, segmentation and the batch
//!   pipeline.
//! - [`optimization`]: the L-BFGS maximum-likelihood driver (argmin) and the
//!   positivity transform used by both models.
//! - [`inference`]: Hessian-based standard errors for fitted parameters.
//! - [`statistical_tests`]: quantiles and the Pearson correlation used by the
//!   frequency/monetary diagnostic.
//!
//! Invariants & assumptions
//! ------------------------
//! - Pure computation: no I/O, no global state, no logger installation.
//! - Fits are deterministic; the same batch always yields the same report.
//!
//! Downstream usage
//! ----------------
//! - Build a [`CltvConfig`](lifetime::core::options::CltvConfig) and call
//!   [`CltvPipeline::run`](lifetime::valuation::pipeline::CltvPipeline::run)
//!   for the full batch, or use the components directly.
//! - `use rust_cltv::lifetime::prelude::*;` brings the common types into
//!   scope.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/` exercises the public API
//!   end to end.

pub mod inference;
pub mod lifetime;
pub mod optimization;
pub mod preprocessing;
pub mod statistical_tests;
