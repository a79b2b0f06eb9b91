//! statistical_tests — descriptive statistics and diagnostics.
//!
//! Purpose
//! -------
//! Small, validated statistical routines shared by the lifetime-value stack.
//!
//! Key behaviors
//! -------------
//! - [`correlation`]: Pearson ρ with a Student-t p-value, used by the
//!   pipeline's frequency/monetary independence diagnostic.
//! - [`quantiles`]: type-7 interpolated quantiles, used for quartile
//!   segmentation and outlier thresholds.
//! - [`validation`]: shared input checks returning [`CorrError`].
//!
//! Conventions
//! -----------
//! - Inputs are plain `&[f64]` slices; nothing here allocates beyond a sort
//!   buffer.
//! - Failures are [`CorrError`] values, never panics.

pub mod correlation;
pub mod errors;
pub mod quantiles;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::correlation::CorrelationOutcome;
pub use self::errors::{CorrError, CorrResult};
pub use self::quantiles::{quantile_sorted, quantiles};

pub mod prelude {
    pub use super::correlation::CorrelationOutcome;
    pub use super::errors::{CorrError, CorrResult};
}
