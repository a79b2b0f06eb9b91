//! Input validation for `statistical_tests`.
//!
//! Each helper returns the first violation as a [`CorrError`] so the
//! statistics themselves can assume clean, finite input.
use crate::statistical_tests::errors::{CorrError, CorrResult};

/// Check a single sample: at least `required` values, all finite.
pub fn validate_sample(data: &[f64], required: usize) -> CorrResult<()> {
    if data.len() < required {
        return Err(CorrError::InsufficientData { n: data.len(), required });
    }
    for (index, &value) in data.iter().enumerate() {
        if !value.is_finite() {
            return Err(CorrError::InvalidData { index, value });
        }
    }
    Ok(())
}

/// Check a paired sample: equal lengths, then [`validate_sample`] on both.
///
/// # Errors
/// - [`CorrError::LengthMismatch`]
/// - [`CorrError::InsufficientData`] / [`CorrError::InvalidData`]
pub fn validate_pairs(x: &[f64], y: &[f64], required: usize) -> CorrResult<()> {
    if x.len() != y.len() {
        return Err(CorrError::LengthMismatch { x_len: x.len(), y_len: y.len() });
    }
    validate_sample(x, required)?;
    validate_sample(y, required)
}

/// Quantile probability must lie in [0, 1].
pub fn validate_probability(prob: f64) -> CorrResult<()> {
    if !(0.0..=1.0).contains(&prob) {
        return Err(CorrError::InvalidProbability(prob));
    }
    Ok(())
}
