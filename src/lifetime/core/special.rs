//! Gauss hypergeometric function ₂F₁(a, b; c; z) for 0 ≤ z < 1.
//!
//! The BG/NBD conditional expectation needs ₂F₁ at arguments where the
//! series can grow far beyond `f64` range before it converges (large
//! `r + x`, `z` near 1). The series is therefore summed with a running
//! log-scale: whenever the partial sum exceeds [`RESCALE_THRESHOLD`] both
//! the sum and the current term are divided down and the factor is added to
//! the log-scale. Signs are carried by the mantissa, so negative terms (from
//! `c < 0` or negative `a`, `b`) are summed exactly.
//!
//! Stopping rule: the term ratio must be below 1 (the series is past its
//! peak) and the latest term must change the sum by less than
//! [`HYP2F1_REL_TOL`] relative. Hitting [`HYP2F1_MAX_TERMS`] first is a
//! divergence error.
use crate::lifetime::errors::{CltvError, CltvResult};

/// Hard cap on summed terms.
pub const HYP2F1_MAX_TERMS: usize = 200_000;

/// Relative increment below which the series is considered converged.
pub const HYP2F1_REL_TOL: f64 = 1e-15;

/// Partial-sum magnitude that triggers a rescale.
const RESCALE_THRESHOLD: f64 = 1e200;

/// Log-rescaled value of ₂F₁: `value = mantissa · exp(log_scale)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledValue {
    pub mantissa: f64,
    pub log_scale: f64,
}

impl ScaledValue {
    /// `ln|value|`, or `-∞` for a zero mantissa.
    pub fn ln_abs(&self) -> f64 {
        self.mantissa.abs().ln() + self.log_scale
    }

    /// Unscaled value; may overflow to ±∞.
    pub fn value(&self) -> f64 {
        self.mantissa * self.log_scale.exp()
    }
}

/// Evaluate ₂F₁(a, b; c; z) by its power series.
///
/// # Errors
/// - [`CltvError::InvalidFeature`] when `z ∉ [0, 1)`, when `c` is zero or a
///   negative integer, or when an argument is non-finite.
/// - [`CltvError::HypergeometricDiverged`] when the term cap is reached or
///   a term turns non-finite.
pub fn hyp2f1(a: f64, b: f64, c: f64, z: f64) -> CltvResult<ScaledValue> {
    if !(a.is_finite() && b.is_finite() && c.is_finite()) || !(0.0..1.0).contains(&z) {
        return Err(CltvError::InvalidFeature {
            row: 0,
            field: "hyp2f1 argument",
            value: z,
            reason: "need finite a, b, c and 0 <= z < 1",
        });
    }
    if c <= 0.0 && c.fract() == 0.0 {
        return Err(CltvError::InvalidFeature {
            row: 0,
            field: "hyp2f1 c",
            value: c,
            reason: "c must not be zero or a negative integer",
        });
    }

    let mut sum = 1.0_f64;
    let mut term = 1.0_f64;
    let mut log_scale = 0.0_f64;
    if z == 0.0 {
        return Ok(ScaledValue { mantissa: sum, log_scale });
    }

    for n in 0..HYP2F1_MAX_TERMS {
        let k = n as f64;
        let ratio = (a + k) * (b + k) / ((c + k) * (k + 1.0)) * z;
        term *= ratio;
        if term == 0.0 {
            return Ok(ScaledValue { mantissa: sum, log_scale });
        }
        sum += term;
        if !sum.is_finite() || !term.is_finite() {
            return Err(CltvError::HypergeometricDiverged { terms: n + 1 });
        }

        let magnitude = sum.abs();
        if magnitude > RESCALE_THRESHOLD {
            sum /= magnitude;
            term /= magnitude;
            log_scale += magnitude.ln();
        }

        if ratio.abs() < 1.0 && term.abs() <= HYP2F1_REL_TOL * sum.abs() {
            return Ok(ScaledValue { mantissa: sum, log_scale });
        }
    }
    Err(CltvError::HypergeometricDiverged { terms: HYP2F1_MAX_TERMS })
}
