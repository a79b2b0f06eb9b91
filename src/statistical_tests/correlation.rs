//! Pearson correlation with a Student-t significance test.
//!
//! Purpose
//! -------
//! Quantify the linear association between two paired samples. The
//! lifetime-value pipeline uses it to check the Gamma-Gamma assumption that
//! spend per transaction is independent of purchase frequency.
//!
//! Key behaviors
//! -------------
//! - [`CorrelationOutcome::pearson`] computes ρ from centered sums.
//! - For `n ≥ 3` the statistic `t = ρ·√((n − 2)/(1 − ρ²))` is referred to a
//!   Student-t with `n − 2` degrees of freedom for a two-sided p-value.
//!   With `n = 2` only ρ is reported.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs must be equal-length, finite, with at least two pairs and
//!   non-zero variance on both sides.
//! - `|ρ| = 1` gives `t = ±∞` and p-value 0.
use crate::statistical_tests::{
    errors::{CorrError, CorrResult},
    validation::validate_pairs,
};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Result of a Pearson correlation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CorrelationOutcome {
    n: usize,
    coefficient: f64,
    t_stat: Option<f64>,
    p_value: Option<f64>,
}

impl CorrelationOutcome {
    /// Pearson correlation of `x` and `y`.
    ///
    /// # Errors
    /// - `LengthMismatch`, `InsufficientData` (n < 2), `InvalidData` from
    ///   input validation.
    /// - [`CorrError::ZeroVariance`] if either sample is constant.
    ///
    /// # Examples
    /// ```rust
    /// use rust_cltv::statistical_tests::correlation::CorrelationOutcome;
    ///
    /// let outcome = CorrelationOutcome::pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
    /// assert!((outcome.coefficient() - 1.0).abs() < 1e-12);
    /// assert!(outcome.p_value().unwrap() < 1e-12);
    /// ```
    pub fn pearson(x: &[f64], y: &[f64]) -> CorrResult<Self> {
        validate_pairs(x, y, 2)?;
        let n = x.len();
        let coefficient = calc_pearson(x, y)?;
        let (t_stat, p_value) = if n >= 3 {
            let (t, p) = calc_t_test(coefficient, n);
            (Some(t), Some(p))
        } else {
            (None, None)
        };
        Ok(CorrelationOutcome { n, coefficient, t_stat, p_value })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Sample correlation ρ ∈ [−1, 1].
    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    pub fn t_stat(&self) -> Option<f64> {
        self.t_stat
    }

    /// Two-sided p-value under H₀: ρ = 0, when `n ≥ 3`.
    pub fn p_value(&self) -> Option<f64> {
        self.p_value
    }
}

// ---- Helper methods ----

fn calc_pearson(x: &[f64], y: &[f64]) -> CorrResult<f64> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return Err(CorrError::ZeroVariance);
    }
    Ok((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

// (t, p) for ρ with n − 2 degrees of freedom.
fn calc_t_test(rho: f64, n: usize) -> (f64, f64) {
    let df = (n - 2) as f64;
    let slack = 1.0 - rho * rho;
    if slack <= 0.0 {
        return (rho.signum() * f64::INFINITY, 0.0);
    }
    let t = rho * (df / slack).sqrt();
    let p = match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    };
    (t, p)
}
