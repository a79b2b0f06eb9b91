//! Model parameters for the purchase-timing (BG/NBD) and monetary-value
//! (Gamma-Gamma) submodels.
//!
//! Purpose
//! -------
//! Hold validated, strictly positive parameter sets in model space and map
//! them to and from the unconstrained optimizer vector θ.
//!
//! Key behaviors
//! -------------
//! - [`PurchaseTimingParams::new`] / [`MonetaryValueParams::new`] reject any
//!   non-finite or non-positive entry.
//! - `to_theta` applies `θ = ln(param)` per entry; `from_theta` applies the
//!   clamped inverse `param = exp(θ)`, so any finite θ yields a valid set.
//!
//! Conventions
//! -----------
//! - θ layouts are fixed: `[ln r, ln α, ln a, ln b]` and `[ln p, ln q, ln v]`.
//! - Derivatives of the map are provided by
//!   [`from_unconstrained_deriv`](crate::optimization::numerical_stability::from_unconstrained_deriv)
//!   and applied by the models' gradient code.
use crate::{
    lifetime::errors::{ParamError, ParamResult},
    optimization::{
        loglik_optimizer::Theta,
        numerical_stability::{from_unconstrained, to_unconstrained},
    },
};
use ndarray::Array1;
use serde::Serialize;

/// Number of free parameters in the purchase-timing model.
pub const PURCHASE_TIMING_DIM: usize = 4;

/// Number of free parameters in the monetary-value model.
pub const MONETARY_VALUE_DIM: usize = 3;

/// BG/NBD parameters.
///
/// Transaction rates of active customers are Gamma(`r`, `alpha`) across the
/// population; the per-purchase dropout probability is Beta(`a`, `b`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PurchaseTimingParams {
    pub r: f64,
    pub alpha: f64,
    pub a: f64,
    pub b: f64,
}

impl PurchaseTimingParams {
    /// Validated constructor.
    ///
    /// # Errors
    /// [`ParamError::NonPositiveParam`] naming the first offending entry.
    pub fn new(r: f64, alpha: f64, a: f64, b: f64) -> ParamResult<Self> {
        validate_positive("r", r)?;
        validate_positive("alpha", alpha)?;
        validate_positive("a", a)?;
        validate_positive("b", b)?;
        Ok(Self { r, alpha, a, b })
    }

    /// Build from an optimizer vector `[ln r, ln α, ln a, ln b]`.
    ///
    /// # Errors
    /// - [`ParamError::ThetaLengthMismatch`] if `theta.len() != 4`.
    /// - [`ParamError::InvalidThetaInput`] for non-finite entries.
    pub fn from_theta(theta: &Theta) -> ParamResult<Self> {
        validate_theta(theta, PURCHASE_TIMING_DIM)?;
        Ok(Self {
            r: from_unconstrained(theta[0]),
            alpha: from_unconstrained(theta[1]),
            a: from_unconstrained(theta[2]),
            b: from_unconstrained(theta[3]),
        })
    }

    pub fn to_theta(&self) -> Theta {
        Array1::from(vec![
            to_unconstrained(self.r),
            to_unconstrained(self.alpha),
            to_unconstrained(self.a),
            to_unconstrained(self.b),
        ])
    }

    /// Sum of squared parameters, the L2 penalty base.
    pub fn sum_of_squares(&self) -> f64 {
        self.r * self.r + self.alpha * self.alpha + self.a * self.a + self.b * self.b
    }

    pub fn as_array(&self) -> [f64; PURCHASE_TIMING_DIM] {
        [self.r, self.alpha, self.a, self.b]
    }
}

/// Gamma-Gamma parameters.
///
/// Per-transaction spend is Gamma(`p`, ν) with ν ~ Gamma(`q`, `v`) across
/// customers, so the population mean spend is `p·v/(q − 1)` for `q > 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonetaryValueParams {
    pub p: f64,
    pub q: f64,
    pub v: f64,
}

impl MonetaryValueParams {
    /// Validated constructor.
    ///
    /// # Errors
    /// [`ParamError::NonPositiveParam`] naming the first offending entry.
    pub fn new(p: f64, q: f64, v: f64) -> ParamResult<Self> {
        validate_positive("p", p)?;
        validate_positive("q", q)?;
        validate_positive("v", v)?;
        Ok(Self { p, q, v })
    }

    /// Build from an optimizer vector `[ln p, ln q, ln v]`.
    pub fn from_theta(theta: &Theta) -> ParamResult<Self> {
        validate_theta(theta, MONETARY_VALUE_DIM)?;
        Ok(Self {
            p: from_unconstrained(theta[0]),
            q: from_unconstrained(theta[1]),
            v: from_unconstrained(theta[2]),
        })
    }

    pub fn to_theta(&self) -> Theta {
        Array1::from(vec![
            to_unconstrained(self.p),
            to_unconstrained(self.q),
            to_unconstrained(self.v),
        ])
    }

    pub fn sum_of_squares(&self) -> f64 {
        self.p * self.p + self.q * self.q + self.v * self.v
    }

    pub fn as_array(&self) -> [f64; MONETARY_VALUE_DIM] {
        [self.p, self.q, self.v]
    }
}

// ---- Helper methods ----

fn validate_positive(name: &'static str, value: f64) -> ParamResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ParamError::NonPositiveParam { name, value });
    }
    Ok(())
}

fn validate_theta(theta: &Theta, expected: usize) -> ParamResult<()> {
    if theta.len() != expected {
        return Err(ParamError::ThetaLengthMismatch { expected, actual: theta.len() });
    }
    for (index, &value) in theta.iter().enumerate() {
        if !value.is_finite() {
            return Err(ParamError::InvalidThetaInput { index, value });
        }
    }
    Ok(())
}
