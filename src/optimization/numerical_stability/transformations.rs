//! Numerical stability utilities.
//!
//! Guarded scalar transforms that keep `f64` arithmetic well conditioned
//! inside likelihood evaluations and parameter mappings.
//!
//! # Provided items
//! - [`LOG_PARAM_BOUND`]: clamp on the log-parameter before exponentiation.
//! - [`to_unconstrained`] / [`from_unconstrained`]: the positivity bijection
//!   `param = exp(θ)` used by every fitter, with derivative
//!   [`from_unconstrained_deriv`].
//! - [`log_sum_exp2`]: overflow-free `ln(eᵃ + eᵇ)`.
//! - [`softplus`]: overflow-free `ln(1 + eˣ)`.
//! - [`EIGEN_EPS`]: eigenvalue floor for pseudoinverses.

/// Bound on `|θ|` before `exp` is applied.
///
/// `exp(±40)` spans roughly `4e-18 .. 2e17`, wide enough for any
/// realistic BG/NBD or Gamma-Gamma parameter while keeping `param²` in the
/// penalty and `lnΓ(param·x)` finite when a line search tries a long step.
pub const LOG_PARAM_BOUND: f64 = 40.0;

/// Eigenvalues at or below this are treated as zero in pseudoinverses.
pub const EIGEN_EPS: f64 = 1e-10;

/// Map a strictly positive model parameter into optimizer space: `θ = ln(x)`.
///
/// Callers guarantee `x > 0` and finite (checked at parameter construction).
pub fn to_unconstrained(x: f64) -> f64 {
    x.ln()
}

/// Map an optimizer coordinate back to a positive parameter: `x = exp(θ)`.
///
/// `θ` is clamped to `±LOG_PARAM_BOUND`, so the result is always finite and
/// strictly positive.
pub fn from_unconstrained(theta: f64) -> f64 {
    theta.clamp(-LOG_PARAM_BOUND, LOG_PARAM_BOUND).exp()
}

/// Derivative `dx/dθ` of [`from_unconstrained`].
///
/// Equal to `exp(θ)` inside the clamp and `0` outside it, where the map is
/// flat.
pub fn from_unconstrained_deriv(theta: f64) -> f64 {
    if theta.abs() > LOG_PARAM_BOUND { 0.0 } else { theta.exp() }
}

/// Stable two-term log-sum-exp: `ln(eᵃ + eᵇ)`.
///
/// Shifts by the larger argument so neither exponent can overflow. An
/// argument of `-∞` contributes nothing.
pub fn log_sum_exp2(a: f64, b: f64) -> f64 {
    let m = a.max(b);
    if m == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    m + ((a - m).exp() + (b - m).exp()).ln()
}

/// Stable softplus: `ln(1 + eˣ)`.
///
/// `exp(-softplus(x))` is the logistic weight `1/(1 + eˣ)` without ever
/// forming `eˣ` for large `x`.
pub fn softplus(x: f64) -> f64 {
    if x > 0.0 { x + (-x).exp().ln_1p() } else { x.exp().ln_1p() }
}
