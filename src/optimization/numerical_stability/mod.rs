//! numerical_stability — guarded transforms shared by the fitters.
//!
//! Purpose
//! -------
//! Keep the positivity bijection, the log-sum-exp used by the BG/NBD
//! likelihood, and the eigenvalue floor used by standard errors in one place
//! so every model applies identical guards.
//!
//! Conventions
//! -----------
//! - Model parameters are strictly positive; optimizer coordinates are
//!   `θ = ln(param)`. The inverse map clamps `θ` to `±LOG_PARAM_BOUND`.
//! - Pure functions only: no logging, no allocation.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    EIGEN_EPS, LOG_PARAM_BOUND, from_unconstrained, from_unconstrained_deriv, log_sum_exp2,
    softplus, to_unconstrained,
};

pub mod prelude {
    pub use super::transformations::{from_unconstrained, log_sum_exp2, to_unconstrained};
}
