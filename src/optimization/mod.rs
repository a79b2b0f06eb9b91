//! optimization — MLE stack, numerical helpers, and the optimizer error surface.
//!
//! Purpose
//! -------
//! Give the lifetime-value models one way to fit parameters: implement a
//! log-likelihood, pick tolerances, call `maximize`, and read back an
//! `OptimOutcome`. argmin, `finitediff` and the positivity transform stay
//! behind this module.
//!
//! Key behaviors
//! -------------
//! - `loglik_optimizer`: L-BFGS maximization of `ℓ(θ)` with More–Thuente or
//!   Hager–Zhang line search and a finite-difference fallback.
//! - `numerical_stability`: `θ = ln(param)` bijection with a clamped inverse,
//!   log-sum-exp, and the eigenvalue floor used for standard errors.
//! - `errors`: [`OptError`](errors::OptError) and `OptResult<T>`.
//!
//! Conventions
//! -----------
//! - User-facing values are expressed in terms of `ℓ`, never the internal
//!   cost `-ℓ`.
//! - This layer does not log progress beyond `debug!` at solver exit; the
//!   fitters own the info-level narrative.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
