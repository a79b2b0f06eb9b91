//! loglik_optimizer — argmin-powered maximum-likelihood optimizer.
//!
//! Purpose
//! -------
//! Maximize a log-likelihood `ℓ(θ)` over an unconstrained parameter vector.
//! Models implement [`LogLikelihood`]; [`maximize`] runs L-BFGS with the
//! configured line search and stopping rules and returns an [`OptimOutcome`].
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] exposes `c(θ) = -ℓ(θ)` and `-∇ℓ(θ)` to argmin,
//!   falling back to finite differences when `grad` is not implemented.
//! - [`builders`] turns [`MLEOptions`] into a configured solver;
//!   [`run::run_lbfgs`] executes it with the iteration cap.
//! - [`finite_diff`] supplies gradients/Hessians by differencing, and
//!   [`validation`] guards every numeric hand-off.
//!
//! Invariants & assumptions
//! ------------------------
//! - Models return `ℓ` and `∇ℓ`, never the cost; sign flips live in the
//!   adapter only.
//! - Invalid θ or data are reported as [`OptError`](crate::optimization::errors::OptError),
//!   never as panics.
//! - [`OptimOutcome::converged`] is `true` only for a tolerance-based stop;
//!   reaching `max_iter` leaves it `false` so callers can raise a
//!   convergence error with the best estimate attached.
//!
//! Downstream usage
//! ----------------
//! - `lifetime::models::purchase_timing` (BG/NBD, k = 4) and
//!   `lifetime::models::monetary_value` (Gamma-Gamma, k = 3) implement
//!   [`LogLikelihood`] with analytic gradients in log-parameter space and
//!   call [`maximize`] from their `fit` methods.
//!
//! Testing notes
//! -------------
//! - `api` maximizes toy quadratics through both line searches and the FD
//!   fallback; `adapter`, `builders`, `finite_diff`, `traits` and
//!   `validation` test their local contracts.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
