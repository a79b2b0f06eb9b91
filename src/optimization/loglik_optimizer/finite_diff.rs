//! loglik_optimizer::finite_diff — finite-difference derivatives.
//!
//! Purpose
//! -------
//! Wrap the `finitediff` crate so the rest of the crate can ask for a
//! gradient or Hessian without touching its API, with validation and error
//! capture built in.
//!
//! Key behaviors
//! -------------
//! - [`run_fd_diff`]: forward-difference gradient. The objective closure
//!   cannot return `Result`, so errors are parked in a shared `RefCell` and
//!   re-raised after differencing.
//! - [`compute_hessian`]: central-difference Hessian of a gradient map, with
//!   a forward-difference retry when the central matrix fails validation,
//!   then symmetrized.
//!
//! Downstream usage
//! ----------------
//! - `adapter::ArgMinAdapter` falls back to [`run_fd_diff`] when a model
//!   provides no analytic gradient.
//! - `inference::hessian` builds the observed information from
//!   [`compute_hessian`] applied to the analytic cost gradient at θ̂.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, Theta,
        types::Hessian,
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Forward-difference gradient of `func` at `theta`.
///
/// `func` is expected to write any evaluation error into `closure_err` and
/// return `NaN`; the cell is cleared on entry and checked afterwards.
///
/// # Errors
/// - The captured error, converted into `OptError`.
/// - `GradientDimMismatch` / `InvalidGradient` from [`validate_grad`].
///
/// # Examples
/// ```rust
/// # use std::cell::RefCell;
/// # use argmin::core::Error;
/// # use ndarray::array;
/// # use rust_cltv::optimization::loglik_optimizer::finite_diff::run_fd_diff;
/// let closure_err: RefCell<Option<Error>> = RefCell::new(None);
/// let f = |x: &ndarray::Array1<f64>| x.dot(x);
/// let grad = run_fd_diff(&array![0.0, 1.0], &f, &closure_err).unwrap();
/// assert_eq!(grad.len(), 2);
/// ```
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    let dim = theta.len();
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, dim)?;
    Ok(fd_grad)
}

/// Symmetric finite-difference Hessian of the gradient map `f` at `theta`.
///
/// Central differences first; on a validation failure the central matrix is
/// discarded and a forward-difference matrix is built and validated instead.
///
/// # Errors
/// `HessianDimMismatch` / `InvalidHessian` when the forward fallback also
/// fails validation.
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let mut cent_hess = theta.central_hessian(f);
    match validate_hessian(&cent_hess, dim) {
        Ok(_) => {
            symmetrize_hess(&mut cent_hess);
            Ok(cent_hess)
        }
        Err(_) => {
            let mut forward_hess = theta.forward_hessian(f);
            validate_hessian(&forward_hess, dim)?;
            symmetrize_hess(&mut forward_hess);
            Ok(forward_hess)
        }
    }
}

// ---- Helper methods ----

// Average each off-diagonal pair in place; diagonal untouched.
fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}
