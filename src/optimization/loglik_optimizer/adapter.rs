//! Bridge from [`LogLikelihood`] to argmin's minimization traits.
//!
//! argmin minimizes, so the cost is `c(θ) = -ℓ(θ)` and analytic gradients
//! are negated. Models without an analytic gradient get finite differences
//! of the cost itself, which need no sign flip.
use std::cell::RefCell;

use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        finite_diff::run_fd_diff,
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// Bridges a user `LogLikelihood` to `argmin`'s `CostFunction` and `Gradient`.
///
/// - `CostFunction::cost` returns `-ℓ(θ)` (negative log-likelihood).
/// - `Gradient::gradient` returns:
///   - `-∇ℓ(θ)` if the user provides an analytic gradient, or
///   - a finite-difference gradient of the cost (no sign flip needed).
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate the cost `c(θ) = -ℓ(θ)`.
    ///
    /// - Calls the user's `value(θ, data)` and checks the result is finite.
    /// - Returns `Error(NonFiniteCost)` if the value is not finite.
    ///
    /// # Errors
    /// Propagates any `OptError` from the user’s `value` via `?`.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(theta, self.data)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(-output)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Gradient of the cost: `-∇ℓ(θ)` from the model, validated, or a
    /// finite-difference gradient of the cost when the model returns
    /// [`OptError::GradientNotImplemented`].
    ///
    /// # Errors
    /// - Any other error from the model's `grad`.
    /// - `GradientDimMismatch` / `InvalidGradient` from validation.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => Ok(self.fd_gradient(theta)?),
            Err(e) => Err(e.into()),
        }
    }
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    /// Construct a new adapter over a user `LogLikelihood` and its data.
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }

    // Central differences of the cost; forward differences when a cost
    // evaluation failed or the central result is not finite.
    fn fd_gradient(&self, theta: &Theta) -> OptResult<Grad> {
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let cost = |t: &Theta| match self.cost(t) {
            Ok(value) => value,
            Err(e) => {
                closure_err.borrow_mut().get_or_insert(e);
                f64::NAN
            }
        };
        let central = theta.central_diff(&cost);
        if closure_err.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
            return Ok(central);
        }
        run_fd_diff(theta, &cost, &closure_err)
    }
}
