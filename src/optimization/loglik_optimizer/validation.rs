//! Validation helpers shared by the optimizer.
//!
//! - Tolerances: [`verify_tol_grad`], [`verify_tol_cost`].
//! - Derivatives: [`validate_grad`], [`validate_hessian`].
//! - Results: [`validate_theta_hat`], [`validate_value`].
//!
//! Each helper reports the first offending entry through a dedicated
//! [`OptError`] variant.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, Theta, types::Hessian},
};

/// Optional gradient-norm tolerance: `None`, or finite and > 0.
///
/// # Errors
/// [`OptError::InvalidTolGrad`].
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Optional cost-change tolerance: `None`, or finite and > 0.
///
/// # Errors
/// [`OptError::InvalidTolCost`].
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Gradient must have length `dim` and only finite entries.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Unwrap the solver's best parameter, rejecting a missing or non-finite one.
///
/// # Errors
/// - [`OptError::MissingThetaHat`]
/// - [`OptError::InvalidThetaHat`]
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let t = theta_hat.ok_or(OptError::MissingThetaHat)?;
    for (index, &value) in t.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidThetaHat {
                index,
                value,
                reason: "Parameter estimates must be finite.",
            });
        }
    }
    Ok(t)
}

/// Log-likelihood values may be negative but must be finite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

/// Hessian must be `dim × dim` with only finite entries.
///
/// # Errors
/// - [`OptError::HessianDimMismatch`]
/// - [`OptError::InvalidHessian`] with the first offending `(row, col)`.
pub fn validate_hessian(hessian: &Hessian, dim: usize) -> OptResult<()> {
    if hessian.nrows() != dim || hessian.ncols() != dim {
        return Err(OptError::HessianDimMismatch {
            expected: dim,
            found: (hessian.nrows(), hessian.ncols()),
        });
    }
    for ((i, j), &value) in hessian.indexed_iter() {
        if !value.is_finite() {
            return Err(OptError::InvalidHessian { row: i, col: j, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the error variants each helper emits on its
    // first offending input. Happy paths are exercised by every fit.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Tolerances must be finite and positive.
    //
    // Given
    // -----
    // - NaN gradient tolerance, zero cost tolerance, `None`s.
    //
    // Expect
    // ------
    // - `InvalidTolGrad`, `InvalidTolCost`, and `Ok(())` for `None`.
    fn tolerance_checks_reject_nan_and_zero() {
        assert!(matches!(verify_tol_grad(Some(f64::NAN)), Err(OptError::InvalidTolGrad { .. })));
        assert!(matches!(verify_tol_cost(Some(0.0)), Err(OptError::InvalidTolCost { .. })));
        assert!(verify_tol_grad(None).is_ok());
        assert!(verify_tol_cost(None).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Gradient and θ̂ checks report the first non-finite index.
    //
    // Given
    // -----
    // - A gradient `[1, inf]`, a θ̂ `[nan, 0]`, and a missing θ̂.
    //
    // Expect
    // ------
    // - Index 1 for the gradient, index 0 for θ̂, `MissingThetaHat`.
    fn gradient_and_theta_hat_checks_report_first_offender() {
        // Act
        let grad_err = validate_grad(&array![1.0, f64::INFINITY], 2);
        let theta_err = validate_theta_hat(Some(array![f64::NAN, 0.0]));
        let missing = validate_theta_hat(None);

        // Assert
        assert!(matches!(grad_err, Err(OptError::InvalidGradient { index: 1, .. })));
        assert!(matches!(theta_err, Err(OptError::InvalidThetaHat { index: 0, .. })));
        assert_eq!(missing, Err(OptError::MissingThetaHat));
        assert!(matches!(
            validate_grad(&array![1.0], 2),
            Err(OptError::GradientDimMismatch { expected: 2, found: 1 })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Hessian shape and finiteness are enforced.
    //
    // Given
    // -----
    // - A 2×3 matrix and a 2×2 matrix with a NaN at (1, 0).
    //
    // Expect
    // ------
    // - `HessianDimMismatch` and `InvalidHessian { row: 1, col: 0 }`.
    fn hessian_check_enforces_shape_and_finiteness() {
        // Arrange
        let wrong_shape = Array2::<f64>::zeros((2, 3));
        let with_nan = array![[1.0, 0.0], [f64::NAN, 1.0]];

        // Act / Assert
        assert!(matches!(
            validate_hessian(&wrong_shape, 2),
            Err(OptError::HessianDimMismatch { .. })
        ));
        assert!(matches!(
            validate_hessian(&with_nan, 2),
            Err(OptError::InvalidHessian { row: 1, col: 0, .. })
        ));
    }
}
