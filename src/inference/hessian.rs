//! inference::hessian — classical standard errors from observed information.
//!
//! Purpose
//! -------
//! Turn a fitted optimum into standard errors. The caller supplies the
//! gradient of the cost (negative penalized log-likelihood) in θ-space; its
//! finite-difference Jacobian at θ̂ is the observed information `J(θ̂)`.
//!
//! Key behaviors
//! -------------
//! - [`calc_standard_errors`] builds `J(θ̂)` via
//!   [`compute_hessian`], copies it into `nalgebra`, and returns
//!   `sqrt(diag(J⁺))` using a truncated symmetric eigendecomposition.
//! - Eigenvalues at or below [`EIGEN_EPS`] are dropped from the
//!   pseudoinverse, so weakly identified directions contribute nothing
//!   rather than blowing up.
//!
//! Conventions
//! -----------
//! - Results are in θ-space. With `param = exp(θ)` the delta method gives
//!   `se(param) = param · se(θ)`; the model fit types apply that map.
//! - The gradient closure cannot return `Result`; evaluation failures should
//!   be reported as non-finite entries, which surface as
//!   `OptError::InvalidHessian`.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{finite_diff::compute_hessian, types::Hessian},
    numerical_stability::EIGEN_EPS,
};
use nalgebra::DMatrix;
use ndarray::Array1;

/// Classical standard errors `sqrt(diag(J(θ̂)⁺))` in θ-space.
///
/// # Errors
/// `OptError::HessianDimMismatch` / `OptError::InvalidHessian` when the
/// finite-difference information matrix is malformed or non-finite.
///
/// # Examples
/// ```rust
/// # use ndarray::array;
/// # use rust_cltv::inference::hessian::calc_standard_errors;
/// let a = array![[4.0, 0.0], [0.0, 1.0]];
/// let grad = |theta: &ndarray::Array1<f64>| a.dot(theta);
/// let se = calc_standard_errors(&grad, &array![1.0, -1.0]).unwrap();
/// assert!((se[0] - 0.5).abs() < 1e-6);
/// assert!((se[1] - 1.0).abs() < 1e-6);
/// ```
pub fn calc_standard_errors<F: Fn(&Array1<f64>) -> Array1<f64>>(
    f: &F, theta_hat: &Array1<f64>,
) -> OptResult<Array1<f64>> {
    let obs_info = compute_hessian(f, theta_hat)?;
    Ok(solve_for_se(to_dmatrix(&obs_info)))
}

// ---- Helper methods ----

// Column-major copy into nalgebra; symmetry was already enforced upstream.
fn to_dmatrix(obs_info: &Hessian) -> DMatrix<f64> {
    DMatrix::from_fn(obs_info.nrows(), obs_info.ncols(), |i, j| obs_info[[i, j]])
}

// Var(θ̂ᵢ) = Σ_{k: λ_k > EIGEN_EPS} Q[i,k]² / λ_k with J = Q Λ Qᵀ.
fn solve_for_se(obs_info: DMatrix<f64>) -> Array1<f64> {
    let n = obs_info.nrows();
    let eigen = obs_info.symmetric_eigen();
    let q = eigen.eigenvectors;
    Array1::from_iter((0..n).map(|i| {
        eigen
            .eigenvalues
            .iter()
            .enumerate()
            .filter(|(_, lambda)| **lambda > EIGEN_EPS)
            .map(|(k, &lambda)| q[(i, k)] * q[(i, k)] / lambda)
            .sum::<f64>()
            .sqrt()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - SEs for a correlated quadratic against the analytic inverse.
    // - Truncation of a singular direction.
    // - Propagation of a non-finite gradient as an error.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // SEs equal sqrt(diag(A⁻¹)) for a coupled quadratic cost.
    //
    // Given
    // -----
    // - A = [[2, 1], [1, 2]], so A⁻¹ = [[2, −1], [−1, 2]] / 3.
    //
    // Expect
    // ------
    // - Both SEs ≈ sqrt(2/3).
    fn correlated_quadratic_matches_inverse_diagonal() {
        // Arrange
        let a = array![[2.0, 1.0], [1.0, 2.0]];
        let grad = |theta: &Array1<f64>| a.dot(theta);

        // Act
        let se = calc_standard_errors(&grad, &array![0.2, 0.4]).expect("finite information");

        // Assert
        let expected = (2.0f64 / 3.0).sqrt();
        assert!((se[0] - expected).abs() < 1e-6);
        assert!((se[1] - expected).abs() < 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // A zero-curvature direction is truncated instead of producing inf.
    //
    // Given
    // -----
    // - J = diag(4, 0).
    //
    // Expect
    // ------
    // - se = [0.5, 0.0], both finite.
    fn singular_direction_is_truncated() {
        // Arrange
        let grad = |theta: &Array1<f64>| array![4.0 * theta[0], 0.0];

        // Act
        let se = calc_standard_errors(&grad, &array![1.0, 1.0]).expect("finite information");

        // Assert
        assert!((se[0] - 0.5).abs() < 1e-6);
        assert_eq!(se[1], 0.0);
    }

    #[test]
    // Purpose
    // -------
    // A gradient that fails to evaluate surfaces as an invalid Hessian.
    //
    // Given
    // -----
    // - A closure returning NaN entries.
    //
    // Expect
    // ------
    // - `Err(OptError::InvalidHessian { .. })`.
    fn non_finite_gradient_is_an_error() {
        let grad = |_: &Array1<f64>| array![f64::NAN, f64::NAN];
        assert!(matches!(
            calc_standard_errors(&grad, &array![0.0, 0.0]),
            Err(OptError::InvalidHessian { .. })
        ));
    }
}
