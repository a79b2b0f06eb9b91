//! Public API surface for log-likelihood maximization.
//!
//! - [`LogLikelihood`]: trait users implement for their model.
//! - [`MLEOptions`] and [`Tolerances`]: configuration for the optimizer.
//! - [`LineSearcher`]: choice of line search used by L-BFGS.
//! - [`OptimOutcome`]: normalized result returned by the high-level `maximize` API.
//!
//! Convention: we *maximize* a user log-likelihood `ℓ(θ)` by minimizing the cost
//! `c(θ) = -ℓ(θ)`. If an analytic gradient is provided, it should be the gradient
//! of the log-likelihood (`∇ℓ(θ)`); the adapter flips the sign as needed.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Grad, Theta,
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// User-implemented log-likelihood interface.
///
/// You maximize `ℓ(θ)`; internally we minimize the cost `c(θ) = -ℓ(θ)`.
/// If you provide an analytic gradient, return the gradient of the
/// log-likelihood `∇ℓ(θ)` (the adapter flips the sign to match the cost).
///
/// - `type Data`: per-model data carried into `value`/`grad`/`check`.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate `ℓ(θ)`.
///   - Errors: return a descriptive `OptError` for invalid inputs or model failures.
/// - `check(&Theta, &Data) -> OptResult<()>`: validation hook to reject
///   obviously invalid `θ`/`data` pairs. Called once before optimization.
///
/// Optional:
/// - `grad(&Theta, &Data) -> OptResult<Grad>`: analytic gradient `∇ℓ(θ)`.
///   If not implemented, robust finite differences are used automatically.
pub trait LogLikelihood {
    type Data: 'static;

    // Required methods
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    // Optional methods
    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Choice of line search used inside the L-BFGS solver.
///
/// Variants:
/// - `MoreThuente`: More–Thuente line search.
/// - `HagerZhang`: Hager–Zhang line search.
///
/// Parsing:
/// This enum implements `FromStr` and accepts case-insensitive names
/// (`"MoreThuente"`, `"HagerZhang"`). Unknown names return
/// `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    /// Parse a line-search choice from a string (case-insensitive).
    ///
    /// Accepts:
    /// - `"MoreThuente"`
    /// - `"HagerZhang"`
    /// - Any case variant (e.g., `"morethuente"`, `"HAGERZHANG"`).
    ///
    /// Any other value returns `OptError::InvalidLineSearch` with a helpful message.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols: Tolerances` — numerical tolerances and iteration limits.
/// - `line_searcher: LineSearcher` — line-search algorithm used by L-BFGS.
/// - `verbose: bool` — if `true`, attaches an observer (behind the `obs_slog`
///   feature) and prints progress.
/// - `lbfgs_mem: Option<usize>` — L-BFGS history size; `None` uses
///   [`DEFAULT_LBFGS_MEM`](crate::optimization::loglik_optimizer::DEFAULT_LBFGS_MEM).
///
/// Constructor:
/// - `new(tols, line_searcher, verbose, lbfgs_mem) -> OptResult<Self>` — rejects
///   a zero memory size; numeric tolerances are validated in `Tolerances::new`.
///
/// Default:
/// - `tols`: `tol_grad = 1e-6`, `tol_cost = 1e-10`, `max_iter = 1000`
/// - `line_searcher`: `MoreThuente`
/// - `verbose`: `false`
/// - `lbfgs_mem`: `None` (uses default of 7)
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
}

impl MLEOptions {
    /// Create a new set of optimizer options.
    ///
    /// This constructor does not mutate values; validation of numeric fields is
    /// performed inside [`Tolerances::new`].
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { tols, line_searcher, verbose, lbfgs_mem })
    }
}

impl Default for MLEOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-6), tol_cost: Some(1e-10), max_iter: Some(1000) },
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
        }
    }
}

/// Numerical tolerances and iteration limits used by the optimizer.
///
/// - `tol_grad`: terminate when the gradient norm falls below this threshold.
/// - `tol_cost`: terminate when the change in cost falls below this threshold.
/// - `max_iter`: hard cap on the number of iterations.
///
/// Any field can be `None` but **at least one** of the three must be provided
/// (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Rules
    /// - At least one of `tol_grad`, `tol_cost`, or `max_iter` must be `Some`.
    /// - If provided, tolerances must be **finite and strictly positive**.
    /// - If provided, `max_iter` must be `> 0`.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for non-finite or non-positive tolerances.
    /// - `OptError::InvalidMaxIter` if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Canonical result returned by `maximize`.
///
/// - `theta_hat`: best parameter vector found.
/// - `value`: best **log-likelihood** value `ℓ(θ)` (not the cost).
/// - `converged`: `true` only if the solver met its tolerance
///   (`SolverConverged`) or reached a target cost. Hitting the iteration cap
///   is **not** convergence.
/// - `status`: human-readable termination status string.
/// - `aborted`: `true` when the solver quit on its own before any stopping
///   rule fired (`SolverExit`), typically a line-search breakdown.
/// - `iterations`: number of optimizer iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`.
/// - Keys follow argmin’s counters, e.g., cost_count, gradient_count, etc.
/// - `grad_norm`: norm of the last available gradient, if present.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub aborted: bool,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// Performs:
    /// - `theta_hat` check via `validate_theta_hat` (present and all finite).
    /// - `value` check via `validate_value` (finite).
    /// - Maps `TerminationStatus` into `(converged, status)`; only
    ///   `SolverConverged` and `TargetCostReached` count as converged.
    /// - Computes `grad_norm` if a gradient was provided.
    ///
    /// # Errors
    /// - Propagates any validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, converged: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let aborted = matches!(
            &converged,
            TerminationStatus::Terminated(TerminationReason::SolverExit(_))
        );
        let (converged, status) = match &converged {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(reason) => (
                matches!(
                    reason,
                    TerminationReason::SolverConverged | TerminationReason::TargetCostReached
                ),
                format!("{reason:?}"),
            ),
        };
        let iterations = iterations as usize;
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self { theta_hat, value, converged, status, aborted, iterations, fn_evals, grad_norm })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::collections::HashMap;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - `LineSearcher` parsing.
    // - `Tolerances` / `MLEOptions` validation rules.
    // - `OptimOutcome` convergence mapping from argmin termination reasons.
    //
    // They intentionally DO NOT cover:
    // - Running the solver; see `api` and the model-level tests.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Line-search names parse case-insensitively and unknown names fail.
    //
    // Given
    // -----
    // - "hagerZHANG", "MoreThuente", and "backtracking".
    //
    // Expect
    // ------
    // - The first two parse; the third is `InvalidLineSearch`.
    fn line_searcher_from_str_is_case_insensitive() {
        // Arrange / Act
        let hz = "hagerZHANG".parse::<LineSearcher>();
        let mt = "MoreThuente".parse::<LineSearcher>();
        let bad = "backtracking".parse::<LineSearcher>();

        // Assert
        assert_eq!(hz, Ok(LineSearcher::HagerZhang));
        assert_eq!(mt, Ok(LineSearcher::MoreThuente));
        assert!(matches!(bad, Err(OptError::InvalidLineSearch { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Tolerances reject an all-`None` configuration and invalid values.
    //
    // Given
    // -----
    // - All-`None`, a negative gradient tolerance, and `max_iter = 0`.
    //
    // Expect
    // ------
    // - `NoTolerancesProvided`, `InvalidTolGrad`, `InvalidMaxIter`.
    fn tolerances_new_rejects_invalid_configurations() {
        // Act
        let none = Tolerances::new(None, None, None);
        let neg = Tolerances::new(Some(-1.0), None, None);
        let zero_iter = Tolerances::new(None, None, Some(0));

        // Assert
        assert_eq!(none, Err(OptError::NoTolerancesProvided));
        assert!(matches!(neg, Err(OptError::InvalidTolGrad { .. })));
        assert!(matches!(zero_iter, Err(OptError::InvalidMaxIter { .. })));
    }

    #[test]
    // Purpose
    // -------
    // A zero L-BFGS memory is rejected; the default options are usable.
    //
    // Given
    // -----
    // - `MLEOptions::new` with `lbfgs_mem = Some(0)`.
    // - `MLEOptions::default()`.
    //
    // Expect
    // ------
    // - `InvalidLBFGSMem`; default carries a cost tolerance and iteration cap.
    fn mle_options_validate_memory_and_default_is_complete() {
        // Arrange
        let tols = Tolerances::new(Some(1e-6), None, Some(10)).expect("valid tolerances");

        // Act
        let bad = MLEOptions::new(tols, LineSearcher::MoreThuente, false, Some(0));
        let default = MLEOptions::default();

        // Assert
        assert!(matches!(bad, Err(OptError::InvalidLBFGSMem { mem: 0, .. })));
        assert_eq!(default.tols.max_iter, Some(1000));
        assert!(default.tols.tol_cost.is_some());
    }

    #[test]
    // Purpose
    // -------
    // Only genuine convergence reasons set `converged`; the iteration cap
    // does not.
    //
    // Given
    // -----
    // - Outcomes built with `SolverConverged` and `MaxItersReached`.
    //
    // Expect
    // ------
    // - `converged` is `true` for the first and `false` for the second.
    fn optim_outcome_treats_iteration_cap_as_not_converged() {
        // Arrange
        let theta = array![0.5, -0.5];
        let status_ok = TerminationStatus::Terminated(TerminationReason::SolverConverged);
        let status_cap = TerminationStatus::Terminated(TerminationReason::MaxItersReached);

        // Act
        let ok = OptimOutcome::new(
            Some(theta.clone()),
            -1.0,
            status_ok,
            12,
            HashMap::new(),
            Some(array![0.0, 0.0]),
        )
        .expect("valid outcome");
        let cap = OptimOutcome::new(Some(theta), -1.0, status_cap, 1000, HashMap::new(), None)
            .expect("valid outcome");

        // Assert
        assert!(ok.converged);
        assert_eq!(ok.grad_norm, Some(0.0));
        assert!(!cap.converged);
        assert!(!cap.aborted);
        assert!(cap.status.contains("MaxIters"));
    }

    #[test]
    // Purpose
    // -------
    // A solver exit is flagged as an abort, distinct from the iteration cap.
    //
    // Given
    // -----
    // - An outcome built with `SolverExit("Line search terminated ...")`.
    //
    // Expect
    // ------
    // - `converged == false`, `aborted == true`, the message kept in `status`.
    fn optim_outcome_flags_solver_exit_as_aborted() {
        // Arrange
        let reason = TerminationReason::SolverExit(
            "Line search terminated with: 'search direction'".to_string(),
        );
        let status = TerminationStatus::Terminated(reason);

        // Act
        let out = OptimOutcome::new(Some(array![0.1]), -3.0, status, 1, HashMap::new(), None)
            .expect("valid outcome");

        // Assert
        assert!(!out.converged);
        assert!(out.aborted);
        assert!(out.status.contains("Line search"));
    }
}
