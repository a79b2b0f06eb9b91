//! Executor wiring: run an argmin solver over an [`ArgMinAdapter`] and turn
//! the final state into an [`OptimOutcome`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
    },
};
#[cfg(feature = "obs_slog")]
use argmin::core::{CostFunction, Gradient};
use argmin::core::{Executor, State};
#[cfg(feature = "obs_slog")]
use argmin_math::ArgminL2Norm;

/// Run `solver` from `theta0` until it terminates or hits `opts.tols.max_iter`.
///
/// The returned outcome holds the **best** parameter seen (not the last
/// iterate), the best log-likelihood `ℓ(θ̂) = -cost`, the termination reason,
/// the iteration count, argmin's evaluation counters and the norm of the last
/// gradient when argmin kept one.
///
/// # Feature flags
/// With `obs_slog` enabled and `opts.verbose == true`, the starting
/// log-likelihood is logged and a terminal slog observer watches every
/// iteration.
///
/// # Errors
/// - Any argmin runtime error (line-search failure, cost-function error),
///   converted through `From<argmin::core::Error> for OptError`.
/// - Validation errors from [`OptimOutcome::new`] when the best parameter is
///   missing or non-finite.
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: argmin::core::Solver<
            ArgMinAdapter<'a, F>,
            argmin::core::IterState<Theta, Grad, (), (), (), f64>,
        > + Send
        + 'static,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&theta0, &problem)?;
    }
    let max_iters = opts.tols.max_iter.map(|m| m as u64);
    let executor = Executor::new(problem, solver).configure(|state| {
        let state = state.param(theta0);
        match max_iters {
            Some(cap) => state.max_iters(cap),
            None => state,
        }
    });
    #[cfg(feature = "obs_slog")]
    let executor = if opts.verbose {
        executor.add_observer(
            argmin_observer_slog::SlogLogger::term_noblock(),
            argmin::core::observers::ObserverMode::Always,
        )
    } else {
        executor
    };

    let mut state = executor.run()?.state().clone();
    let iterations = state.get_iter();
    let termination = state.get_termination_status().clone();
    log::debug!("L-BFGS stopped after {iterations} iterations: {termination:?}");
    let fn_evals = state.get_func_counts().clone();
    let last_grad = state.take_gradient();
    OptimOutcome::new(
        state.take_best_param(),
        -state.get_best_cost(),
        termination,
        iterations,
        fn_evals,
        last_grad,
    )
}

// ---- Helper methods ----

#[cfg(feature = "obs_slog")]
fn log_initial_state<F>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>) -> OptResult<()>
where
    F: LogLikelihood,
{
    let ll0 = -problem.cost(theta0)?;
    let g0n = problem.gradient(theta0).ok().map(|g| g.l2_norm());

    match g0n {
        Some(norm) => log::info!("L-BFGS start: ll = {ll0:.6}, |grad| = {norm:.6}"),
        None => log::info!("L-BFGS start: ll = {ll0:.6}"),
    }
    Ok(())
}
