//! loglik_optimizer::builders — L-BFGS solver construction.
//!
//! Purpose
//! -------
//! Turn an [`MLEOptions`] into a ready-to-run argmin L-BFGS solver for the
//! chosen line search. Builders only apply the history size and stopping
//! tolerances; the initial point and the iteration cap belong to the runner
//! (`run::run_lbfgs`), which owns the executor.
//!
//! Conventions
//! -----------
//! - History size is `opts.lbfgs_mem`, or [`DEFAULT_LBFGS_MEM`] when unset.
//! - A `None` tolerance leaves argmin's default in place.
//! - argmin rejections surface as [`OptResult`] errors through
//!   `From<argmin::core::Error> for OptError`.
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

/// L-BFGS with a Hager–Zhang line search, tolerances taken from `opts`.
///
/// # Errors
/// Propagates argmin's rejection of a tolerance value as an `OptError`.
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)
}

/// L-BFGS with a More–Thuente line search, tolerances taken from `opts`.
///
/// This is the solver used by the default [`MLEOptions`]; More–Thuente
/// tolerates the large first steps the lifetime-value likelihoods produce
/// when the method-of-moments start is far from the optimum.
///
/// # Errors
/// Propagates argmin's rejection of a tolerance value as an `OptError`.
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// Apply the optional gradient-norm and cost-change tolerances to `solver`.
///
/// Generic over the line search so both builders share one code path.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}
