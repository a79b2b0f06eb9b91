//! Gamma-Gamma monetary-value model.
//!
//! Spend per transaction is Gamma(p, ν) for each customer, with the scale ν
//! itself Gamma(q, v) across customers. Given `x` repeat purchases with
//! average spend `m`, the per-customer log-likelihood is
//!
//! ```text
//! ℓ = lnΓ(px+q) − lnΓ(px) − lnΓ(q) + q·ln v + (px−1)·ln m + px·ln x − (px+q)·ln(xm+v)
//! ```
//!
//! and the objective is `Σ ℓᵢ − penalizer·(p² + q² + v²)`, maximized in
//! θ = `[ln p, ln q, ln v]`. Prediction shrinks the observed average towards
//! the population mean `p·v/(q − 1)` with weight `px/(px + q − 1)` on the
//! customer's own history.
//!
//! The model assumes spend is independent of purchase frequency. It does not
//! test that; the pipeline logs a correlation diagnostic instead.
use crate::{
    inference::hessian::calc_standard_errors,
    lifetime::{
        core::{
            data::MonetaryData,
            features::CustomerFeatures,
            init::Init,
            options::FitOptions,
            params::{MONETARY_VALUE_DIM, MonetaryValueParams},
        },
        errors::{BestEstimate, CltvError, CltvResult},
    },
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Grad, LogLikelihood, OptimOutcome, Theta, maximize},
        numerical_stability::from_unconstrained_deriv,
    },
};
use ndarray::Array1;
use statrs::function::gamma::{digamma, ln_gamma};

/// MonetaryValueModel — Gamma-Gamma likelihood with an L2 penalty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonetaryValueModel {
    pub options: FitOptions,
}

impl MonetaryValueModel {
    pub fn new(options: FitOptions) -> Self {
        MonetaryValueModel { options }
    }

    /// Fit from method-of-moments starting values.
    ///
    /// # Errors
    /// Same as [`PurchaseTimingModel::fit`](super::purchase_timing::PurchaseTimingModel::fit),
    /// with a [`BestEstimate::MonetaryValue`] payload on convergence failure.
    pub fn fit(&self, data: &MonetaryData) -> CltvResult<MonetaryValueFit> {
        self.fit_with(data, Init::MethodOfMoments)
    }

    pub fn fit_with(
        &self, data: &MonetaryData, init: Init<MonetaryValueParams>,
    ) -> CltvResult<MonetaryValueFit> {
        let start = init.resolve(data);
        log::debug!("Gamma-Gamma fit on {} customers from {start:?}", data.len());

        let outcome = maximize(self, start.to_theta(), data, &self.options.mle_opts)?;
        let params = MonetaryValueParams::from_theta(&outcome.theta_hat)?;
        if !outcome.converged {
            log::warn!(
                "Gamma-Gamma fit stopped without converging after {} iterations ({})",
                outcome.iterations,
                outcome.status
            );
            return Err(CltvError::not_converged(BestEstimate::MonetaryValue(params), outcome));
        }

        log::info!(
            "Gamma-Gamma fit converged in {} iterations: p = {:.4}, q = {:.4}, v = {:.4}, ll = {:.4}",
            outcome.iterations,
            params.p,
            params.q,
            params.v,
            outcome.value
        );
        Ok(MonetaryValueFit { params, options: self.options.clone(), outcome })
    }
}

impl LogLikelihood for MonetaryValueModel {
    type Data = MonetaryData;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<f64> {
        let params = MonetaryValueParams::from_theta(theta)?;
        let MonetaryValueParams { p, q, v } = params;
        let (lg_q, q_ln_v) = (ln_gamma(q), q * v.ln());
        let mut total = 0.0;
        for row in 0..data.len() {
            let (x, m) = (data.frequency[row], data.monetary[row]);
            let px = p * x;
            let ll = ln_gamma(px + q) - ln_gamma(px) - lg_q + q_ln_v
                + (px - 1.0) * m.ln()
                + px * x.ln()
                - (px + q) * (x * m + v).ln();
            if !ll.is_finite() {
                return Err(OptError::NonFiniteLogLikTerm { row, value: ll });
            }
            total += ll;
        }
        Ok(total - self.options.penalizer * params.sum_of_squares())
    }

    fn check(&self, theta: &Theta, _data: &Self::Data) -> OptResult<()> {
        MonetaryValueParams::from_theta(theta)?;
        Ok(())
    }

    /// Analytic θ-gradient:
    ///
    /// ```text
    /// ∂ℓ/∂p = x·[ψ(px+q) − ψ(px) + ln m + ln x − ln(xm+v)]
    /// ∂ℓ/∂q = ψ(px+q) − ψ(q) + ln v − ln(xm+v)
    /// ∂ℓ/∂v = q/v − (px+q)/(xm+v)
    /// ```
    fn grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<Grad> {
        let params = MonetaryValueParams::from_theta(theta)?;
        let MonetaryValueParams { p, q, v } = params;
        let (psi_q, ln_v) = (digamma(q), v.ln());
        let mut g = [0.0_f64; MONETARY_VALUE_DIM];

        for row in 0..data.len() {
            let (x, m) = (data.frequency[row], data.monetary[row]);
            let px = p * x;
            let psi_pxq = digamma(px + q);
            let ln_pool = (x * m + v).ln();
            g[0] += x * (psi_pxq - digamma(px) + m.ln() + x.ln() - ln_pool);
            g[1] += psi_pxq - psi_q + ln_v - ln_pool;
            g[2] += q / v - (px + q) / (x * m + v);
        }

        let values = params.as_array();
        Ok(Array1::from_iter((0..MONETARY_VALUE_DIM).map(|j| {
            (g[j] - 2.0 * self.options.penalizer * values[j]) * from_unconstrained_deriv(theta[j])
        })))
    }
}

/// Result of a converged Gamma-Gamma fit.
#[derive(Debug, Clone, PartialEq)]
pub struct MonetaryValueFit {
    pub params: MonetaryValueParams,
    pub options: FitOptions,
    pub outcome: OptimOutcome,
}

impl MonetaryValueFit {
    pub fn log_likelihood(&self) -> f64 {
        self.outcome.value
    }

    /// Delta-method standard errors of `(p, q, v)`.
    pub fn standard_errors(&self, data: &MonetaryData) -> CltvResult<Array1<f64>> {
        let model = MonetaryValueModel::new(self.options.clone());
        let cost_grad = |theta: &Theta| match model.grad(theta, data) {
            Ok(g) => -g,
            Err(_) => Array1::from_elem(theta.len(), f64::NAN),
        };
        let se_theta = calc_standard_errors(&cost_grad, &self.params.to_theta())?;
        Ok(&se_theta * &Array1::from(self.params.as_array().to_vec()))
    }
}

impl MonetaryValueParams {
    /// Population mean spend per transaction, `p·v/(q − 1)`.
    ///
    /// # Errors
    /// [`CltvError::UndefinedPopulationMean`] when `q ≤ 1`.
    pub fn population_mean(&self) -> CltvResult<f64> {
        if self.q <= 1.0 {
            return Err(CltvError::UndefinedPopulationMean { q: self.q });
        }
        Ok(self.p * self.v / (self.q - 1.0))
    }

    /// Conditional expected spend per transaction.
    ///
    /// `(1 − w)·p·v/(q − 1) + w·m` with `w = px/(px + q − 1)`; a customer
    /// without repeats gets the population mean.
    ///
    /// # Errors
    /// - [`CltvError::UndefinedPopulationMean`] when `q ≤ 1`.
    /// - [`CltvError::InvalidFeature`] when `monetary` is non-finite or
    ///   non-positive (reported as row 0).
    pub fn expected_average_value(&self, customer: &CustomerFeatures) -> CltvResult<f64> {
        let m = customer.monetary;
        if !m.is_finite() || m <= 0.0 {
            return Err(CltvError::InvalidFeature {
                row: 0,
                field: "monetary",
                value: m,
                reason: "must be finite and > 0",
            });
        }
        let population = self.population_mean()?;
        let px = self.p * customer.frequency as f64;
        let weight = px / (px + self.q - 1.0);
        Ok((1.0 - weight) * population + weight * m)
    }
}
