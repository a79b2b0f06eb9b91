//! Starting values for the likelihood fits.
//!
//! Purpose
//! -------
//! Provide deterministic starting points for L-BFGS so repeated fits on the
//! same table walk the same path and return identical estimates.
//!
//! Key behaviors
//! -------------
//! - [`Init::MethodOfMoments`] derives starting values from the data:
//!   - BG/NBD rates: with per-customer rates `λᵢ = xᵢ/Tᵢ`, mean `m` and
//!     variance `s²`, a Gamma fit gives `r = m²/s²`, `α = m/s²`
//!     (falling back to `r = 1`, `α = 1/m` for a degenerate spread).
//!   - BG/NBD dropout: the proxy `pᵢ = (1 − t_x/T)/(x + 1)` is matched to
//!     Beta moments with concentration `κ = m(1 − m)/v − 1` (fallback 2).
//!   - Gamma-Gamma: `p = 1`, `q = 2 + M²/V` (fallback 3), `v = M(q − 1)/p`,
//!     which reproduces the sample mean spend `M`.
//! - [`Init::Fixed`] starts from caller-supplied parameters, e.g. a previous
//!   fit.
//!
//! Invariants & assumptions
//! ------------------------
//! - Moment-based values are clamped to `[1e-4, 1e4]` so the first
//!   likelihood evaluation stays inside the well-conditioned region.
//! - Inputs are validated containers, so means are finite and ages positive.
use crate::lifetime::core::{
    data::{MonetaryData, PurchaseData},
    params::{MonetaryValueParams, PurchaseTimingParams},
};
use ndarray::Array1;

/// Lower clamp for moment-based starting values.
const MIN_START: f64 = 1e-4;

/// Upper clamp for moment-based starting values.
const MAX_START: f64 = 1e4;

/// Bounds on the per-customer dropout proxy.
const DROPOUT_PROXY_BOUNDS: (f64, f64) = (0.01, 0.99);

/// Beta concentration used when the proxy moments are degenerate.
const FALLBACK_CONCENTRATION: f64 = 2.0;

/// Gamma-Gamma `q` used when the spend variance is zero.
const FALLBACK_SHAPE_Q: f64 = 3.0;

/// Starting-value policy for a fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Init<P> {
    MethodOfMoments,
    Fixed(P),
}

impl<P> Default for Init<P> {
    fn default() -> Self {
        Init::MethodOfMoments
    }
}

impl Init<PurchaseTimingParams> {
    pub fn resolve(&self, data: &PurchaseData) -> PurchaseTimingParams {
        match self {
            Init::MethodOfMoments => purchase_timing_moments(data),
            Init::Fixed(params) => *params,
        }
    }
}

impl Init<MonetaryValueParams> {
    pub fn resolve(&self, data: &MonetaryData) -> MonetaryValueParams {
        match self {
            Init::MethodOfMoments => monetary_value_moments(data),
            Init::Fixed(params) => *params,
        }
    }
}

/// Method-of-moments starting values for BG/NBD.
pub fn purchase_timing_moments(data: &PurchaseData) -> PurchaseTimingParams {
    let rates: Array1<f64> = &data.frequency / &data.age;
    let (m, s2) = mean_var(&rates);
    let (r, alpha) = if s2 > 0.0 && m > 0.0 {
        (m * m / s2, m / s2)
    } else if m > 0.0 {
        (1.0, 1.0 / m)
    } else {
        (1.0, 1.0)
    };

    let (lo, hi) = DROPOUT_PROXY_BOUNDS;
    let proxy: Array1<f64> = ndarray::Zip::from(&data.frequency)
        .and(&data.recency)
        .and(&data.age)
        .map_collect(|&x, &t_x, &big_t| ((1.0 - t_x / big_t) / (x + 1.0)).clamp(lo, hi));
    let (pm, pv) = mean_var(&proxy);
    let kappa = if pv > 0.0 { pm * (1.0 - pm) / pv - 1.0 } else { FALLBACK_CONCENTRATION };
    let kappa = if kappa.is_finite() && kappa > 0.0 { kappa } else { FALLBACK_CONCENTRATION };

    PurchaseTimingParams {
        r: clamp_start(r),
        alpha: clamp_start(alpha),
        a: clamp_start(pm * kappa),
        b: clamp_start((1.0 - pm) * kappa),
    }
}

/// Method-of-moments starting values for Gamma-Gamma.
pub fn monetary_value_moments(data: &MonetaryData) -> MonetaryValueParams {
    let (mean, var) = mean_var(&data.monetary);
    let q = if var > 0.0 { 2.0 + mean * mean / var } else { FALLBACK_SHAPE_Q };
    let p = 1.0;
    let v = mean * (q - 1.0) / p;
    MonetaryValueParams { p, q: clamp_start(q), v: clamp_start(v) }
}

// ---- Helper methods ----

// Population mean and variance; callers guarantee a non-empty input.
fn mean_var(values: &Array1<f64>) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.sum() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var)
}

fn clamp_start(value: f64) -> f64 {
    if value.is_finite() { value.clamp(MIN_START, MAX_START) } else { 1.0 }
}
