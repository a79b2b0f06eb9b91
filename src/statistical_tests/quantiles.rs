//! Interpolated sample quantiles.
//!
//! Hyndman–Fan type 7: for sorted values `x₀ ≤ … ≤ x_{n−1}` and probability
//! `p`, let `h = (n − 1)·p`; the quantile is
//! `x_⌊h⌋ + (h − ⌊h⌋)·(x_⌊h⌋₊₁ − x_⌊h⌋)`. Used by the segmenter's quartile
//! edges and by the outlier thresholds in `preprocessing`.
use crate::statistical_tests::{
    errors::CorrResult,
    validation::{validate_probability, validate_sample},
};

/// Type-7 quantile of an already sorted, finite, non-empty slice.
///
/// # Errors
/// - `InsufficientData` when `sorted` is empty.
/// - `InvalidProbability` when `prob ∉ [0, 1]`.
pub fn quantile_sorted(sorted: &[f64], prob: f64) -> CorrResult<f64> {
    validate_sample(sorted, 1)?;
    validate_probability(prob)?;
    Ok(interpolate(sorted, prob))
}

/// Type-7 quantiles of an unsorted sample, one per entry of `probs`.
///
/// Sorts a copy of `values` once.
pub fn quantiles(values: &[f64], probs: &[f64]) -> CorrResult<Vec<f64>> {
    validate_sample(values, 1)?;
    for &prob in probs {
        validate_probability(prob)?;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(probs.iter().map(|&prob| interpolate(&sorted, prob)).collect())
}

// ---- Helper methods ----

fn interpolate(sorted: &[f64], prob: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * prob;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}
