//! Quartile segmentation of lifetime values.
//!
//! Purpose
//! -------
//! Label each customer `D`, `C`, `B` or `A` by the quartile of their
//! projected value, and summarize each segment.
//!
//! Key behaviors
//! -------------
//! - Edges are the 25/50/75 % type-7 quantiles of the sorted **distinct**
//!   values, so heavy ties cannot collapse two edges onto one value.
//! - Buckets are right-closed: `D ≤ e₁ < C ≤ e₂ < B ≤ e₃ < A`.
//! - [`summarize`] reports count, mean and sum per segment, ordered `D..A`.
//!
//! Invariants & assumptions
//! ------------------------
//! - At least [`MIN_DISTINCT_VALUES`] distinct values are required; then
//!   every bucket is non-empty and the buckets are ordered.
//! - Stateless: the same values always produce the same labels.
//!
//! Ties
//! ----
//! Taking edges over distinct values is what guarantees four non-empty
//! buckets, and it changes what the labels mean once values repeat. They
//! are quartiles of the value range actually observed, not of the
//! population: with 20 customers at 1.0 and five spread above it, `D` holds
//! 21 of 25 customers. A population-based split (pandas `qcut`, say) keeps
//! the counts near a quarter each but then has to drop or merge duplicate
//! edges. Read segment counts from [`summarize`] rather than assuming n/4.
use crate::{
    lifetime::errors::{CltvError, CltvResult},
    statistical_tests::quantiles::quantile_sorted,
};
use serde::Serialize;

/// Distinct values needed for four non-empty buckets.
pub const MIN_DISTINCT_VALUES: usize = 4;

/// Value segment, ordered `D < C < B < A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Segment {
    D,
    C,
    B,
    A,
}

impl Segment {
    /// All segments, lowest first.
    pub const ALL: [Segment; 4] = [Segment::D, Segment::C, Segment::B, Segment::A];
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Segment::D => "D",
            Segment::C => "C",
            Segment::B => "B",
            Segment::A => "A",
        };
        f.write_str(label)
    }
}

/// QuartileEdges — the three cut points `e₁ < e₂ < e₃`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuartileEdges {
    pub lower: f64,
    pub median: f64,
    pub upper: f64,
}

impl QuartileEdges {
    /// Edges from the distinct values of `values`.
    ///
    /// # Errors
    /// - [`CltvError::NonFiniteValue`] for NaN/±inf at any index.
    /// - [`CltvError::InsufficientDistinctValues`] below
    ///   [`MIN_DISTINCT_VALUES`].
    pub fn from_values(values: &[f64]) -> CltvResult<Self> {
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(CltvError::NonFiniteValue { index, value });
        }
        let mut distinct = values.to_vec();
        distinct.sort_by(f64::total_cmp);
        distinct.dedup();
        if distinct.len() < MIN_DISTINCT_VALUES {
            return Err(CltvError::InsufficientDistinctValues {
                distinct: distinct.len(),
                required: MIN_DISTINCT_VALUES,
            });
        }
        Ok(QuartileEdges {
            lower: quantile_sorted(&distinct, 0.25)?,
            median: quantile_sorted(&distinct, 0.5)?,
            upper: quantile_sorted(&distinct, 0.75)?,
        })
    }

    /// Right-closed bucket of `value`.
    pub fn classify(&self, value: f64) -> Segment {
        if value <= self.lower {
            Segment::D
        } else if value <= self.median {
            Segment::C
        } else if value <= self.upper {
            Segment::B
        } else {
            Segment::A
        }
    }
}

/// Label every value, returning the edges alongside.
///
/// # Examples
/// ```rust
/// use rust_cltv::lifetime::valuation::segmentation::{assign, Segment};
///
/// let (_, labels) = assign(&[10.0, 20.0, 30.0, 40.0]).unwrap();
/// assert_eq!(labels, vec![Segment::D, Segment::C, Segment::B, Segment::A]);
/// ```
pub fn assign(values: &[f64]) -> CltvResult<(QuartileEdges, Vec<Segment>)> {
    let edges = QuartileEdges::from_values(values)?;
    let labels = values.iter().map(|&v| edges.classify(v)).collect();
    Ok((edges, labels))
}

/// Per-segment aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub segment: Segment,
    pub count: usize,
    pub mean: f64,
    pub sum: f64,
}

/// Count, mean and sum of `values` per segment, in `D..A` order.
///
/// `values` and `segments` are paired by index; extra entries on either side
/// are ignored. Empty segments are reported with count 0 and mean 0.
pub fn summarize(values: &[f64], segments: &[Segment]) -> Vec<SegmentSummary> {
    Segment::ALL
        .iter()
        .map(|&segment| {
            let (count, sum) = values
                .iter()
                .zip(segments)
                .filter(|(_, s)| **s == segment)
                .fold((0usize, 0.0), |(n, acc), (v, _)| (n + 1, acc + v));
            let mean = if count > 0 { sum / count as f64 } else { 0.0 };
            SegmentSummary { segment, count, mean, sum }
        })
        .collect()
}
