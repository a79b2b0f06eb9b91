//! Model inputs — validated column views of the feature table.
//!
//! Purpose
//! -------
//! Give each fitter a column-oriented, validated copy of exactly the fields
//! it needs, so likelihood loops can assume clean data and each fitter owns
//! a disjoint projection of the feature table.
//!
//! Key behaviors
//! -------------
//! - [`PurchaseData`] holds `(frequency, recency, age)` for the BG/NBD fitter.
//! - [`MonetaryData`] holds `(frequency, monetary)` for the Gamma-Gamma
//!   fitter.
//! - Both constructors reject empty tables and report the first invalid row
//!   by index.
//!
//! Invariants & assumptions
//! ------------------------
//! - All columns have equal, non-zero length and only finite values.
//! - `PurchaseData`: `frequency ≥ 0`, `0 ≤ recency ≤ age`, `age > 0`.
//! - `MonetaryData`: `frequency ≥ 1`, `monetary > 0`.
//!
//! Conventions
//! -----------
//! - Frequencies are stored as `f64` since they only enter gamma-function
//!   arguments and products.
use crate::lifetime::{
    core::features::CustomerFeatures,
    errors::{CltvError, CltvResult},
};
use ndarray::Array1;

/// PurchaseData — BG/NBD inputs `(x, t_x, T)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseData {
    pub frequency: Array1<f64>,
    pub recency: Array1<f64>,
    pub age: Array1<f64>,
}

impl PurchaseData {
    /// Build from raw columns.
    ///
    /// # Errors
    /// - [`CltvError::EmptyFeatureTable`] for zero rows.
    /// - [`CltvError::InvalidFeature`] for a column length mismatch, negative
    ///   or non-finite values, or zero age.
    /// - [`CltvError::RecencyExceedsAge`] when `recency > age`.
    pub fn new(frequency: Array1<f64>, recency: Array1<f64>, age: Array1<f64>) -> CltvResult<Self> {
        let n = frequency.len();
        if n == 0 {
            return Err(CltvError::EmptyFeatureTable);
        }
        check_lengths(n, &[recency.len(), age.len()])?;
        for row in 0..n {
            let (x, t_x, big_t) = (frequency[row], recency[row], age[row]);
            check_non_negative(row, "frequency", x)?;
            check_non_negative(row, "recency", t_x)?;
            check_non_negative(row, "age", big_t)?;
            if big_t == 0.0 {
                return Err(CltvError::InvalidFeature {
                    row,
                    field: "age",
                    value: big_t,
                    reason: "must be > 0",
                });
            }
            if t_x > big_t {
                return Err(CltvError::RecencyExceedsAge { row, recency: t_x, age: big_t });
            }
        }
        Ok(PurchaseData { frequency, recency, age })
    }

    /// Project a feature table onto `(frequency, recency, age)`.
    pub fn from_features(features: &[CustomerFeatures]) -> CltvResult<Self> {
        Self::new(
            features.iter().map(|f| f.frequency as f64).collect(),
            features.iter().map(|f| f.recency).collect(),
            features.iter().map(|f| f.age).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }
}

/// MonetaryData — Gamma-Gamma inputs `(x, m)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MonetaryData {
    pub frequency: Array1<f64>,
    pub monetary: Array1<f64>,
}

impl MonetaryData {
    /// Build from raw columns.
    ///
    /// # Errors
    /// - [`CltvError::EmptyFeatureTable`] for zero rows.
    /// - [`CltvError::InvalidFeature`] for a length mismatch, `frequency < 1`,
    ///   or a non-positive or non-finite monetary value.
    pub fn new(frequency: Array1<f64>, monetary: Array1<f64>) -> CltvResult<Self> {
        let n = frequency.len();
        if n == 0 {
            return Err(CltvError::EmptyFeatureTable);
        }
        check_lengths(n, &[monetary.len()])?;
        for row in 0..n {
            let (x, m) = (frequency[row], monetary[row]);
            if !x.is_finite() || x < 1.0 {
                return Err(CltvError::InvalidFeature {
                    row,
                    field: "frequency",
                    value: x,
                    reason: "must be finite and >= 1",
                });
            }
            if !m.is_finite() || m <= 0.0 {
                return Err(CltvError::InvalidFeature {
                    row,
                    field: "monetary",
                    value: m,
                    reason: "must be finite and > 0",
                });
            }
        }
        Ok(MonetaryData { frequency, monetary })
    }

    /// Project a feature table onto `(frequency, monetary)`.
    pub fn from_features(features: &[CustomerFeatures]) -> CltvResult<Self> {
        Self::new(
            features.iter().map(|f| f.frequency as f64).collect(),
            features.iter().map(|f| f.monetary).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }
}

// ---- Helper methods ----

fn check_lengths(n: usize, others: &[usize]) -> CltvResult<()> {
    for &len in others {
        if len != n {
            return Err(CltvError::InvalidFeature {
                row: n.min(len),
                field: "column length",
                value: len as f64,
                reason: "columns must have equal length",
            });
        }
    }
    Ok(())
}

fn check_non_negative(row: usize, field: &'static str, value: f64) -> CltvResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CltvError::InvalidFeature { row, field, value, reason: "must be finite and >= 0" });
    }
    Ok(())
}
