//! statistical_tests::errors — error type for descriptive statistics.
//!
//! Purpose
//! -------
//! Report validation and degenerate-input failures of the routines in
//! `statistical_tests` (Pearson correlation, interpolated quantiles).
//!
//! Conventions
//! -----------
//! - Messages state the domain constraint that was violated.
//! - Errors are small, `Clone` and comparable so tests can match on them.
//! - `CltvError` wraps this type via `From<CorrError>`; the pipeline logs a
//!   failed diagnostic instead of aborting.

pub type CorrResult<T> = Result<T, CorrError>;

/// CorrError — error conditions for the correlation diagnostic and
/// quantile helpers.
#[derive(Debug, Clone, PartialEq)]
pub enum CorrError {
    /// The two samples differ in length.
    LengthMismatch { x_len: usize, y_len: usize },

    /// Fewer observations than the statistic needs.
    InsufficientData { n: usize, required: usize },

    /// A sample value is NaN/±inf.
    InvalidData { index: usize, value: f64 },

    /// One sample is constant, so the correlation is undefined.
    ZeroVariance,

    /// Quantile probability outside [0, 1].
    InvalidProbability(f64),
}

impl std::error::Error for CorrError {}

impl std::fmt::Display for CorrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorrError::LengthMismatch { x_len, y_len } => {
                write!(f, "Samples must have equal length, got {x_len} and {y_len}")
            }
            CorrError::InsufficientData { n, required } => {
                write!(f, "Need at least {required} observations, got {n}")
            }
            CorrError::InvalidData { index, value } => {
                write!(f, "Observation {index} is not finite: {value}")
            }
            CorrError::ZeroVariance => write!(f, "Correlation undefined for a constant sample"),
            CorrError::InvalidProbability(p) => {
                write!(f, "Quantile probability {p} must lie in [0, 1]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Display messages embed their payloads.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Offending values appear verbatim in messages.
    //
    // Given
    // -----
    // - `LengthMismatch { 3, 4 }` and `InvalidProbability(1.5)`.
    //
    // Expect
    // ------
    // - "3", "4" and "1.5" in the rendered strings.
    fn display_embeds_payload() {
        let mismatch = CorrError::LengthMismatch { x_len: 3, y_len: 4 }.to_string();
        let prob = CorrError::InvalidProbability(1.5).to_string();

        assert!(mismatch.contains('3') && mismatch.contains('4'));
        assert!(prob.contains("1.5"));
    }
}
