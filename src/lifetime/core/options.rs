//! Lifetime-value options — configuration for fitting, projection and
//! aggregation.
//!
//! Purpose
//! -------
//! Collect every tuning knob of a lifetime-value run in validated carriers,
//! so the aggregator, the two fitters and the projector receive explicit
//! options instead of loose arguments.
//!
//! Key behaviors
//! -------------
//! - [`FitOptions`] bundles the L2 penalizer with the optimizer's
//!   [`MLEOptions`]; one instance per submodel.
//! - [`ProjectionOptions`] holds the horizon, period length and discount rate.
//! - [`InvalidRowPolicy`] decides whether a bad customer aborts aggregation or
//!   is set aside and reported.
//! - [`CltvConfig`] is the batch-level configuration used by the pipeline.
//!
//! Invariants & assumptions
//! ------------------------
//! - Penalizers and discount rates are finite and ≥ 0.
//! - Horizons have at least one period; periods are strictly positive.
//! - `MLEOptions` is validated by its own constructor and passed through.
//!
//! Conventions
//! -----------
//! - Model time is measured in weeks; [`ProjectionOptions::period_weeks`]
//!   converts the chrono period into that unit.
//! - Constructors return `CltvResult` and never panic.
use crate::{
    lifetime::errors::{CltvError, CltvResult},
    optimization::loglik_optimizer::MLEOptions,
};
use chrono::{Duration, NaiveDateTime};

/// Default L2 penalizer on the model parameters.
pub const DEFAULT_PENALIZER: f64 = 0.001;

/// Default per-period discount rate.
pub const DEFAULT_DISCOUNT_RATE: f64 = 0.01;

/// Default |ρ| above which the frequency/monetary diagnostic warns.
pub const DEFAULT_CORRELATION_WARNING: f64 = 0.3;

/// Milliseconds in one week, the model's time unit.
pub const MILLIS_PER_WEEK: f64 = 604_800_000.0;

/// FitOptions — penalizer and optimizer settings for one submodel.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    pub penalizer: f64,
    pub mle_opts: MLEOptions,
}

impl FitOptions {
    /// # Errors
    /// [`CltvError::InvalidPenalizer`] if `penalizer` is negative or
    /// non-finite.
    pub fn new(penalizer: f64, mle_opts: MLEOptions) -> CltvResult<Self> {
        validate_penalizer(penalizer)?;
        Ok(FitOptions { penalizer, mle_opts })
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        FitOptions { penalizer: DEFAULT_PENALIZER, mle_opts: MLEOptions::default() }
    }
}

/// ProjectionOptions — discounted horizon for the lifetime-value projector.
///
/// Fields
/// ------
/// - `horizon_periods`: number of periods `H` summed over (> 0).
/// - `period_length`: calendar length of one period (> 0, default 1 week).
/// - `discount_rate`: per-period rate `d` (finite, ≥ 0); period `i` is
///   weighted by `1/(1 + d)ⁱ`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionOptions {
    horizon_periods: usize,
    period_length: Duration,
    discount_rate: f64,
}

impl ProjectionOptions {
    /// # Errors
    /// - [`CltvError::InvalidHorizon`] when `horizon_periods == 0`.
    /// - [`CltvError::InvalidPeriodLength`] when `period_length ≤ 0`.
    /// - [`CltvError::InvalidDiscountRate`] when `discount_rate` is negative
    ///   or non-finite.
    pub fn new(
        horizon_periods: usize, period_length: Duration, discount_rate: f64,
    ) -> CltvResult<Self> {
        if horizon_periods == 0 {
            return Err(CltvError::InvalidHorizon { periods: horizon_periods });
        }
        let millis = period_length.num_milliseconds();
        if millis <= 0 {
            return Err(CltvError::InvalidPeriodLength { millis });
        }
        if !discount_rate.is_finite() || discount_rate < 0.0 {
            return Err(CltvError::InvalidDiscountRate { value: discount_rate });
        }
        Ok(ProjectionOptions { horizon_periods, period_length, discount_rate })
    }

    /// Weekly periods at the default discount rate.
    pub fn weekly(horizon_periods: usize) -> CltvResult<Self> {
        Self::new(horizon_periods, Duration::weeks(1), DEFAULT_DISCOUNT_RATE)
    }

    pub fn horizon_periods(&self) -> usize {
        self.horizon_periods
    }

    pub fn period_length(&self) -> Duration {
        self.period_length
    }

    pub fn discount_rate(&self) -> f64 {
        self.discount_rate
    }

    /// Period length in weeks.
    pub fn period_weeks(&self) -> f64 {
        self.period_length.num_milliseconds() as f64 / MILLIS_PER_WEEK
    }

    /// Total horizon in weeks.
    pub fn horizon_weeks(&self) -> f64 {
        self.horizon_periods as f64 * self.period_weeks()
    }
}

/// What the aggregator does with a customer whose records are invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidRowPolicy {
    /// Abort on the first invalid customer.
    #[default]
    FailFast,
    /// Drop the customer and report it alongside the features.
    SkipAndReport,
}

/// CltvConfig — configuration of one lifetime-value batch.
///
/// Built with [`CltvConfig::new`] and refined with the `with_*` methods.
#[derive(Debug, Clone, PartialEq)]
pub struct CltvConfig {
    pub analysis_date: NaiveDateTime,
    pub purchase_fit: FitOptions,
    pub monetary_fit: FitOptions,
    pub projection: ProjectionOptions,
    pub row_policy: InvalidRowPolicy,
    pub correlation_warning: f64,
}

impl CltvConfig {
    /// Defaults for everything except the analysis date and the horizon.
    pub fn new(analysis_date: NaiveDateTime, projection: ProjectionOptions) -> Self {
        CltvConfig {
            analysis_date,
            purchase_fit: FitOptions::default(),
            monetary_fit: FitOptions::default(),
            projection,
            row_policy: InvalidRowPolicy::default(),
            correlation_warning: DEFAULT_CORRELATION_WARNING,
        }
    }

    /// Set the same penalizer on both submodels.
    pub fn with_penalizer(mut self, penalizer: f64) -> CltvResult<Self> {
        validate_penalizer(penalizer)?;
        self.purchase_fit.penalizer = penalizer;
        self.monetary_fit.penalizer = penalizer;
        Ok(self)
    }

    /// Set the same optimizer options on both submodels.
    pub fn with_mle_options(mut self, mle_opts: MLEOptions) -> Self {
        self.purchase_fit.mle_opts = mle_opts.clone();
        self.monetary_fit.mle_opts = mle_opts;
        self
    }

    pub fn with_row_policy(mut self, row_policy: InvalidRowPolicy) -> Self {
        self.row_policy = row_policy;
        self
    }

    /// # Errors
    /// [`CltvError::InvalidCorrelationThreshold`] outside `[0, 1]`.
    pub fn with_correlation_warning(mut self, threshold: f64) -> CltvResult<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(CltvError::InvalidCorrelationThreshold { value: threshold });
        }
        self.correlation_warning = threshold;
        Ok(self)
    }
}

// ---- Helper methods ----

fn validate_penalizer(penalizer: f64) -> CltvResult<()> {
    if !penalizer.is_finite() || penalizer < 0.0 {
        return Err(CltvError::InvalidPenalizer { value: penalizer });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Validation in `FitOptions::new` and `ProjectionOptions::new`.
    // - Unit conversion of the projection period.
    // - `CltvConfig` defaults and builder methods.
    // -------------------------------------------------------------------------

    fn analysis_date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2011, 12, 11)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid date")
    }

    #[test]
    // Purpose
    // -------
    // Invalid projection settings are rejected with their own variants.
    //
    // Given
    // -----
    // - H = 0; a zero period; d = −0.1; d = NaN.
    //
    // Expect
    // ------
    // - `InvalidHorizon`, `InvalidPeriodLength`, `InvalidDiscountRate` ×2.
    fn projection_options_reject_invalid_settings() {
        assert!(matches!(
            ProjectionOptions::new(0, Duration::weeks(1), 0.01),
            Err(CltvError::InvalidHorizon { periods: 0 })
        ));
        assert!(matches!(
            ProjectionOptions::new(4, Duration::zero(), 0.01),
            Err(CltvError::InvalidPeriodLength { millis: 0 })
        ));
        assert!(matches!(
            ProjectionOptions::new(4, Duration::weeks(1), -0.1),
            Err(CltvError::InvalidDiscountRate { .. })
        ));
        assert!(matches!(
            ProjectionOptions::new(4, Duration::weeks(1), f64::NAN),
            Err(CltvError::InvalidDiscountRate { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Periods convert to weeks exactly.
    //
    // Given
    // -----
    // - 3 periods of 2 weeks; 1 period of 1 day.
    //
    // Expect
    // ------
    // - 2 weeks per period, 6 in total; 1/7 week for the day.
    fn period_length_converts_to_weeks() {
        // Arrange
        let fortnightly = ProjectionOptions::new(3, Duration::weeks(2), 0.0).expect("valid");
        let daily = ProjectionOptions::new(1, Duration::days(1), 0.0).expect("valid");

        // Assert
        assert_eq!(fortnightly.period_weeks(), 2.0);
        assert_eq!(fortnightly.horizon_weeks(), 6.0);
        assert!((daily.period_weeks() - 1.0 / 7.0).abs() < 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // Config defaults and builders.
    //
    // Given
    // -----
    // - `CltvConfig::new` followed by `with_penalizer(0.1)` and a bad
    //   threshold.
    //
    // Expect
    // ------
    // - Default penalizer 0.001 and FailFast; both penalizers 0.1 after the
    //   builder; negative penalizer and threshold 1.5 rejected.
    fn config_defaults_and_builders() {
        // Arrange
        let projection = ProjectionOptions::weekly(4).expect("valid");
        let config = CltvConfig::new(analysis_date(), projection);

        // Assert defaults
        assert_eq!(config.purchase_fit.penalizer, DEFAULT_PENALIZER);
        assert_eq!(config.row_policy, InvalidRowPolicy::FailFast);
        assert_eq!(config.projection.discount_rate(), DEFAULT_DISCOUNT_RATE);

        // Act
        let tuned = config.clone().with_penalizer(0.1).expect("valid penalizer");

        // Assert
        assert_eq!(tuned.purchase_fit.penalizer, 0.1);
        assert_eq!(tuned.monetary_fit.penalizer, 0.1);
        assert!(matches!(
            config.clone().with_penalizer(-1.0),
            Err(CltvError::InvalidPenalizer { .. })
        ));
        assert!(config.with_correlation_warning(1.5).is_err());
    }
}
