//! Batch pipeline — transactions to segmented lifetime values.
//!
//! Purpose
//! -------
//! Run one complete lifetime-value batch for a fixed analysis date:
//! aggregate, fit both submodels, project, segment and report.
//!
//! Key behaviors
//! -------------
//! - The BG/NBD and Gamma-Gamma fits run as a fork-join on
//!   [`std::thread::scope`]. Each worker owns its own column projection of
//!   the feature table and returns an immutable fit; a panicking worker is
//!   reported as [`CltvError::WorkerPanicked`].
//! - The frequency/monetary Pearson correlation is computed as a
//!   diagnostic: logged at `info`, at `warn` above
//!   [`CltvConfig::correlation_warning`], stored in the report, and never
//!   allowed to fail the batch.
//! - Projection and segmentation are pure maps over the feature table.
//!
//! Invariants & assumptions
//! ------------------------
//! - Reports are deterministic for the same input and configuration.
//! - `forecasts` follow the feature-table order (sorted by customer ID when
//!   the table comes from [`aggregate`]).
use crate::{
    lifetime::{
        core::{
            data::{MonetaryData, PurchaseData},
            features::{AggregationOutcome, CustomerFeatures, RejectedCustomer, aggregate},
            options::CltvConfig,
            records::TransactionRecord,
        },
        errors::{CltvError, CltvResult},
        models::{MonetaryValueFit, MonetaryValueModel, PurchaseTimingFit, PurchaseTimingModel},
        valuation::{
            projection::{LifetimeValue, project},
            segmentation::{QuartileEdges, Segment, SegmentSummary, assign, summarize},
        },
    },
    statistical_tests::correlation::CorrelationOutcome,
};
use serde::Serialize;
use std::thread;

/// Final per-customer output row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerForecast {
    pub customer_id: String,
    pub expected_purchases: f64,
    pub expected_average_value: f64,
    pub probability_alive: f64,
    pub cltv: f64,
    pub segment: Segment,
}

impl CustomerForecast {
    fn from_value(value: LifetimeValue, segment: Segment) -> Self {
        CustomerForecast {
            customer_id: value.customer_id,
            expected_purchases: value.expected_purchases,
            expected_average_value: value.expected_average_value,
            probability_alive: value.probability_alive,
            cltv: value.cltv,
            segment,
        }
    }
}

/// Everything one batch produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CltvReport {
    pub forecasts: Vec<CustomerForecast>,
    pub edges: QuartileEdges,
    pub summaries: Vec<SegmentSummary>,
    pub purchase_fit: PurchaseTimingFit,
    pub monetary_fit: MonetaryValueFit,
    /// `None` when the diagnostic could not be computed (e.g. constant
    /// frequencies).
    pub correlation: Option<CorrelationOutcome>,
    pub single_purchase: usize,
    pub rejected: Vec<RejectedCustomer>,
}

/// CltvPipeline — runs batches under one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CltvPipeline {
    pub config: CltvConfig,
}

impl CltvPipeline {
    pub fn new(config: CltvConfig) -> Self {
        CltvPipeline { config }
    }

    /// Run a batch from raw transactions.
    ///
    /// # Errors
    /// - Aggregation errors under [`InvalidRowPolicy::FailFast`](crate::lifetime::core::options::InvalidRowPolicy).
    /// - [`CltvError::EmptyFeatureTable`] when no customer has a repeat
    ///   purchase.
    /// - Fit, projection and segmentation errors as documented on those
    ///   components.
    pub fn run(&self, records: &[TransactionRecord]) -> CltvResult<CltvReport> {
        let aggregated = aggregate(records, self.config.analysis_date, self.config.row_policy)?;
        self.run_aggregated(aggregated)
    }

    /// Run a batch from a prepared feature table.
    pub fn run_features(&self, features: Vec<CustomerFeatures>) -> CltvResult<CltvReport> {
        self.run_aggregated(AggregationOutcome { features, single_purchase: 0, rejected: Vec::new() })
    }

    fn run_aggregated(&self, aggregated: AggregationOutcome) -> CltvResult<CltvReport> {
        let AggregationOutcome { features, single_purchase, rejected } = aggregated;
        let purchase_data = PurchaseData::from_features(&features)?;
        let monetary_data = MonetaryData::from_features(&features)?;

        let correlation = self.correlation_diagnostic(&monetary_data);
        let (purchase_fit, monetary_fit) = self.fit_models(purchase_data, monetary_data)?;

        let values = project(
            &features,
            &purchase_fit.params,
            &monetary_fit.params,
            &self.config.projection,
        )?;
        let cltv: Vec<f64> = values.iter().map(|v| v.cltv).collect();
        let (edges, labels) = assign(&cltv)?;
        let summaries = summarize(&cltv, &labels);
        for s in &summaries {
            log::info!(
                "Segment {}: {} customers, mean CLTV {:.2}, total {:.2}",
                s.segment,
                s.count,
                s.mean,
                s.sum
            );
        }

        let forecasts = values
            .into_iter()
            .zip(labels)
            .map(|(value, segment)| CustomerForecast::from_value(value, segment))
            .collect();
        Ok(CltvReport {
            forecasts,
            edges,
            summaries,
            purchase_fit,
            monetary_fit,
            correlation,
            single_purchase,
            rejected,
        })
    }

    // ---- Helper methods ----

    // Fork-join over the two independent fits; each worker owns its data.
    fn fit_models(
        &self, purchase_data: PurchaseData, monetary_data: MonetaryData,
    ) -> CltvResult<(PurchaseTimingFit, MonetaryValueFit)> {
        let purchase_model = PurchaseTimingModel::new(self.config.purchase_fit.clone());
        let monetary_model = MonetaryValueModel::new(self.config.monetary_fit.clone());

        let (purchase, monetary) = thread::scope(|scope| {
            let purchase = scope.spawn(move || purchase_model.fit(&purchase_data));
            let monetary = scope.spawn(move || monetary_model.fit(&monetary_data));
            (purchase.join(), monetary.join())
        });

        let purchase = purchase.map_err(|_| CltvError::WorkerPanicked { task: "BG/NBD fit" })?;
        let monetary =
            monetary.map_err(|_| CltvError::WorkerPanicked { task: "Gamma-Gamma fit" })?;
        Ok((purchase?, monetary?))
    }

    fn correlation_diagnostic(&self, data: &MonetaryData) -> Option<CorrelationOutcome> {
        let frequency = data.frequency.to_vec();
        let monetary = data.monetary.to_vec();
        match CorrelationOutcome::pearson(&frequency, &monetary) {
            Ok(outcome) => {
                let rho = outcome.coefficient();
                log::info!(
                    "Frequency/monetary correlation: rho = {rho:.4}, p = {:?} (n = {})",
                    outcome.p_value(),
                    outcome.n()
                );
                if rho.abs() > self.config.correlation_warning {
                    log::warn!(
                        "Frequency and monetary value are correlated (|rho| = {:.4} > {}); \
                         Gamma-Gamma spend estimates may be biased",
                        rho.abs(),
                        self.config.correlation_warning
                    );
                }
                Some(outcome)
            }
            Err(err) => {
                log::info!("Frequency/monetary correlation not computed: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifetime::{core::options::ProjectionOptions, errors::ErrorKind};
    use chrono::NaiveDate;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - A full batch from a hand-built feature table.
    // - Determinism of the report.
    // - The diagnostic degrading to `None` instead of failing.
    // - Empty feature tables.
    // -------------------------------------------------------------------------

    fn config() -> CltvConfig {
        let date = NaiveDate::from_ymd_opt(2011, 12, 11)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid date");
        CltvConfig::new(date, ProjectionOptions::weekly(12).expect("valid horizon"))
    }

    fn features() -> Vec<CustomerFeatures> {
        [
            (1, 2.0, 10.0, 35.0),
            (2, 4.0, 12.0, 22.5),
            (3, 9.0, 11.0, 41.0),
            (1, 0.5, 14.0, 12.0),
            (6, 13.0, 15.0, 28.3),
            (4, 6.0, 18.0, 55.0),
            (2, 1.0, 9.0, 19.9),
            (8, 16.0, 17.0, 31.2),
            (1, 7.0, 20.0, 74.0),
            (5, 10.0, 13.0, 26.6),
            (3, 3.0, 16.0, 18.4),
            (2, 11.0, 19.0, 47.5),
        ]
        .iter()
        .enumerate()
        .map(|(i, &(x, t_x, t, m))| CustomerFeatures::new(format!("c{i:02}"), x, t_x, t, m))
        .collect()
    }

    #[test]
    // Purpose
    // -------
    // A batch produces one finite, segmented forecast per customer.
    //
    // Given
    // -----
    // - 12 customers, 12 weekly periods, default options.
    //
    // Expect
    // ------
    // - 12 forecasts in input order, cltv ≥ 0, all four segments used,
    //   summaries counting every customer, a correlation diagnostic.
    fn batch_produces_segmented_forecasts() {
        // Arrange
        let pipeline = CltvPipeline::new(config());

        // Act
        let report = pipeline.run_features(features()).expect("batch succeeds");

        // Assert
        assert_eq!(report.forecasts.len(), 12);
        assert_eq!(report.forecasts[0].customer_id, "c00");
        assert!(report.forecasts.iter().all(|f| f.cltv.is_finite() && f.cltv >= 0.0));
        for segment in Segment::ALL {
            assert!(report.forecasts.iter().any(|f| f.segment == segment));
        }
        assert_eq!(report.summaries.iter().map(|s| s.count).sum::<usize>(), 12);
        assert!(report.correlation.is_some());
        assert!(report.purchase_fit.outcome.converged);
        assert!(report.monetary_fit.outcome.converged);
    }

    #[test]
    // Purpose
    // -------
    // Two runs of the same batch agree exactly.
    //
    // Given
    // -----
    // - The same features and configuration twice.
    //
    // Expect
    // ------
    // - Identical forecasts and fitted parameters.
    fn batch_is_deterministic() {
        // Arrange
        let pipeline = CltvPipeline::new(config());

        // Act
        let first = pipeline.run_features(features()).expect("batch succeeds");
        let second = pipeline.run_features(features()).expect("batch succeeds");

        // Assert
        assert_eq!(first.forecasts, second.forecasts);
        assert_eq!(first.purchase_fit.params, second.purchase_fit.params);
        assert_eq!(first.monetary_fit.params, second.monetary_fit.params);
    }

    #[test]
    // Purpose
    // -------
    // A diagnostic that cannot be computed does not block.
    //
    // Given
    // -----
    // - Constant frequency (zero variance).
    //
    // Expect
    // ------
    // - `None`.
    fn diagnostic_degrades_to_none() {
        // Arrange
        let pipeline = CltvPipeline::new(config());
        let data = MonetaryData::new(
            ndarray::array![2.0, 2.0, 2.0],
            ndarray::array![10.0, 20.0, 30.0],
        )
        .expect("valid data");

        // Act / Assert
        assert!(pipeline.correlation_diagnostic(&data).is_none());
    }

    #[test]
    // Purpose
    // -------
    // An empty table is an input error, not a panic in a worker.
    //
    // Given
    // -----
    // - No features.
    //
    // Expect
    // ------
    // - `EmptyFeatureTable` of kind InvalidInput.
    fn empty_feature_table_is_rejected() {
        // Act
        let err = CltvPipeline::new(config()).run_features(Vec::new()).expect_err("empty");

        // Assert
        assert_eq!(err, CltvError::EmptyFeatureTable);
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
