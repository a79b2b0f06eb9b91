//! Errors for the lifetime-value engine (input validation, estimation,
//! numerical failures).
//!
//! [`CltvError`] is the public error of every operation under `lifetime`;
//! [`CltvError::kind`] collapses it onto the three caller-facing categories
//! in [`ErrorKind`]. [`ParamError`] covers parameter construction and the
//! θ ↔ parameter mapping, and converts into both [`CltvError`] and the
//! optimizer's `OptError`.
//!
//! ## Conventions
//! - Row indices are 0-based positions in the feature table handed to a
//!   fitter.
//! - Nothing is silently corrected: out-of-domain input is always an error.
//! - A fit that stops on its iteration cap returns
//!   [`CltvError::ConvergenceFailed`] with the best parameters seen, so the
//!   caller can decide to proceed with a flagged fit. A solver that aborts
//!   (line-search breakdown) returns [`CltvError::SolverAborted`] with the
//!   same payload, classified as numerical instability.
use chrono::NaiveDateTime;

use crate::{
    lifetime::core::params::{MonetaryValueParams, PurchaseTimingParams},
    optimization::{errors::OptError, loglik_optimizer::OptimOutcome},
    statistical_tests::errors::CorrError,
};

/// Result alias for lifetime-value operations.
pub type CltvResult<T> = Result<T, CltvError>;

/// Result alias for parameter construction paths.
pub type ParamResult<T> = Result<T, ParamError>;

/// Caller-facing error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or out-of-domain input.
    InvalidInput,
    /// Optimizer exhausted its iteration budget.
    Convergence,
    /// Non-finite likelihood, diverging series, undefined moments, solver
    /// aborts.
    NumericalInstability,
}

/// Last-best parameters attached to a convergence failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BestEstimate {
    PurchaseTiming(PurchaseTimingParams),
    MonetaryValue(MonetaryValueParams),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CltvError {
    // ---- Transactions / aggregation ----
    /// No transaction records were supplied.
    EmptyTransactions,

    /// A record carries an empty customer identifier.
    EmptyCustomerId { transaction_id: String },

    /// A record amount is NaN/±inf.
    NonFiniteAmount { customer_id: String, transaction_id: String, value: f64 },

    /// A record amount is ≤ 0.
    NonPositiveAmount { customer_id: String, transaction_id: String, value: f64 },

    /// The analysis date precedes one of the customer's transactions.
    NegativeAge { customer_id: String, latest_purchase: NaiveDateTime, analysis_date: NaiveDateTime },

    /// A repeat customer's first purchase is at the analysis date (age 0).
    ZeroAge { customer_id: String, analysis_date: NaiveDateTime },

    // ---- Feature table ----
    /// No customer rows reached the fitter.
    EmptyFeatureTable,

    /// recency > age for a row.
    RecencyExceedsAge { row: usize, recency: f64, age: f64 },

    /// A feature value is outside its domain.
    InvalidFeature { row: usize, field: &'static str, value: f64, reason: &'static str },

    // ---- Options ----
    /// Penalizer must be finite and ≥ 0.
    InvalidPenalizer { value: f64 },

    /// Discount rate must be finite and ≥ 0.
    InvalidDiscountRate { value: f64 },

    /// Horizon must contain at least one period.
    InvalidHorizon { periods: usize },

    /// Period length must be strictly positive.
    InvalidPeriodLength { millis: i64 },

    /// Forecast window must be finite and ≥ 0.
    InvalidForecastWindow { t: f64 },

    /// Correlation warning threshold must lie in [0, 1].
    InvalidCorrelationThreshold { value: f64 },

    /// Quantile probabilities must satisfy 0 ≤ lower < upper ≤ 1.
    InvalidQuantileBounds { lower: f64, upper: f64 },

    // ---- Segmentation ----
    /// Too few distinct values to form non-degenerate quartiles.
    InsufficientDistinctValues { distinct: usize, required: usize },

    /// A value to segment or cap is NaN/±inf.
    NonFiniteValue { index: usize, value: f64 },

    // ---- Parameters ----
    InvalidParams(ParamError),

    // ---- Estimation ----
    /// Iteration cap reached before the tolerances were met.
    ConvergenceFailed { best: BestEstimate, log_likelihood: f64, iterations: usize, status: String },

    /// The solver quit before any stopping rule fired, e.g. a line search
    /// that could not find a descent step.
    SolverAborted { best: BestEstimate, log_likelihood: f64, iterations: usize, status: String },

    /// Log-likelihood (or one customer's term) is non-finite.
    NonFiniteLogLikelihood { row: Option<usize>, value: f64 },

    /// The ₂F₁ series did not settle within its term cap.
    HypergeometricDiverged { terms: usize },

    /// Gamma-Gamma population mean needs q > 1.
    UndefinedPopulationMean { q: f64 },

    /// Other optimizer failure (line search, backend, tolerance config).
    Optimization(OptError),

    // ---- Pipeline ----
    /// A fitter thread panicked.
    WorkerPanicked { task: &'static str },

    /// Frequency/monetary diagnostic could not be computed.
    Correlation(CorrError),
}

impl CltvError {
    /// Error for a fit that stopped without converging, carrying `best`.
    ///
    /// An aborted solver is [`CltvError::SolverAborted`]; the iteration cap
    /// and any other stop are [`CltvError::ConvergenceFailed`].
    pub fn not_converged(best: BestEstimate, outcome: OptimOutcome) -> Self {
        let OptimOutcome { value, iterations, status, aborted, .. } = outcome;
        if aborted {
            CltvError::SolverAborted { best, log_likelihood: value, iterations, status }
        } else {
            CltvError::ConvergenceFailed { best, log_likelihood: value, iterations, status }
        }
    }

    /// Collapse onto the caller-facing category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CltvError::ConvergenceFailed { .. } => ErrorKind::Convergence,
            CltvError::SolverAborted { .. }
            | CltvError::NonFiniteLogLikelihood { .. }
            | CltvError::HypergeometricDiverged { .. }
            | CltvError::UndefinedPopulationMean { .. }
            | CltvError::WorkerPanicked { .. } => ErrorKind::NumericalInstability,
            CltvError::Optimization(err) => match err {
                OptError::InvalidTolGrad { .. }
                | OptError::InvalidTolCost { .. }
                | OptError::InvalidMaxIter { .. }
                | OptError::NoTolerancesProvided
                | OptError::InvalidLineSearch { .. }
                | OptError::InvalidLBFGSMem { .. }
                | OptError::ThetaLengthMismatch { .. }
                | OptError::InvalidThetaInput { .. }
                | OptError::InvalidModelParam { .. } => ErrorKind::InvalidInput,
                _ => ErrorKind::NumericalInstability,
            },
            _ => ErrorKind::InvalidInput,
        }
    }
}

impl std::error::Error for CltvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CltvError::InvalidParams(err) => Some(err),
            CltvError::Optimization(err) => Some(err),
            CltvError::Correlation(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for CltvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Transactions / aggregation ----
            CltvError::EmptyTransactions => write!(f, "No transaction records supplied"),
            CltvError::EmptyCustomerId { transaction_id } => {
                write!(f, "Transaction {transaction_id} has an empty customer id")
            }
            CltvError::NonFiniteAmount { customer_id, transaction_id, value } => write!(
                f,
                "Customer {customer_id}, transaction {transaction_id}: amount {value} must be finite"
            ),
            CltvError::NonPositiveAmount { customer_id, transaction_id, value } => write!(
                f,
                "Customer {customer_id}, transaction {transaction_id}: amount {value} must be > 0"
            ),
            CltvError::NegativeAge { customer_id, latest_purchase, analysis_date } => write!(
                f,
                "Customer {customer_id}: analysis date {analysis_date} precedes purchase at {latest_purchase}"
            ),
            CltvError::ZeroAge { customer_id, analysis_date } => write!(
                f,
                "Customer {customer_id}: first purchase is at the analysis date {analysis_date}, age is 0"
            ),

            // ---- Feature table ----
            CltvError::EmptyFeatureTable => write!(f, "Feature table is empty"),
            CltvError::RecencyExceedsAge { row, recency, age } => {
                write!(f, "Row {row}: recency {recency} exceeds age {age}")
            }
            CltvError::InvalidFeature { row, field, value, reason } => {
                write!(f, "Row {row}: invalid {field} = {value}: {reason}")
            }

            // ---- Options ----
            CltvError::InvalidPenalizer { value } => {
                write!(f, "Invalid penalizer {value}, must be finite and >= 0")
            }
            CltvError::InvalidDiscountRate { value } => {
                write!(f, "Invalid discount rate {value}, must be finite and >= 0")
            }
            CltvError::InvalidHorizon { periods } => {
                write!(f, "Invalid horizon of {periods} periods, must be > 0")
            }
            CltvError::InvalidPeriodLength { millis } => {
                write!(f, "Invalid period length of {millis} ms, must be > 0")
            }
            CltvError::InvalidForecastWindow { t } => {
                write!(f, "Invalid forecast window {t}, must be finite and >= 0")
            }
            CltvError::InvalidCorrelationThreshold { value } => {
                write!(f, "Invalid correlation warning threshold {value}, must lie in [0, 1]")
            }
            CltvError::InvalidQuantileBounds { lower, upper } => {
                write!(f, "Invalid quantile bounds ({lower}, {upper}), need 0 <= lower < upper <= 1")
            }

            // ---- Segmentation ----
            CltvError::InsufficientDistinctValues { distinct, required } => write!(
                f,
                "Segmentation needs at least {required} distinct values, found {distinct}"
            ),
            CltvError::NonFiniteValue { index, value } => {
                write!(f, "Value at index {index} is not finite: {value}")
            }

            // ---- Parameters ----
            CltvError::InvalidParams(err) => write!(f, "Invalid parameters: {err}"),

            // ---- Estimation ----
            CltvError::ConvergenceFailed { best, log_likelihood, iterations, status } => write!(
                f,
                "Optimizer did not converge after {iterations} iterations ({status}); \
                 best log-likelihood {log_likelihood} at {best:?}"
            ),
            CltvError::SolverAborted { best, log_likelihood, iterations, status } => write!(
                f,
                "Optimizer aborted after {iterations} iterations ({status}); \
                 best log-likelihood {log_likelihood} at {best:?}"
            ),
            CltvError::NonFiniteLogLikelihood { row: Some(row), value } => {
                write!(f, "Non-finite log-likelihood at row {row}: {value}")
            }
            CltvError::NonFiniteLogLikelihood { row: None, value } => {
                write!(f, "Non-finite log-likelihood: {value}")
            }
            CltvError::HypergeometricDiverged { terms } => {
                write!(f, "Hypergeometric series did not converge within {terms} terms")
            }
            CltvError::UndefinedPopulationMean { q } => {
                write!(f, "Population mean spend undefined for q = {q}, need q > 1")
            }
            CltvError::Optimization(err) => write!(f, "Optimization failed: {err}"),

            // ---- Pipeline ----
            CltvError::WorkerPanicked { task } => write!(f, "Worker thread for {task} panicked"),
            CltvError::Correlation(err) => write!(f, "Correlation diagnostic failed: {err}"),
        }
    }
}

impl From<OptError> for CltvError {
    fn from(err: OptError) -> Self {
        match err {
            OptError::NonFiniteLogLikTerm { row, value } => {
                CltvError::NonFiniteLogLikelihood { row: Some(row), value }
            }
            OptError::NonFiniteCost { value } => {
                CltvError::NonFiniteLogLikelihood { row: None, value }
            }
            other => CltvError::Optimization(other),
        }
    }
}

impl From<CorrError> for CltvError {
    fn from(err: CorrError) -> Self {
        CltvError::Correlation(err)
    }
}

impl From<ParamError> for CltvError {
    fn from(err: ParamError) -> Self {
        CltvError::InvalidParams(err)
    }
}

/// Errors raised while building or mapping model parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    /// θ has the wrong number of entries for the model.
    ThetaLengthMismatch { expected: usize, actual: usize },

    /// θ contains NaN/±inf.
    InvalidThetaInput { index: usize, value: f64 },

    /// A model-space parameter is not finite and > 0.
    NonPositiveParam { name: &'static str, value: f64 },
}

impl std::error::Error for ParamError {}

impl std::fmt::Display for ParamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Theta length mismatch: expected {expected}, actual {actual}")
            }
            ParamError::InvalidThetaInput { index, value } => {
                write!(f, "Invalid theta input at index {index}: {value}, must be finite")
            }
            ParamError::NonPositiveParam { name, value } => {
                write!(f, "Parameter {name} = {value} must be finite and > 0")
            }
        }
    }
}
