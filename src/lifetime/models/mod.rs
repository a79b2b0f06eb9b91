//! models — the two probabilistic submodels of the lifetime-value stack.
//!
//! Purpose
//! -------
//! Fit and evaluate the purchase-timing (BG/NBD) and monetary-value
//! (Gamma-Gamma) models. Both implement the optimizer's
//! [`LogLikelihood`](crate::optimization::loglik_optimizer::LogLikelihood)
//! trait with analytic gradients and return immutable fit snapshots.
//!
//! Key behaviors
//! -------------
//! - [`PurchaseTimingModel::fit`] → [`PurchaseTimingFit`]; forecasts via
//!   `PurchaseTimingParams::{expected_purchases, probability_alive}`.
//! - [`MonetaryValueModel::fit`] → [`MonetaryValueFit`]; forecasts via
//!   `MonetaryValueParams::expected_average_value`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The two models share no state and can be fitted concurrently.
//! - A fit that hits the iteration cap is an error carrying the best
//!   parameters seen; it is never returned as a success.

pub mod monetary_value;
pub mod purchase_timing;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::monetary_value::{MonetaryValueFit, MonetaryValueModel};
pub use self::purchase_timing::{PurchaseTimingFit, PurchaseTimingModel};

pub mod prelude {
    pub use super::monetary_value::{MonetaryValueFit, MonetaryValueModel};
    pub use super::purchase_timing::{PurchaseTimingFit, PurchaseTimingModel};
}
