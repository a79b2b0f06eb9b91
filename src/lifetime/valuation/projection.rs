//! Discounted lifetime-value projection.
//!
//! Purpose
//! -------
//! Combine a customer's purchase forecast with their expected spend into a
//! discounted value over a finite horizon.
//!
//! Key behaviors
//! -------------
//! - The horizon is split into `H` periods of `period_weeks` each, with
//!   cut points `tᵢ = i·period_weeks`.
//! - Period `i` contributes `[E(tᵢ) − E(tᵢ₋₁)] · avg_value / (1 + d)ⁱ`.
//! - Increments are floored at zero, so rounding in the ₂F₁ series can never
//!   turn a period negative.
//!
//! Invariants & assumptions
//! ------------------------
//! - `ProjectionOptions` is validated at construction: `H ≥ 1`, positive
//!   period, `d ≥ 0`. Hence `cltv ≥ 0`, and for positive increments it is
//!   strictly decreasing in `d`.
//! - `E(t₀) = E(0) = 0` exactly.
use crate::lifetime::{
    core::{
        features::CustomerFeatures,
        options::ProjectionOptions,
        params::{MonetaryValueParams, PurchaseTimingParams},
    },
    errors::CltvResult,
};
use serde::Serialize;

/// Projection for one customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifetimeValue {
    pub customer_id: String,
    /// Expected purchases over the full horizon.
    pub expected_purchases: f64,
    pub expected_average_value: f64,
    pub probability_alive: f64,
    pub cltv: f64,
}

/// Project one customer's discounted lifetime value.
///
/// # Errors
/// Propagates the predictors' errors: invalid history, undefined
/// population mean (`q ≤ 1`), or a diverging ₂F₁ series.
pub fn project_customer(
    customer: &CustomerFeatures, timing: &PurchaseTimingParams, spend: &MonetaryValueParams,
    options: &ProjectionOptions,
) -> CltvResult<LifetimeValue> {
    let step = options.period_weeks();
    let avg_value = spend.expected_average_value(customer)?;
    let discount = 1.0 + options.discount_rate();

    let mut previous = 0.0;
    let mut factor = 1.0;
    let mut cltv = 0.0;
    for i in 1..=options.horizon_periods() {
        let cumulative = timing.expected_purchases(customer, i as f64 * step)?;
        factor /= discount;
        cltv += (cumulative - previous).max(0.0) * avg_value * factor;
        previous = cumulative;
    }

    Ok(LifetimeValue {
        customer_id: customer.customer_id.clone(),
        expected_purchases: previous,
        expected_average_value: avg_value,
        probability_alive: timing.probability_alive(customer)?,
        cltv,
    })
}

/// Project every customer, preserving input order.
///
/// Stops at the first failing customer.
pub fn project(
    customers: &[CustomerFeatures], timing: &PurchaseTimingParams, spend: &MonetaryValueParams,
    options: &ProjectionOptions,
) -> CltvResult<Vec<LifetimeValue>> {
    let values = customers
        .iter()
        .map(|c| project_customer(c, timing, spend, options))
        .collect::<CltvResult<Vec<_>>>()?;
    let total: f64 = values.iter().map(|v| v.cltv).sum();
    log::info!(
        "Projected {} customers over {} periods (d = {}): total CLTV {:.2}",
        values.len(),
        options.horizon_periods(),
        options.discount_rate(),
        total
    );
    Ok(values)
}
