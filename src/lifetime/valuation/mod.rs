//! valuation — from fitted models to segmented lifetime values.
//!
//! Key behaviors
//! -------------
//! - [`projection`]: discounted CLTV over a finite horizon per customer.
//! - [`segmentation`]: quartile labels `D < C < B < A` and per-segment
//!   summaries.
//! - [`pipeline`]: the end-to-end batch, fitting both submodels as a
//!   fork-join.

pub mod pipeline;
pub mod projection;
pub mod segmentation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::pipeline::{CltvPipeline, CltvReport, CustomerForecast};
pub use self::projection::{LifetimeValue, project, project_customer};
pub use self::segmentation::{QuartileEdges, Segment, SegmentSummary, assign, summarize};
