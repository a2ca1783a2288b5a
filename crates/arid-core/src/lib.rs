//! arid-core: exploratory analysis and paired regression fitting
//!
//! This crate validates a polars [`DataFrame`] against a requested
//! response and feature set, then either explores it (summary statistics
//! plus Vega-Lite charts) or fits linear, logistic or Poisson regressions
//! with anofox-regression. Every fit returns a predictive and an inference
//! estimator side by side.

pub mod data;
pub mod diagnostics;
pub mod eda;
pub mod errors;
pub mod features;
pub mod formula;
pub mod models;
pub mod types;
pub mod validate;

pub use data::{ColumnType, DataFrame};
pub use eda::{explore, Chart, ChartKind, SummaryTable};
pub use errors::{StatsError, StatsResult};
pub use models::{fit_count, fit_linear, fit_logistic, ModelPair};
pub use types::*;
