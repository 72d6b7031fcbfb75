//! # MetricTree
//!
//! An in-memory library for hierarchical business metrics: named quantities
//! tracked per user per period, with experiment-arm and segment breakdowns
//! and a tidy-table handoff to a charting front-end.
//!
//! ## Key Features
//!
//! - **Columnar Datasets**: Metric observations live in Arrow record
//!   batches with a fixed long-format schema (`user_id`, `period`, `value`)
//! - **Grouped Aggregation**: One engine collapses per-user observations
//!   into per-period time series, with optional categorical group columns
//!   layered in as extra group-by keys
//! - **Validated Construction**: Bad column sets, empty names, and unknown
//!   aggregation functions are rejected before a metric exists
//!
//! ## Architecture
//!
//! - **Metric**: Owns one validated dataset and a fixed aggregation
//!   function; all time-series views are call sites of its single
//!   aggregation routine
//! - **Groups**: Experiment and segment definitions that label datasets
//!   with categorical columns by user lookup
//! - **Plotter**: Builds renderable chart descriptions from aggregated
//!   tables; rendering itself happens outside this crate

pub mod groups;
pub mod metric;
pub mod plot;
pub mod schema;

mod error;

pub use error::{Error, Result};
pub use groups::{ExperimentGroup, SegmentGroup};
pub use metric::{Aggregation, Metric};
pub use plot::{LineChart, Plotter, Series};
pub use schema::{DatasetBuilder, PERIOD_FIELD, USER_ID_FIELD, VALUE_FIELD};
