//! Schema definitions for metric datasets
//!
//! This module defines the Arrow schema for long-format metric data: one row
//! per (user, period) observation, with the observed quantity in a single
//! `value` column. Grouping dimensions such as experiment arms or segments
//! are additional string columns appended by the `groups` module.

mod dataset;

pub use dataset::{
    dataset_schema,
    validate_dataset,
    DatasetBuilder,
    PERIOD_FIELD,
    USER_ID_FIELD,
    VALUE_FIELD,
};
