//! Metric definition and grouped time-series views
//!
//! A `Metric` owns one validated long-format dataset and a fixed
//! aggregation function. Its only non-trivial operation is `aggregate`,
//! which collapses per-user observations into a per-period (optionally
//! per-group) time series. The `development*` views are thin call sites
//! of that one routine with different inputs.

mod aggregate;

use crate::groups::{ExperimentGroup, SegmentGroup};
use crate::schema::{validate_dataset, PERIOD_FIELD, USER_ID_FIELD, VALUE_FIELD};
use crate::{Error, Result};

use aggregate::aggregate_batch;
use arrow_array::RecordBatch;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Aggregation functions applicable to the `value` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Arithmetic total
    Sum,
    /// Arithmetic average
    Mean,
    /// Middle value by numeric order; even-sized groups average the two
    /// central values
    Median,
}

impl Aggregation {
    /// Canonical lower-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Mean => "mean",
            Aggregation::Median => "median",
        }
    }

    /// Reduce one group's values to a single number.
    ///
    /// `values` is scratch space owned by the caller; median sorts it in
    /// place. Groups are never empty (they come from partition ranges).
    pub(crate) fn reduce(&self, values: &mut [f64]) -> f64 {
        match self {
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Aggregation::Median => {
                values.sort_unstable_by(f64::total_cmp);
                let mid = values.len() / 2;
                if values.len() % 2 == 0 {
                    (values[mid - 1] + values[mid]) / 2.0
                } else {
                    values[mid]
                }
            }
        }
    }
}

impl FromStr for Aggregation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sum" => Ok(Aggregation::Sum),
            "mean" => Ok(Aggregation::Mean),
            "median" => Ok(Aggregation::Median),
            other => Err(Error::InvalidAggregation(other.to_string())),
        }
    }
}

/// A named quantity tracked per user per period
#[derive(Debug, Clone)]
pub struct Metric {
    name: String,
    data: RecordBatch,
    agg_func: Aggregation,
    experiment_groups: HashMap<String, ExperimentGroup>,
    segment_groups: HashMap<String, SegmentGroup>,
}

impl Metric {
    /// Create a metric from a long-format dataset.
    ///
    /// Validation runs here and nowhere else: a non-empty name, exactly the
    /// `{user_id, period, value}` column set, and a known aggregation
    /// function name. The dataset is held as-is; aggregation never mutates
    /// it.
    pub fn new(name: impl Into<String>, data: RecordBatch, agg_func: &str) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidName);
        }
        validate_dataset(&data)?;
        let agg_func = agg_func.parse()?;

        Ok(Self {
            name,
            data,
            agg_func,
            experiment_groups: HashMap::new(),
            segment_groups: HashMap::new(),
        })
    }

    /// Metric name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The validated dataset
    pub fn data(&self) -> &RecordBatch {
        &self.data
    }

    /// The aggregation function fixed at construction
    pub fn agg_func(&self) -> Aggregation {
        self.agg_func
    }

    /// Aggregate a long-format table into one row per (period, extras) tuple.
    ///
    /// `table` must carry `period`, `value`, and every column named in
    /// `extra_groups`; `user_id` may be present and is dropped before
    /// grouping. Any other column is rejected, keeping the grouping
    /// contract explicit rather than inferred from whatever the table
    /// happens to contain.
    pub fn aggregate(&self, table: &RecordBatch, extra_groups: &[&str]) -> Result<RecordBatch> {
        for field in table.schema().fields() {
            let name = field.name().as_str();
            let reserved = name == USER_ID_FIELD || name == PERIOD_FIELD || name == VALUE_FIELD;
            if !reserved && !extra_groups.contains(&name) {
                return Err(Error::InvalidSchema(format!(
                    "unexpected column '{}': expected {:?} plus grouping columns {:?}",
                    name,
                    [USER_ID_FIELD, PERIOD_FIELD, VALUE_FIELD],
                    extra_groups
                )));
            }
        }

        let mut key_names = Vec::with_capacity(1 + extra_groups.len());
        key_names.push(PERIOD_FIELD);
        key_names.extend_from_slice(extra_groups);

        aggregate_batch(table, &key_names, self.agg_func)
    }

    /// The metric's own development over time, one row per period
    pub fn development(&self) -> Result<RecordBatch> {
        self.aggregate(&self.data, &[])
    }

    /// Development split by experiment arm.
    ///
    /// `table` is the dataset with an arm column appended, typically via
    /// [`ExperimentGroup::label`].
    pub fn development_by_experiment(
        &self,
        table: &RecordBatch,
        experiment_col: &str,
    ) -> Result<RecordBatch> {
        self.aggregate(table, &[experiment_col])
    }

    /// Development split by segment membership.
    pub fn development_by_segment(
        &self,
        table: &RecordBatch,
        segment_col: &str,
    ) -> Result<RecordBatch> {
        self.aggregate(table, &[segment_col])
    }

    /// Attach an experiment group definition for presentation use.
    /// Re-adding a name overrides the previous definition.
    pub fn add_experiment_group(&mut self, group: ExperimentGroup) {
        self.experiment_groups.insert(group.name.clone(), group);
    }

    /// Attach a segment group definition for presentation use.
    pub fn add_segment_group(&mut self, group: SegmentGroup) {
        self.segment_groups.insert(group.name.clone(), group);
    }

    /// Look up an attached experiment group by name
    pub fn experiment_group(&self, name: &str) -> Option<&ExperimentGroup> {
        self.experiment_groups.get(name)
    }

    /// Look up an attached segment group by name
    pub fn segment_group(&self, name: &str) -> Option<&SegmentGroup> {
        self.segment_groups.get(name)
    }
}
