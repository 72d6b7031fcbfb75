//! Experiment and segment group containers
//!
//! Groups map user ids to categorical labels. Labeling a dataset appends
//! the label as a string column, producing exactly the table shape the
//! grouped `development_by_*` views consume. Definitions are serde-friendly
//! so analyst-supplied JSON lookups (`{"control": [1, 2], "variant": [3]}`)
//! deserialize directly.

use crate::schema::{PERIOD_FIELD, USER_ID_FIELD, VALUE_FIELD};
use crate::{Error, Result};

use arrow::compute::filter_record_batch;
use arrow_array::{Array, ArrayRef, BooleanArray, Int64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// An experiment with one arm label per enrolled user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentGroup {
    /// Experiment name
    pub name: String,
    /// Arm label to enrolled user ids
    pub arms: BTreeMap<String, Vec<i64>>,
}

impl ExperimentGroup {
    /// Create an experiment group with no arms
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arms: BTreeMap::new(),
        }
    }

    /// Add an arm with its enrolled users
    pub fn with_arm(mut self, label: impl Into<String>, users: Vec<i64>) -> Self {
        self.arms.insert(label.into(), users);
        self
    }

    /// Arm label for a user, if enrolled
    pub fn arm_of(&self, user_id: i64) -> Option<&str> {
        self.arms
            .iter()
            .find(|(_, users)| users.contains(&user_id))
            .map(|(label, _)| label.as_str())
    }

    /// Append an arm column to a long-format batch.
    ///
    /// Rows for users not enrolled in any arm are dropped; experiment
    /// views only cover enrolled users.
    pub fn label(&self, batch: &RecordBatch, column: &str) -> Result<RecordBatch> {
        let arms = user_ids_of(batch)?
            .iter()
            .map(|user| user.and_then(|u| self.arm_of(u)))
            .collect::<Vec<Option<&str>>>();
        let labeled = append_label_column(batch, column, &arms)?;

        debug!(
            experiment = %self.name,
            rows_in = batch.num_rows(),
            rows_labeled = labeled.num_rows(),
            "labeled dataset with experiment arms"
        );
        Ok(labeled)
    }
}

/// A named subset of users, independent of experiment assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentGroup {
    /// Segment name, also used as the label value
    pub name: String,
    /// Member user ids
    pub users: Vec<i64>,
}

impl SegmentGroup {
    /// Create a segment from its member list
    pub fn new(name: impl Into<String>, users: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            users,
        }
    }

    /// Whether a user belongs to the segment
    pub fn contains(&self, user_id: i64) -> bool {
        self.users.contains(&user_id)
    }

    /// Append a segment column to a long-format batch, keeping member rows
    /// only. The label value is the segment name.
    pub fn label(&self, batch: &RecordBatch, column: &str) -> Result<RecordBatch> {
        let labels = user_ids_of(batch)?
            .iter()
            .map(|user| match user {
                Some(u) if self.contains(u) => Some(self.name.as_str()),
                _ => None,
            })
            .collect::<Vec<Option<&str>>>();
        let labeled = append_label_column(batch, column, &labels)?;

        debug!(
            segment = %self.name,
            rows_in = batch.num_rows(),
            rows_labeled = labeled.num_rows(),
            "labeled dataset with segment membership"
        );
        Ok(labeled)
    }
}

fn user_ids_of(batch: &RecordBatch) -> Result<&Int64Array> {
    let column = batch
        .column_by_name(USER_ID_FIELD)
        .ok_or_else(|| Error::InvalidSchema(format!("missing column '{}'", USER_ID_FIELD)))?;
    column.as_any().downcast_ref::<Int64Array>().ok_or_else(|| {
        Error::InvalidSchema(format!(
            "column '{}' must be Int64, got {}",
            USER_ID_FIELD,
            column.data_type()
        ))
    })
}

/// Keep rows with a label and append the label values as a new string column
fn append_label_column(
    batch: &RecordBatch,
    column: &str,
    labels: &[Option<&str>],
) -> Result<RecordBatch> {
    if [USER_ID_FIELD, PERIOD_FIELD, VALUE_FIELD].contains(&column) {
        return Err(Error::InvalidSchema(format!(
            "grouping column '{}' collides with a reserved column name",
            column
        )));
    }
    if batch.schema().field_with_name(column).is_ok() {
        return Err(Error::InvalidSchema(format!(
            "column '{}' already exists on the table",
            column
        )));
    }

    let mask = BooleanArray::from(labels.iter().map(|l| l.is_some()).collect::<Vec<bool>>());
    let kept = filter_record_batch(batch, &mask)?;
    let kept_labels: Vec<&str> = labels.iter().flatten().copied().collect();

    let mut fields: Vec<Field> = kept
        .schema()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    fields.push(Field::new(column, DataType::Utf8, false));

    let mut columns: Vec<ArrayRef> = kept.columns().to_vec();
    columns.push(Arc::new(StringArray::from(kept_labels)));

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
