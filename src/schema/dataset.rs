//! Long-format dataset schema and validation
//!
//! A metric dataset has exactly three columns: `user_id`, `period`, `value`.
//! Validation is a pure function over a `RecordBatch`; nothing here mutates
//! the caller's table.

use crate::{Error, Result};

use arrow_array::{Float64Array, Int64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use std::sync::Arc;

/// Standard field names
pub const USER_ID_FIELD: &str = "user_id";
pub const PERIOD_FIELD: &str = "period";
pub const VALUE_FIELD: &str = "value";

const REQUIRED_FIELDS: [&str; 3] = [USER_ID_FIELD, PERIOD_FIELD, VALUE_FIELD];

/// The canonical Arrow schema for a long-format metric dataset
pub fn dataset_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(USER_ID_FIELD, DataType::Int64, false),
        Field::new(PERIOD_FIELD, DataType::Utf8, false),
        Field::new(VALUE_FIELD, DataType::Float64, false),
    ]))
}

/// Validate that a batch carries exactly the three reserved columns.
///
/// Extra and missing columns are diagnosed independently so that a table
/// with the right column count but a wrong name is still caught. Row count
/// is not constrained; an empty table is a valid dataset.
pub fn validate_dataset(batch: &RecordBatch) -> Result<()> {
    let schema = batch.schema();

    for field in schema.fields() {
        if !REQUIRED_FIELDS.contains(&field.name().as_str()) {
            return Err(Error::InvalidSchema(format!(
                "unexpected column '{}': dataset columns must be exactly {:?}",
                field.name(),
                REQUIRED_FIELDS
            )));
        }
    }

    for required in REQUIRED_FIELDS {
        if schema.field_with_name(required).is_err() {
            return Err(Error::InvalidSchema(format!(
                "missing column '{}': dataset columns must be exactly {:?}",
                required, REQUIRED_FIELDS
            )));
        }
    }

    let value_field = schema.field_with_name(VALUE_FIELD)?;
    if value_field.data_type() != &DataType::Float64 {
        return Err(Error::InvalidSchema(format!(
            "column '{}' must be Float64, got {}",
            VALUE_FIELD,
            value_field.data_type()
        )));
    }

    Ok(())
}

/// Builder assembling a long-format dataset row by row
///
/// Mainly a convenience for callers holding observations as plain values
/// rather than pre-built Arrow arrays.
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    user_ids: Vec<i64>,
    periods: Vec<String>,
    values: Vec<f64>,
}

impl DatasetBuilder {
    /// Create a new empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one (user, period, value) observation
    pub fn row(mut self, user_id: i64, period: impl Into<String>, value: f64) -> Self {
        self.user_ids.push(user_id);
        self.periods.push(period.into());
        self.values.push(value);
        self
    }

    /// Number of rows added so far
    pub fn len(&self) -> usize {
        self.user_ids.len()
    }

    /// Whether the builder holds no rows
    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty()
    }

    /// Build the dataset batch
    pub fn build(self) -> Result<RecordBatch> {
        let batch = RecordBatch::try_new(
            dataset_schema(),
            vec![
                Arc::new(Int64Array::from(self.user_ids)),
                Arc::new(StringArray::from(self.periods)),
                Arc::new(Float64Array::from(self.values)),
            ],
        )?;
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_produces_valid_dataset() {
        let batch = DatasetBuilder::new()
            .row(1, "2022-01", 100.0)
            .row(2, "2022-01", 200.0)
            .build()
            .unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert!(validate_dataset(&batch).is_ok());
    }

    #[test]
    fn test_empty_dataset_is_valid() {
        let batch = DatasetBuilder::new().build().unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert!(validate_dataset(&batch).is_ok());
    }

    #[test]
    fn test_unexpected_column_rejected() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(USER_ID_FIELD, DataType::Int64, false),
            Field::new(PERIOD_FIELD, DataType::Utf8, false),
            Field::new(VALUE_FIELD, DataType::Float64, false),
            Field::new("extra_column", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![1])),
                Arc::new(StringArray::from(vec!["2022-01"])),
                Arc::new(Float64Array::from(vec![1.0])),
                Arc::new(Int64Array::from(vec![9])),
            ],
        )
        .unwrap();

        let err = validate_dataset(&batch).unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
        assert!(err.to_string().contains("extra_column"));
    }

    #[test]
    fn test_missing_column_rejected() {
        // Right column count, wrong name
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new(PERIOD_FIELD, DataType::Utf8, false),
            Field::new(VALUE_FIELD, DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![1])),
                Arc::new(StringArray::from(vec!["2022-01"])),
                Arc::new(Float64Array::from(vec![1.0])),
            ],
        )
        .unwrap();

        let err = validate_dataset(&batch).unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }

    #[test]
    fn test_wrong_value_type_rejected() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(USER_ID_FIELD, DataType::Int64, false),
            Field::new(PERIOD_FIELD, DataType::Utf8, false),
            Field::new(VALUE_FIELD, DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![1])),
                Arc::new(StringArray::from(vec!["2022-01"])),
                Arc::new(Int64Array::from(vec![100])),
            ],
        )
        .unwrap();

        let err = validate_dataset(&batch).unwrap_err();
        assert!(err.to_string().contains("Float64"));
    }
}
