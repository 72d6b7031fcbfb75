//! Grouped aggregation over long-format batches
//!
//! The engine reduces a batch to one row per distinct group-key tuple:
//! key columns are lexicographically sorted, partitioned into key-equal
//! ranges, and each range's `value` slice is reduced with the metric's
//! aggregation function. Sorting makes the output order deterministic
//! regardless of input row order.

use crate::metric::Aggregation;
use crate::schema::VALUE_FIELD;
use crate::{Error, Result};

use arrow::compute::{lexsort_to_indices, partition, take, SortColumn};
use arrow_array::{new_empty_array, Array, ArrayRef, Float64Array, RecordBatch, UInt32Array};
use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;
use tracing::debug;

/// Aggregate `batch` grouped by `key_names`, reducing the `value` column.
///
/// Callers are responsible for validating the batch's column set; this
/// routine only requires that every key column and `value` exist.
pub(crate) fn aggregate_batch(
    batch: &RecordBatch,
    key_names: &[&str],
    agg: Aggregation,
) -> Result<RecordBatch> {
    let schema = batch.schema();

    let mut key_columns: Vec<ArrayRef> = Vec::with_capacity(key_names.len());
    let mut out_fields: Vec<Field> = Vec::with_capacity(key_names.len() + 1);
    for name in key_names {
        let column = batch.column_by_name(name).ok_or_else(|| {
            Error::InvalidSchema(format!("grouping column '{}' not found", name))
        })?;
        key_columns.push(column.clone());
        out_fields.push(schema.field_with_name(name)?.clone());
    }
    out_fields.push(Field::new(VALUE_FIELD, DataType::Float64, false));
    let out_schema = Arc::new(Schema::new(out_fields));

    let value_column = batch
        .column_by_name(VALUE_FIELD)
        .ok_or_else(|| Error::InvalidSchema(format!("missing column '{}'", VALUE_FIELD)))?;
    let values = value_column
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| {
            Error::InvalidSchema(format!(
                "column '{}' must be Float64, got {}",
                VALUE_FIELD,
                value_column.data_type()
            ))
        })?;
    if values.null_count() > 0 {
        return Err(Error::InvalidSchema(format!(
            "column '{}' must not contain nulls",
            VALUE_FIELD
        )));
    }

    // Zero rows aggregate to zero rows, not an error
    if batch.num_rows() == 0 {
        let empty: Vec<ArrayRef> = out_schema
            .fields()
            .iter()
            .map(|f| new_empty_array(f.data_type()))
            .collect();
        return Ok(RecordBatch::try_new(out_schema, empty)?);
    }

    // Sort by the full key tuple, then split into key-equal ranges
    let sort_columns: Vec<SortColumn> = key_columns
        .iter()
        .map(|c| SortColumn {
            values: c.clone(),
            options: None,
        })
        .collect();
    let indices = lexsort_to_indices(&sort_columns, None)?;

    let sorted_keys: Vec<ArrayRef> = key_columns
        .iter()
        .map(|c| take(c.as_ref(), &indices, None))
        .collect::<std::result::Result<_, _>>()?;
    let sorted_values = take(value_column.as_ref(), &indices, None)?;
    let sorted_values = sorted_values
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| Error::InvalidSchema("value column lost its type during sort".into()))?;

    let ranges = partition(&sorted_keys)?.ranges();

    let mut group_starts: Vec<u32> = Vec::with_capacity(ranges.len());
    let mut reduced: Vec<f64> = Vec::with_capacity(ranges.len());
    let mut scratch: Vec<f64> = Vec::new();
    for range in &ranges {
        group_starts.push(range.start as u32);
        scratch.clear();
        scratch.extend((range.start..range.end).map(|i| sorted_values.value(i)));
        reduced.push(agg.reduce(&mut scratch));
    }

    debug!(
        rows_in = batch.num_rows(),
        groups = ranges.len(),
        agg = agg.as_str(),
        "aggregated metric table"
    );

    // One representative row per range carries the group-key values
    let group_starts = UInt32Array::from(group_starts);
    let mut out_columns: Vec<ArrayRef> = sorted_keys
        .iter()
        .map(|c| take(c.as_ref(), &group_starts, None))
        .collect::<std::result::Result<_, _>>()?;
    out_columns.push(Arc::new(Float64Array::from(reduced)));

    Ok(RecordBatch::try_new(out_schema, out_columns)?)
}
