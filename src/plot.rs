//! Charting handoff for aggregated tables
//!
//! The library does not render anything. `Plotter` turns a tidy table
//! (`x` period-like, `y` numeric, optional categorical `color`) into a
//! serializable chart description; a front-end renderer owns everything
//! visual beyond the color assignment fixed here.

use crate::{Error, Result};

use arrow_array::{Float64Array, RecordBatch, StringArray};
use serde::Serialize;

/// Fixed palette, applied to series in first-seen order
pub const COLORWAY: [&str; 7] = [
    "#005288", "#DD663C", "#492a42", "#234620", "#F5CC5B", "#30373b", "#E5C0D1",
];

/// Muted grey reserved for control arms in experiment comparisons
pub const CONTROL_COLOR: &str = "#979b9d";

/// One line in a chart
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Series {
    /// Legend label (the category value, or the y column name)
    pub name: String,
    /// Assigned hex color
    pub color: String,
    /// (x, y) points in input row order
    pub points: Vec<(String, f64)>,
}

/// A renderable line chart description
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LineChart {
    /// Series in first-seen order of their category values
    pub series: Vec<Series>,
}

/// Builds chart descriptions from tidy tables
#[derive(Debug, Default)]
pub struct Plotter;

impl Plotter {
    /// Create a plotter
    pub fn new() -> Self {
        Self
    }

    /// Build a line chart from a tidy table.
    ///
    /// Rows are split into one series per distinct `color` value, in
    /// first-seen order. With `experiment_comparison` set, a series whose
    /// label equals `"control"` case-insensitively takes the muted grey
    /// and the remaining series take palette colors in first-seen order;
    /// otherwise every series takes palette colors in first-seen order.
    pub fn line_plot(
        &self,
        table: &RecordBatch,
        x: &str,
        y: &str,
        color: Option<&str>,
        experiment_comparison: bool,
    ) -> Result<LineChart> {
        let xs = string_column(table, x)?;
        let ys = numeric_column(table, y)?;

        let mut series: Vec<Series> = Vec::new();
        match color {
            Some(color) => {
                let labels = string_column(table, color)?;
                for row in 0..table.num_rows() {
                    let label = labels.value(row);
                    let point = (xs.value(row).to_string(), ys.value(row));
                    match series.iter_mut().find(|s| s.name == label) {
                        Some(s) => s.points.push(point),
                        None => series.push(Series {
                            name: label.to_string(),
                            color: String::new(),
                            points: vec![point],
                        }),
                    }
                }
            }
            None => {
                let points = (0..table.num_rows())
                    .map(|row| (xs.value(row).to_string(), ys.value(row)))
                    .collect();
                series.push(Series {
                    name: y.to_string(),
                    color: String::new(),
                    points,
                });
            }
        }

        let mut next_color = 0;
        for s in &mut series {
            s.color = if experiment_comparison && s.name.eq_ignore_ascii_case("control") {
                CONTROL_COLOR.to_string()
            } else {
                let color = COLORWAY[next_color % COLORWAY.len()];
                next_color += 1;
                color.to_string()
            };
        }

        Ok(LineChart { series })
    }
}

fn string_column<'a>(table: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    let column = table
        .column_by_name(name)
        .ok_or_else(|| Error::InvalidSchema(format!("missing column '{}'", name)))?;
    column.as_any().downcast_ref::<StringArray>().ok_or_else(|| {
        Error::InvalidSchema(format!(
            "column '{}' must be Utf8, got {}",
            name,
            column.data_type()
        ))
    })
}

fn numeric_column<'a>(table: &'a RecordBatch, name: &str) -> Result<&'a Float64Array> {
    let column = table
        .column_by_name(name)
        .ok_or_else(|| Error::InvalidSchema(format!("missing column '{}'", name)))?;
    column.as_any().downcast_ref::<Float64Array>().ok_or_else(|| {
        Error::InvalidSchema(format!(
            "column '{}' must be Float64, got {}",
            name,
            column.data_type()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::{Float64Array, StringArray};
    use arrow_schema::{DataType, Field, Schema};
    use std::sync::Arc;

    fn tidy_table(labels: Vec<&str>) -> RecordBatch {
        let n = labels.len();
        let xs: Vec<String> = (0..n).map(|i| format!("2022-{:02}", i % 2 + 1)).collect();
        let ys: Vec<f64> = (0..n).map(|i| (i as f64 + 1.0) * 10.0).collect();

        let schema = Arc::new(Schema::new(vec![
            Field::new("x", DataType::Utf8, false),
            Field::new("y", DataType::Float64, false),
            Field::new("color", DataType::Utf8, false),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(xs)),
                Arc::new(Float64Array::from(ys)),
                Arc::new(StringArray::from(labels)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_series_split_first_seen_order() {
        let table = tidy_table(vec!["A", "A", "B", "B"]);
        let chart = Plotter::new()
            .line_plot(&table, "x", "y", Some("color"), false)
            .unwrap();

        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].name, "A");
        assert_eq!(chart.series[0].color, COLORWAY[0]);
        assert_eq!(chart.series[1].name, "B");
        assert_eq!(chart.series[1].color, COLORWAY[1]);
    }

    #[test]
    fn test_experiment_comparison_mutes_control() {
        let table = tidy_table(vec!["Control", "Control", "Variant", "Variant"]);
        let chart = Plotter::new()
            .line_plot(&table, "x", "y", Some("color"), true)
            .unwrap();

        assert_eq!(chart.series[0].name, "Control");
        assert_eq!(chart.series[0].color, CONTROL_COLOR);
        // The first non-control series still takes the first palette color
        assert_eq!(chart.series[1].name, "Variant");
        assert_eq!(chart.series[1].color, COLORWAY[0]);
    }

    #[test]
    fn test_no_color_column_single_series() {
        let table = tidy_table(vec!["A", "A"]);
        let chart = Plotter::new().line_plot(&table, "x", "y", None, false).unwrap();

        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].name, "y");
        assert_eq!(chart.series[0].points.len(), 2);
    }

    #[test]
    fn test_missing_column_rejected() {
        let table = tidy_table(vec!["A"]);
        let err = Plotter::new()
            .line_plot(&table, "period", "y", None, false)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }
}
