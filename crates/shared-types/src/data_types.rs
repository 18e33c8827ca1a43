//! Common data types used across the system

use serde::{Deserialize, Serialize};

/// One row of a query result: column name to dynamically-typed scalar
pub type Record = serde_json::Map<String, serde_json::Value>;

/// X coordinate of a chart value after column-type coercion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum XValue {
    /// Milliseconds since the Unix epoch, NaN when the source was not a date
    Timestamp(f64),
    Number(f64),
    Text(String),
}

impl XValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            XValue::Timestamp(v) | XValue::Number(v) => Some(*v),
            XValue::Text(_) => None,
        }
    }
}

/// Chart-ready data point
///
/// Serializes as `[x, y]` or `[x, y, value]`, which is the shape the
/// external engine accepts for line/bar and heatmap series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartValue {
    Point(XValue, f64),
    Cell(XValue, f64, f64),
}

impl ChartValue {
    pub fn x(&self) -> &XValue {
        match self {
            ChartValue::Point(x, _) | ChartValue::Cell(x, _, _) => x,
        }
    }

    pub fn y(&self) -> f64 {
        match self {
            ChartValue::Point(_, y) | ChartValue::Cell(_, y, _) => *y,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            ChartValue::Point(..) => None,
            ChartValue::Cell(_, _, value) => Some(*value),
        }
    }
}

/// Named point for categorical (pie-style) data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChartValue {
    pub name: String,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// One named sequence of chart values, rendered as one trace
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SeriesDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub values: Vec<ChartValue>,
}
