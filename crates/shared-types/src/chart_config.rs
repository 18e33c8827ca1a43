//! Declarative series configuration consumed by the query-result transformer

use serde::{Deserialize, Serialize};

/// How raw x-axis values are coerced
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Date,
    Number,
    #[default]
    String,
}

/// X-axis column with its declared coercion type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct XAxisColumn {
    pub column: String,
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct YAxisColumn {
    pub column: String,
}

/// Describes which query columns feed one chart series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(alias = "x_axis")]
    pub x_axis: XAxisColumn,
    #[serde(alias = "y_axis")]
    pub y_axis: YAxisColumn,
    /// Third dimension, only used by heatmap-style series
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl SeriesConfig {
    pub fn new(x_column: &str, x_type: ColumnType, y_column: &str) -> Self {
        Self {
            name: None,
            x_axis: XAxisColumn {
                column: x_column.to_string(),
                column_type: x_type,
            },
            y_axis: YAxisColumn {
                column: y_column.to_string(),
            },
            value: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_value(mut self, column: &str) -> Self {
        self.value = Some(column.to_string());
        self
    }

    /// Human-readable label used in error messages
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) => format!("series '{name}'"),
            None => format!("series #{index}"),
        }
    }
}

/// Chart configuration: the list of series to derive from query results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ChartConfig {
    pub series: Vec<SeriesConfig>,
}
