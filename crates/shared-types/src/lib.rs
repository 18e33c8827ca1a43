//! Shared types for Viz House
//!
//! This crate contains the types exchanged between the data-manager,
//! config-system, chart-options and system-integration crates: flat query
//! records, chart-ready values and series, the declarative series
//! configuration, and the common error type.

pub mod chart_config;
pub mod data_types;
pub mod errors;
pub mod timestamps;

pub use chart_config::{ChartConfig, ColumnType, SeriesConfig, XAxisColumn, YAxisColumn};
pub use data_types::{ChartValue, PieChartValue, Record, SeriesDescriptor, XValue};
pub use errors::{ChartsError, ChartsResult, ColumnRole};
pub use timestamps::parse_timestamp_millis;
