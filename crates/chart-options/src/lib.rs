//! Chart options builders for Viz House
//!
//! Translates a small, stable chart description into the declarative
//! options object consumed by the external charting engine. Every builder
//! is a pure function returning a [`serde_json::Value`]; caller-supplied
//! raw overrides are merged over the generated options.

pub mod common;
pub mod heatmap;
pub mod pie;
pub mod time_series;
pub mod xy;

pub use common::{
    merge_json, tooltip_date_format, Annotation, FillColor, LegendHorizontalPosition,
    LegendVerticalPosition, TimePeriod, TooltipFlags,
};
pub use heatmap::{
    heatmap_chart_options, HeatmapChartProps, HeatmapPoint, HeatmapSeriesDescriptor, HeatmapY,
    HeatmapYAxisProps,
};
pub use pie::{donut_chart_options, pie_chart_options, PieChartProps, PieSeriesDescriptor};
pub use time_series::{time_series_chart_options, TimeSeriesChartProps};
pub use xy::{
    xy_chart_options, XAxisProps, XYChartProps, XYPoint, XYSeriesDescriptor, XYSeriesType,
    YAxisProps,
};
