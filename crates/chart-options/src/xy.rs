//! Line, bar, column, area, scatter and bell-curve charts

use crate::common::{
    default_legend, default_tooltip, default_x_axis, default_y_axis, merge_json, set_opt, title,
    Annotation, FillColor, LegendVerticalPosition, TooltipFlags,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use viz_house_shared::{ChartValue, SeriesDescriptor, XValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XYSeriesType {
    Area,
    Bar,
    Bellcurve,
    Column,
    Line,
    Scatter,
}

/// One data point of an XY series
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum XYPoint {
    /// Bare y value, x is implied by position
    Y(f64),
    Point {
        x: XValue,
        y: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl XYPoint {
    pub fn new(x: XValue, y: f64) -> Self {
        XYPoint::Point {
            x,
            y: y.is_finite().then_some(y),
            name: None,
        }
    }

    pub fn y(&self) -> Option<f64> {
        match self {
            XYPoint::Y(y) => Some(*y),
            XYPoint::Point { y, .. } => *y,
        }
    }

    fn to_data(&self) -> Value {
        match self {
            XYPoint::Y(y) => json!(y),
            XYPoint::Point { name: Some(_), .. } => json!(self),
            XYPoint::Point { x, y, name: None } => json!([x, y]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct XYSeriesDescriptor {
    pub name: Option<String>,
    pub series_type: Option<XYSeriesType>,
    pub values: Vec<XYPoint>,
    pub color: Option<String>,
    pub fill_color: Option<FillColor>,
}

impl XYSeriesDescriptor {
    pub fn with_type(mut self, series_type: XYSeriesType) -> Self {
        self.series_type = Some(series_type);
        self
    }
}

impl From<&SeriesDescriptor> for XYSeriesDescriptor {
    fn from(series: &SeriesDescriptor) -> Self {
        Self {
            name: series.name.clone(),
            values: series
                .values
                .iter()
                .map(|value: &ChartValue| XYPoint::new(value.x().clone(), value.y()))
                .collect(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct XAxisProps {
    pub title: Option<String>,
    /// Category labels, in display order
    pub domain: Option<Vec<Value>>,
    #[serde(rename = "type")]
    pub axis_type: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub vertical_labels: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct YAxisProps {
    pub title: Option<String>,
    pub ticks: Option<Vec<f64>>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub vertical_labels: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct XYChartProps {
    pub series: Vec<XYSeriesDescriptor>,
    pub title: Option<String>,
    pub has_data_labels: Option<bool>,
    pub legend_position: Option<LegendVerticalPosition>,
    /// Stack series; only honoured when every series is a bar or every series a column
    pub stacked: bool,
    pub tooltip: Option<TooltipFlags>,
    pub vertical_grid_lines: bool,
    pub x_axis: Option<XAxisProps>,
    /// One entry per y axis; empty means a single default axis
    pub y_axis: Vec<YAxisProps>,
    pub horizontal_annotations: Vec<Annotation>,
    pub vertical_annotations: Vec<Annotation>,
    /// Raw engine options deep-merged over the generated ones
    pub overrides: Option<Value>,
}

impl XYChartProps {
    pub fn new(series: Vec<XYSeriesDescriptor>) -> Self {
        Self {
            series,
            ..Default::default()
        }
    }

    fn all_of_type(&self, series_type: XYSeriesType) -> bool {
        self.series
            .iter()
            .all(|s| s.series_type == Some(series_type))
    }

    pub fn is_bar_chart(&self) -> bool {
        self.all_of_type(XYSeriesType::Bar)
    }

    pub fn is_column_chart(&self) -> bool {
        self.all_of_type(XYSeriesType::Column)
    }
}

/// Complete engine options for an XY chart
pub fn xy_chart_options(props: &XYChartProps) -> Value {
    let mut options = json!({
        "title": title(props.title.as_deref()),
        "chart": { "zooming": { "type": "x" } },
        "legend": legend_options(props),
        "plotOptions": plot_options(props),
        "series": series_options(props),
        "tooltip": default_tooltip(props.tooltip.as_ref()),
        "xAxis": x_axis_options(props),
        "yAxis": y_axis_options(props),
    });

    if let Some(overrides) = &props.overrides {
        merge_json(&mut options, overrides.clone());
    }

    options
}

fn x_axis_options(props: &XYChartProps) -> Value {
    let mut axis = default_x_axis();
    let x_axis = props.x_axis.clone().unwrap_or_default();

    if x_axis.vertical_labels == Some(true) {
        axis["labels"]["rotation"] = json!(-45);
    }
    // a non-zero auto rotation lets the engine skip labels that do not fit
    axis["labels"]["autoRotation"] = json!([-9]);

    if let Some(text) = &x_axis.title {
        axis["title"] = json!({ "text": text });
    }
    if let Some(domain) = &x_axis.domain {
        let categories: Vec<String> = domain.iter().map(category_label).collect();
        axis["categories"] = json!(categories);
    }
    if let Some(axis_type) = &x_axis.axis_type {
        axis["type"] = json!(axis_type);
    }
    set_opt(&mut axis, "min", x_axis.min);
    set_opt(&mut axis, "max", x_axis.max);

    if props.vertical_grid_lines {
        axis["gridLineWidth"] = json!(1);
    }
    if !props.vertical_annotations.is_empty() {
        axis["plotLines"] = props
            .vertical_annotations
            .iter()
            .map(Annotation::to_plot_line)
            .collect();
    }

    axis
}

/// Single object for one axis, an array when there are several
pub fn y_axis_options(props: &XYChartProps) -> Value {
    if props.y_axis.len() > 1 && props.y_axis.len() != props.series.len() {
        log::warn!(
            "{} y axes configured for {} series; extra series use the first axis",
            props.y_axis.len(),
            props.series.len()
        );
    }

    let defaults = [YAxisProps::default()];
    let axes_props: &[YAxisProps] = if props.y_axis.is_empty() {
        &defaults
    } else {
        &props.y_axis
    };

    let mut axes: Vec<Value> = axes_props
        .iter()
        .enumerate()
        .map(|(index, y_axis)| {
            let mut axis = default_y_axis();

            if let Some(text) = &y_axis.title {
                axis["title"] = json!({ "text": text });
            }
            let rotation = if y_axis.vertical_labels == Some(true) { -45 } else { 0 };
            axis["labels"] = json!({ "rotation": rotation });
            set_opt(&mut axis, "tickPositions", y_axis.ticks.as_ref());
            set_opt(&mut axis, "min", y_axis.min);
            set_opt(&mut axis, "max", y_axis.max);

            if index % 2 == 1 {
                axis["opposite"] = json!(true);
            }
            if !props.horizontal_annotations.is_empty() {
                axis["plotLines"] = props
                    .horizontal_annotations
                    .iter()
                    .map(Annotation::to_plot_line)
                    .collect();
            }
            axis
        })
        .collect();

    if axes.len() == 1 {
        axes.remove(0)
    } else {
        Value::Array(axes)
    }
}

fn legend_options(props: &XYChartProps) -> Value {
    let mut legend = default_legend();

    if props.is_bar_chart() {
        legend["reversed"] = json!(true);
    }

    match props.legend_position {
        Some(LegendVerticalPosition::Top) => {
            legend["enabled"] = json!(true);
            legend["verticalAlign"] = json!("top");
        }
        Some(LegendVerticalPosition::Bottom) => {
            legend["enabled"] = json!(true);
            legend["verticalAlign"] = json!("bottom");
        }
        Some(LegendVerticalPosition::Hidden) | None => {
            legend["enabled"] = json!(false);
        }
    }

    legend
}

/// Stacking, data labels and bell-curve spacing
pub fn plot_options(props: &XYChartProps) -> Value {
    let mut plot = json!({
        "series": {},
        "column": {},
    });

    if props
        .series
        .iter()
        .any(|s| s.series_type == Some(XYSeriesType::Bellcurve))
    {
        plot["column"] = json!({
            "pointPadding": 0,
            "borderWidth": 0,
            "groupPadding": 0,
            "shadow": false,
        });
    }

    if let Some(enabled) = props.has_data_labels {
        plot["series"]["dataLabels"] = json!({ "enabled": enabled });
    }

    if props.stacked && (props.is_bar_chart() || props.is_column_chart()) {
        let mut stacked = json!({ "stacking": "normal", "dataLabels": { "inside": true } });
        set_opt(&mut stacked["dataLabels"], "enabled", props.has_data_labels);

        merge_json(
            &mut plot,
            json!({ "column": stacked.clone(), "series": stacked }),
        );
    }

    plot
}

fn series_options(props: &XYChartProps) -> Value {
    let y_axis_count = props.y_axis.len().max(1);

    props
        .series
        .iter()
        .enumerate()
        .map(|(index, series)| {
            let data: Vec<Value> = series.values.iter().map(XYPoint::to_data).collect();

            if series.series_type == Some(XYSeriesType::Bellcurve) {
                return json!({
                    "type": "bellcurve",
                    "zIndex": index + 1,
                    "color": series.color,
                    "name": series.name,
                    "marker": { "enabled": false },
                    "fillColor": series
                        .fill_color
                        .as_ref()
                        .map_or_else(|| json!("transparent"), FillColor::to_options),
                    "data": data,
                });
            }

            let series_type = series.series_type.unwrap_or(XYSeriesType::Line);
            let y_axis = if index < y_axis_count { index } else { 0 };
            let mut options = json!({
                "name": series.name,
                "type": series_type,
                "data": data,
                "color": series.color,
                "marker": { "enabled": series_type == XYSeriesType::Scatter },
                "yAxis": y_axis,
                "borderColor": series.color,
            });
            set_opt(
                &mut options,
                "fillColor",
                series.fill_color.as_ref().map(FillColor::to_options),
            );
            options
        })
        .collect()
}

fn category_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
