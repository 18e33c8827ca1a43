//! Heatmap charts
//!
//! Textual and date coordinates are turned into category indices in
//! first-seen order, and the categories are emitted on the matching axis.

use crate::common::{
    default_legend, default_tooltip, default_x_axis, default_y_axis, merge_json, set_opt, title,
    FillColor, LegendHorizontalPosition, TooltipFlags,
};
use crate::xy::{XAxisProps, YAxisProps};
use chrono::DateTime;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use viz_house_shared::{ChartValue, SeriesDescriptor, XValue};

/// Y coordinate of a heatmap cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HeatmapY {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum HeatmapPoint {
    /// Bare value, position implied by index
    Value(f64),
    Cell { x: XValue, y: HeatmapY, value: f64 },
}

impl HeatmapPoint {
    fn cell_value(&self) -> Option<f64> {
        match self {
            HeatmapPoint::Value(_) => None,
            HeatmapPoint::Cell { value, .. } => Some(*value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeatmapSeriesDescriptor {
    pub name: Option<String>,
    pub values: Vec<HeatmapPoint>,
    pub color: Option<String>,
    pub fill_color: Option<FillColor>,
}

impl From<&SeriesDescriptor> for HeatmapSeriesDescriptor {
    fn from(series: &SeriesDescriptor) -> Self {
        let values = series
            .values
            .iter()
            .map(|value| match value {
                ChartValue::Cell(x, y, cell) => HeatmapPoint::Cell {
                    x: x.clone(),
                    y: HeatmapY::Number(*y),
                    value: *cell,
                },
                ChartValue::Point(_, y) => HeatmapPoint::Value(*y),
            })
            .collect();

        Self {
            name: series.name.clone(),
            values,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeatmapYAxisProps {
    pub axis: YAxisProps,
    pub categories: Option<Vec<String>>,
    pub reversed: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeatmapChartProps {
    pub series: Vec<HeatmapSeriesDescriptor>,
    pub title: Option<String>,
    pub x_axis: Option<XAxisProps>,
    pub y_axis: Option<HeatmapYAxisProps>,
    pub has_data_labels: Option<bool>,
    pub legend_position: Option<LegendHorizontalPosition>,
    pub tooltip: Option<TooltipFlags>,
    /// Extra color axis settings merged over the derived min/max
    pub color_axis: Option<Value>,
    /// Raw engine options deep-merged over the generated ones
    pub overrides: Option<Value>,
}

impl HeatmapChartProps {
    pub fn new(series: Vec<HeatmapSeriesDescriptor>) -> Self {
        Self {
            series,
            ..Default::default()
        }
    }
}

/// First-seen ordering of category labels
#[derive(Debug, Default)]
struct Categories {
    labels: Vec<String>,
    indices: HashMap<String, usize>,
}

impl Categories {
    fn index_of(&mut self, label: String) -> usize {
        if let Some(index) = self.indices.get(&label) {
            return *index;
        }
        let index = self.labels.len();
        self.indices.insert(label.clone(), index);
        self.labels.push(label);
        index
    }

    fn into_labels(self) -> Option<Vec<String>> {
        (!self.labels.is_empty()).then_some(self.labels)
    }
}

/// Complete engine options for a heatmap chart
pub fn heatmap_chart_options(props: &HeatmapChartProps) -> Value {
    let overrides = props.overrides.clone().unwrap_or(Value::Null);

    let mut x_categories = Categories::default();
    let mut y_categories = Categories::default();
    let series = series_options(props, &mut x_categories, &mut y_categories);

    let mut x_axis = x_axis_options(props);
    merge_json(&mut x_axis, overrides["xAxis"].clone());
    let mut y_axis = y_axis_options(props);
    merge_json(&mut y_axis, overrides["yAxis"].clone());

    if let Some(labels) = x_categories.into_labels() {
        x_axis["categories"] = json!(labels);
    }
    if let Some(labels) = y_categories.into_labels() {
        y_axis["categories"] = json!(labels);
    }

    let mut tooltip = default_tooltip(props.tooltip.as_ref());
    merge_json(&mut tooltip, overrides["tooltip"].clone());

    let mut options = json!({
        "title": title(props.title.as_deref()),
        "series": series,
        "xAxis": x_axis,
        "yAxis": y_axis,
        "tooltip": tooltip,
        "legend": legend_options(props),
        "colorAxis": color_axis_options(props),
        "plotOptions": plot_options(props),
    });

    merge_json(&mut options, overrides);
    options
}

fn series_options(
    props: &HeatmapChartProps,
    x_categories: &mut Categories,
    y_categories: &mut Categories,
) -> Value {
    props
        .series
        .iter()
        .map(|series| {
            let data: Vec<Value> = series
                .values
                .iter()
                .map(|point| match point {
                    HeatmapPoint::Value(value) => json!(value),
                    HeatmapPoint::Cell { x, y, value } => {
                        let x = match x {
                            XValue::Number(n) => json!(n),
                            XValue::Text(text) => json!(x_categories.index_of(text.clone())),
                            XValue::Timestamp(ms) => json!(x_categories.index_of(date_label(*ms))),
                        };
                        let y = match y {
                            HeatmapY::Number(n) => json!(n),
                            HeatmapY::Text(text) => json!(y_categories.index_of(text.clone())),
                        };
                        json!([x, y, value])
                    }
                })
                .collect();

            let mut options = json!({
                "name": series.name,
                "type": "heatmap",
                "data": data,
                "color": series.color,
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

fn x_axis_options(props: &HeatmapChartProps) -> Value {
    let mut axis = default_x_axis();
    let x_axis = props.x_axis.clone().unwrap_or_default();

    if let Some(text) = &x_axis.title {
        axis["title"] = json!({ "text": text });
    }
    if let Some(domain) = &x_axis.domain {
        let categories: Vec<String> = domain
            .iter()
            .map(|d| match d {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        axis["categories"] = json!(categories);
    }
    if let Some(axis_type) = &x_axis.axis_type {
        axis["type"] = json!(axis_type);
    }

    let rotation = if x_axis.vertical_labels == Some(true) { -45 } else { 0 };
    axis["labels"]["rotation"] = json!(rotation);
    axis
}

fn y_axis_options(props: &HeatmapChartProps) -> Value {
    let mut axis = default_y_axis();
    let y_axis = props.y_axis.clone().unwrap_or_default();

    if let Some(text) = &y_axis.axis.title {
        axis["title"] = json!({ "text": text });
    }
    set_opt(&mut axis, "categories", y_axis.categories.as_ref());
    if y_axis.reversed {
        axis["reversed"] = json!(true);
    }
    set_opt(&mut axis, "tickPositions", y_axis.axis.ticks.as_ref());
    set_opt(&mut axis, "min", y_axis.axis.min);
    set_opt(&mut axis, "max", y_axis.axis.max);
    axis
}

fn legend_options(props: &HeatmapChartProps) -> Value {
    let mut legend = default_legend();
    match props.legend_position {
        Some(LegendHorizontalPosition::Hidden) => {
            legend["enabled"] = json!(false);
        }
        Some(position) => {
            let align = if position == LegendHorizontalPosition::Left {
                "left"
            } else {
                "right"
            };
            legend["enabled"] = json!(true);
            legend["align"] = json!(align);
            legend["layout"] = json!("vertical");
            legend["verticalAlign"] = json!("middle");
        }
        None => {}
    }
    legend
}

/// Color scale bounds, both folded from zero over every cell value
pub fn color_axis_bounds(series: &[HeatmapSeriesDescriptor]) -> (f64, f64) {
    series
        .iter()
        .flat_map(|s| s.values.iter().filter_map(HeatmapPoint::cell_value))
        .fold((0.0, 0.0), |(min, max): (f64, f64), value| {
            (min.min(value), max.max(value))
        })
}

fn color_axis_options(props: &HeatmapChartProps) -> Value {
    let (min, max) = color_axis_bounds(&props.series);
    let mut color_axis = json!({ "min": min, "max": max });
    if let Some(extra) = &props.color_axis {
        merge_json(&mut color_axis, extra.clone());
    }
    color_axis
}

fn plot_options(props: &HeatmapChartProps) -> Value {
    match props.has_data_labels {
        Some(enabled) => json!({ "series": { "dataLabels": { "enabled": enabled } } }),
        None => json!({}),
    }
}

fn date_label(ms: f64) -> String {
    DateTime::from_timestamp_millis(ms as i64)
        .filter(|_| ms.is_finite())
        .map_or_else(|| "Invalid Date".to_string(), |date| date.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(x: &str, y: &str, value: f64) -> HeatmapPoint {
        HeatmapPoint::Cell {
            x: XValue::Text(x.to_string()),
            y: HeatmapY::Text(y.to_string()),
            value,
        }
    }

    #[test]
    fn test_categories_in_first_seen_order() {
        let series = HeatmapSeriesDescriptor {
            name: Some("hits".to_string()),
            values: vec![
                cell("tue", "03:00", 4.0),
                cell("mon", "03:00", 9.0),
                cell("tue", "04:00", 1.0),
            ],
            ..Default::default()
        };

        let options = heatmap_chart_options(&HeatmapChartProps::new(vec![series]));

        assert_eq!(options["xAxis"]["categories"], json!(["tue", "mon"]));
        assert_eq!(options["yAxis"]["categories"], json!(["03:00", "04:00"]));
        assert_eq!(
            options["series"][0]["data"],
            json!([[0, 0, 4.0], [1, 0, 9.0], [0, 1, 1.0]])
        );
        assert_eq!(options["series"][0]["type"], "heatmap");
    }

    #[test]
    fn test_numeric_coordinates_pass_through() {
        let series = HeatmapSeriesDescriptor {
            values: vec![HeatmapPoint::Cell {
                x: XValue::Number(2.0),
                y: HeatmapY::Number(5.0),
                value: 1.0,
            }],
            ..Default::default()
        };

        let options = heatmap_chart_options(&HeatmapChartProps::new(vec![series]));
        assert_eq!(options["series"][0]["data"], json!([[2.0, 5.0, 1.0]]));
        assert!(options["xAxis"].get("categories").is_none());
    }

    #[test]
    fn test_dates_become_categories() {
        let series = HeatmapSeriesDescriptor {
            values: vec![HeatmapPoint::Cell {
                x: XValue::Timestamp(0.0),
                y: HeatmapY::Number(0.0),
                value: 1.0,
            }],
            ..Default::default()
        };

        let options = heatmap_chart_options(&HeatmapChartProps::new(vec![series]));
        assert_eq!(
            options["xAxis"]["categories"],
            json!(["1970-01-01T00:00:00+00:00"])
        );
    }

    #[test]
    fn test_color_axis_folded_from_zero() {
        let positive = HeatmapSeriesDescriptor {
            values: vec![cell("a", "b", 3.0), cell("a", "c", 8.0)],
            ..Default::default()
        };
        assert_eq!(color_axis_bounds(&[positive.clone()]), (0.0, 8.0));

        let mixed = HeatmapSeriesDescriptor {
            values: vec![cell("a", "b", -2.0), HeatmapPoint::Value(100.0)],
            ..Default::default()
        };
        assert_eq!(color_axis_bounds(&[positive, mixed]), (-2.0, 8.0));
    }

    #[test]
    fn test_legend_positions() {
        let mut props = HeatmapChartProps::new(vec![]);
        assert_eq!(legend_options(&props), json!({"enabled": false}));

        props.legend_position = Some(LegendHorizontalPosition::Left);
        assert_eq!(
            legend_options(&props),
            json!({"enabled": true, "align": "left", "layout": "vertical", "verticalAlign": "middle"})
        );
    }

    #[test]
    fn test_overrides_and_axis_props() {
        let mut props = HeatmapChartProps::new(vec![HeatmapSeriesDescriptor {
            values: vec![cell("a", "b", 1.0)],
            ..Default::default()
        }]);
        props.has_data_labels = Some(true);
        props.y_axis = Some(HeatmapYAxisProps {
            axis: YAxisProps {
                title: Some("Hour".to_string()),
                ..Default::default()
            },
            categories: Some(vec!["ignored".to_string()]),
            reversed: true,
        });
        props.color_axis = Some(json!({"minColor": "#ffffff"}));
        props.overrides = Some(json!({"xAxis": {"labels": {"rotation": 30}}, "chart": {"height": 200}}));

        let options = heatmap_chart_options(&props);
        assert_eq!(options["yAxis"]["title"]["text"], "Hour");
        assert_eq!(options["yAxis"]["reversed"], true);
        assert_eq!(options["yAxis"]["categories"], json!(["b"]));
        assert_eq!(options["xAxis"]["labels"]["rotation"], 30);
        assert_eq!(options["chart"]["height"], 200);
        assert_eq!(options["colorAxis"], json!({"min": 0.0, "max": 1.0, "minColor": "#ffffff"}));
        assert_eq!(options["plotOptions"]["series"]["dataLabels"]["enabled"], true);
    }
}
