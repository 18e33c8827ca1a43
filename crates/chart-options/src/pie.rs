//! Pie and donut charts

use crate::common::{
    default_legend, default_tooltip, merge_json, title, FillColor, LegendVerticalPosition,
    TooltipFlags,
};
use serde_json::{json, Map, Value};
use viz_house_shared::PieChartValue;

/// Inner hole size used by donut charts unless overridden
pub const DEFAULT_INNER_SIZE: &str = "85%";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PieSeriesDescriptor {
    pub name: Option<String>,
    pub values: Vec<PieChartValue>,
    pub fill_color: Option<FillColor>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PieChartProps {
    /// Several series overlap each other; one is the usual case
    pub series: Vec<PieSeriesDescriptor>,
    pub title: Option<String>,
    pub legend_position: Option<LegendVerticalPosition>,
    pub tooltip: Option<TooltipFlags>,
    /// Hole size as pixels (`250`) or percentage (`"80%"`); `None` draws a full pie
    pub inner_size: Option<Value>,
    /// Raw engine options; generated top-level keys take precedence
    pub overrides: Option<Value>,
}

impl PieChartProps {
    pub fn new(series: Vec<PieSeriesDescriptor>) -> Self {
        Self {
            series,
            ..Default::default()
        }
    }
}

/// Complete engine options for a pie chart
pub fn pie_chart_options(props: &PieChartProps) -> Value {
    let overrides = props.overrides.clone().unwrap_or_else(|| json!({}));

    let generated = json!({
        "title": title(props.title.as_deref()),
        "tooltip": merged(default_tooltip(props.tooltip.as_ref()), &overrides["tooltip"]),
        "legend": merged(legend_options(props), &overrides["legend"]),
        "series": series_options(props),
        // show values instead of category names on the slices
        "plotOptions": {
            "series": {
                "dataLabels": { "enabled": true, "format": "{point.y}" }
            }
        }
    });

    let mut options = match overrides {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    if let Value::Object(generated) = generated {
        options.extend(generated);
    }
    Value::Object(options)
}

/// Pie chart with a hole, `85%` unless the props already set a size
pub fn donut_chart_options(props: &PieChartProps) -> Value {
    let mut donut = props.clone();
    donut
        .inner_size
        .get_or_insert_with(|| json!(DEFAULT_INNER_SIZE));
    pie_chart_options(&donut)
}

fn legend_options(props: &PieChartProps) -> Value {
    let mut legend = default_legend();
    if let Some(position) = props.legend_position {
        legend["enabled"] = json!(position != LegendVerticalPosition::Hidden);
        let align = if position == LegendVerticalPosition::Top {
            "top"
        } else {
            "bottom"
        };
        legend["verticalAlign"] = json!(align);
    }
    legend
}

fn series_options(props: &PieChartProps) -> Value {
    props
        .series
        .iter()
        .map(|series| {
            let fill_color = series.fill_color.as_ref().map(FillColor::to_options);
            let data: Vec<Value> = series
                .values
                .iter()
                .map(|value| {
                    json!({
                        "name": value.name,
                        "y": value.y,
                        "color": value.color,
                        "fillColor": fill_color,
                    })
                })
                .collect();

            json!({
                "type": "pie",
                "name": series.name,
                "data": data,
                // every slice gets a legend entry once the legend is shown
                "showInLegend": true,
                "innerSize": props.inner_size,
            })
        })
        .collect()
}

fn merged(mut base: Value, overrides: &Value) -> Value {
    merge_json(&mut base, overrides.clone());
    base
}
