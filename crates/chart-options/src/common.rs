//! Defaults and helpers shared by every chart kind

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use viz_house_shared::{ChartsError, ChartsResult};

/// Legend placement for charts whose legend sits above or below the plot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendVerticalPosition {
    Hidden,
    Top,
    Bottom,
}

/// Legend placement for charts whose legend sits beside the plot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendHorizontalPosition {
    Hidden,
    Left,
    Right,
}

/// Time window a chart covers; selects the tooltip date precision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimePeriod {
    #[serde(rename = "LAST_HOUR")]
    LastHour,
    #[serde(rename = "LAST_DAY")]
    LastDay,
    #[serde(rename = "LAST_WEEK")]
    LastWeek,
    #[serde(rename = "LAST_MONTH")]
    LastMonth,
    #[serde(rename = "LAST_YEAR")]
    LastYear,
    #[serde(untagged)]
    Other(String),
}

/// Engine date format used in tooltips for a time period
pub fn tooltip_date_format(period: Option<&TimePeriod>) -> &'static str {
    match period {
        Some(TimePeriod::LastHour) => "%B%e, %l:%M:%S %p",
        Some(TimePeriod::LastDay) => "%B%e, %l:%M %p",
        Some(TimePeriod::LastWeek | TimePeriod::LastMonth) => "%B%e, %l %p",
        Some(TimePeriod::LastYear) => "%B%e, %Y",
        Some(TimePeriod::Other(_)) | None => "%Y-%m-%d",
    }
}

/// Series fill: a plain color or vertical gradient stops `(offset, color)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillColor {
    Solid(String),
    Gradient(Vec<(f64, String)>),
}

impl FillColor {
    /// Fading vertical gradient derived from a `#rrggbb` color
    pub fn linear(color: &str) -> ChartsResult<Self> {
        if !color.starts_with('#') || color.len() != 7 {
            return Err(ChartsError::invalid_config(
                "fillColor",
                format!("invalid gradient base color '{color}'"),
            ));
        }

        Ok(FillColor::Gradient(vec![
            (-0.2302, format!("{color}90")),
            (-0.1782, format!("{color}33")),
            (1.0, format!("{color}00")),
        ]))
    }

    pub fn to_options(&self) -> Value {
        match self {
            FillColor::Solid(color) => json!(color),
            FillColor::Gradient(stops) => json!({
                "linearGradient": {"x1": 0, "y1": 0, "x2": 0, "y2": 1},
                "stops": stops,
            }),
        }
    }
}

/// Vertical or horizontal reference line drawn across the plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub value: f64,
    pub color: Option<String>,
    pub dash_style: Option<String>,
    pub label: Option<Value>,
    pub z_index: Option<i32>,
}

impl Annotation {
    pub fn to_plot_line(&self) -> Value {
        let mut line = json!({
            "color": self.color.as_deref().unwrap_or("#00FFD4"),
            "dashStyle": self.dash_style.as_deref().unwrap_or("Solid"),
            "value": self.value,
            "width": 1,
            // above grid lines, below series
            "zIndex": self.z_index.unwrap_or(2),
        });
        if let Some(label) = &self.label {
            line["label"] = label.clone();
        }
        line
    }
}

/// Tooltip behaviour flags passed straight through to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TooltipFlags {
    pub outside: Option<bool>,
    pub shared: Option<bool>,
    pub split: Option<bool>,
}

pub fn default_x_axis() -> Value {
    json!({
        "type": "category",
        // two distinct points with the same category must not share a slot
        "uniqueNames": false,
        "labels": {
            "style": {
                "fontSize": "13px",
                "fontFamily": "Inter, sans-serif"
            }
        }
    })
}

pub fn default_y_axis() -> Value {
    json!({ "title": { "text": "" } })
}

pub fn default_legend() -> Value {
    json!({ "enabled": false })
}

pub fn default_tooltip(flags: Option<&TooltipFlags>) -> Value {
    let mut tooltip = Map::new();
    if let Some(flags) = flags {
        for (key, flag) in [
            ("outside", flags.outside),
            ("shared", flags.shared),
            ("split", flags.split),
        ] {
            if let Some(flag) = flag {
                tooltip.insert(key.to_string(), Value::Bool(flag));
            }
        }
    }
    Value::Object(tooltip)
}

pub fn title(text: Option<&str>) -> Value {
    json!({ "text": text.unwrap_or("") })
}

/// Recursively merge `overrides` into `base`.
///
/// Objects merge key by key and arrays element by element; any other
/// override value replaces the base value. A `null` override leaves the
/// base untouched.
pub fn merge_json(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(override_map)) => {
            for (key, value) in override_map {
                match base_map.get_mut(&key) {
                    Some(base_value) => merge_json(base_value, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(base_items), Value::Array(override_items)) => {
            for (index, value) in override_items.into_iter().enumerate() {
                match base_items.get_mut(index) {
                    Some(base_value) => merge_json(base_value, value),
                    None => base_items.push(value),
                }
            }
        }
        (base, override_value) => {
            *base = override_value;
        }
    }
}

/// Insert `value` under `key` unless it is `None`
pub(crate) fn set_opt<T: Serialize>(target: &mut Value, key: &str, value: Option<T>) {
    if let (Some(value), Value::Object(map)) = (value, target) {
        map.insert(key.to_string(), json!(value));
    }
}
