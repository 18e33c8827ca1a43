//! XY charts over a datetime x axis

use crate::common::{merge_json, tooltip_date_format, TimePeriod};
use crate::xy::{xy_chart_options, XAxisProps, XYChartProps, XYPoint, XYSeriesDescriptor};
use serde_json::{json, Value};
use viz_house_shared::{parse_timestamp_millis, XValue};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeriesChartProps {
    pub chart: XYChartProps,
    /// Selects the tooltip date precision
    pub period: Option<TimePeriod>,
}

impl TimeSeriesChartProps {
    pub fn new(series: Vec<XYSeriesDescriptor>) -> Self {
        Self {
            chart: XYChartProps::new(series),
            period: None,
        }
    }
}

/// Complete engine options for a time-series chart
pub fn time_series_chart_options(props: &TimeSeriesChartProps) -> Value {
    let mut chart = props.chart.clone();

    chart.series = chart.series.iter().map(to_time_series).collect();

    let user_x_axis = chart.x_axis.take().unwrap_or_default();
    chart.x_axis = Some(XAxisProps {
        axis_type: user_x_axis.axis_type.or_else(|| Some("datetime".to_string())),
        vertical_labels: user_x_axis.vertical_labels.or(Some(true)),
        ..user_x_axis
    });

    let mut overrides = json!({
        "xAxis": {
            "type": "datetime",
            "showEmpty": false,
            // millisecond rounded to seconds so single-point charts never show millis
            "dateTimeLabelFormats": {
                "millisecond": "%H:%M:%S",
                "second": "%H:%M:%S",
                "minute": "%H:%M",
                "hour": "%H:%M",
                "day": "%e. %b",
                "week": "%e. %b",
                "month": "%b '%y",
                "year": "%Y"
            }
        },
        "tooltip": { "xDateFormat": tooltip_date_format(props.period.as_ref()) },
        "time": { "useUTC": false }
    });

    let single_axis_without_ticks = match chart.y_axis.as_slice() {
        [] => true,
        [axis] => axis.ticks.is_none(),
        _ => false,
    };
    if single_axis_without_ticks {
        if let Some(ticks) = tick_positions(&chart.series) {
            overrides["yAxis"] = json!({ "tickPositions": ticks });
        }
    }

    if let Some(user_overrides) = chart.overrides.take() {
        merge_json(&mut overrides, user_overrides);
    }
    chart.overrides = Some(overrides);

    xy_chart_options(&chart)
}

fn to_time_series(series: &XYSeriesDescriptor) -> XYSeriesDescriptor {
    let values = series
        .values
        .iter()
        .map(|point| match point {
            XYPoint::Point { x, y, name } => XYPoint::Point {
                x: XValue::Timestamp(timestamp_of(x)),
                y: *y,
                name: name.clone(),
            },
            bare => bare.clone(),
        })
        .collect();

    XYSeriesDescriptor {
        values,
        ..series.clone()
    }
}

fn timestamp_of(x: &XValue) -> f64 {
    match x {
        XValue::Timestamp(ms) | XValue::Number(ms) => *ms,
        XValue::Text(text) => parse_timestamp_millis(text).map_or(f64::NAN, |ms| ms as f64),
    }
}

/// Y-axis ticks `[0, top / 2, top]` fitting the tallest series.
///
/// `top` is the largest value rounded up at its leading decimal digit.
/// Returns `None` when there are no series.
pub fn tick_positions(series: &[XYSeriesDescriptor]) -> Option<Vec<f64>> {
    series
        .iter()
        .map(|s| {
            let ys: Vec<Option<f64>> = s.values.iter().map(XYPoint::y).collect();
            series_ticks(&ys)
        })
        .max_by(|a, b| top_tick(a).total_cmp(&top_tick(b)))
}

fn series_ticks(ys: &[Option<f64>]) -> Vec<f64> {
    let max_value = match ys {
        [] => return vec![0.0, 0.0],
        [single] => single.unwrap_or(0.0),
        many => many
            .iter()
            .map(|y| y.filter(|v| v.is_finite()).unwrap_or(0.0))
            .fold(0.0, f64::max),
    };
    ticks_for_max(max_value)
}

fn ticks_for_max(max_value: f64) -> Vec<f64> {
    if !max_value.is_finite() || max_value <= 0.0 {
        return vec![0.0];
    }

    // subnormal maxima underflow the scale, the largest ones overflow the top
    let scale = 10f64.powi(max_value.log10().floor() as i32);
    if scale == 0.0 {
        return vec![0.0];
    }
    let top = (max_value / scale).ceil() * scale;
    if !top.is_finite() {
        return vec![0.0, max_value / 2.0, max_value];
    }
    vec![0.0, top / 2.0, top]
}

fn top_tick(ticks: &[f64]) -> f64 {
    ticks.last().copied().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(&str, f64)]) -> XYSeriesDescriptor {
        XYSeriesDescriptor {
            name: Some("reads".to_string()),
            values: points
                .iter()
                .map(|(x, y)| XYPoint::new(XValue::Text(x.to_string()), *y))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_ticks_round_up_leading_digit() {
        assert_eq!(ticks_for_max(1234.0), vec![0.0, 1000.0, 2000.0]);
        assert_eq!(ticks_for_max(1000.0), vec![0.0, 500.0, 1000.0]);
        assert_eq!(ticks_for_max(7.0), vec![0.0, 3.5, 7.0]);
        assert_eq!(ticks_for_max(0.0), vec![0.0]);
        assert_eq!(ticks_for_max(-5.0), vec![0.0]);
    }

    #[test]
    fn test_extreme_maxima_keep_ticks_finite() {
        for max_value in [1e-320, f64::MIN_POSITIVE, f64::MAX] {
            let ticks = ticks_for_max(max_value);
            assert_eq!(ticks[0], 0.0);
            assert!(ticks.iter().all(|t| t.is_finite()), "{max_value}: {ticks:?}");
        }
        assert_eq!(ticks_for_max(f64::MAX).last(), Some(&f64::MAX));
    }

    #[test]
    fn test_tallest_series_wins() {
        let small = series(&[("2024-01-01", 3.0), ("2024-01-02", 4.0)]);
        let large = series(&[("2024-01-01", 120.0), ("2024-01-02", 80.0)]);

        assert_eq!(
            tick_positions(&[small, large]),
            Some(vec![0.0, 100.0, 200.0])
        );
        assert_eq!(tick_positions(&[]), None);
        assert_eq!(
            tick_positions(&[XYSeriesDescriptor::default()]),
            Some(vec![0.0, 0.0])
        );
    }

    #[test]
    fn test_options() {
        let mut props =
            TimeSeriesChartProps::new(vec![series(&[("2024-01-01", 3.0), ("2024-01-02", 40.0)])]);
        props.period = Some(TimePeriod::LastDay);

        let options = time_series_chart_options(&props);

        assert_eq!(options["xAxis"]["type"], "datetime");
        assert_eq!(options["xAxis"]["showEmpty"], false);
        assert_eq!(options["xAxis"]["labels"]["rotation"], -45);
        assert_eq!(options["xAxis"]["dateTimeLabelFormats"]["month"], "%b '%y");
        assert_eq!(options["tooltip"]["xDateFormat"], "%B%e, %l:%M %p");
        assert_eq!(options["time"]["useUTC"], false);
        assert_eq!(options["yAxis"]["tickPositions"], json!([0.0, 20.0, 40.0]));
        assert_eq!(
            options["series"][0]["data"],
            json!([[1_704_067_200_000.0, 3.0], [1_704_153_600_000.0, 40.0]])
        );
    }

    #[test]
    fn test_user_settings_win() {
        let mut props = TimeSeriesChartProps::new(vec![series(&[("2024-01-01", 3.0)])]);
        props.chart.x_axis = Some(XAxisProps {
            title: Some("When".to_string()),
            vertical_labels: Some(false),
            ..Default::default()
        });
        props.chart.overrides = Some(json!({ "time": { "useUTC": true } }));

        let options = time_series_chart_options(&props);
        assert_eq!(options["xAxis"]["title"]["text"], "When");
        assert!(options["xAxis"]["labels"].get("rotation").is_none());
        assert_eq!(options["time"]["useUTC"], true);
        assert_eq!(options["tooltip"]["xDateFormat"], "%Y-%m-%d");
    }
}
