//! Query-result to series transformation

use crate::coerce::{coerce_x, parse_float, to_number, to_text};
use serde_json::Value;
use viz_house_shared::{
    ChartConfig, ChartValue, ChartsError, ChartsResult, ColumnRole, PieChartValue, Record,
    SeriesConfig, SeriesDescriptor,
};

/// Build one series per configured entry, one value per record, in record order.
///
/// Fails on the first record missing a configured column.
pub fn transform_query_results(
    records: &[Record],
    chart_config: &ChartConfig,
) -> ChartsResult<Vec<SeriesDescriptor>> {
    chart_config
        .series
        .iter()
        .enumerate()
        .map(|(index, series)| transform_series(records, series, index))
        .collect()
}

fn transform_series(
    records: &[Record],
    series: &SeriesConfig,
    index: usize,
) -> ChartsResult<SeriesDescriptor> {
    let column = |record: &'_ Record, name: &str, role: ColumnRole| -> ChartsResult<Value> {
        record
            .get(name)
            .cloned()
            .ok_or_else(|| ChartsError::MissingColumn {
                role,
                column: name.to_string(),
                series: series.label(index),
            })
    };

    let values = records
        .iter()
        .map(|record| {
            let raw_x = column(record, &series.x_axis.column, ColumnRole::XAxis)?;
            let raw_y = column(record, &series.y_axis.column, ColumnRole::YAxis)?;

            let x = coerce_x(&raw_x, series.x_axis.column_type);
            let y = parse_float(&raw_y);

            match &series.value {
                Some(value_column) => {
                    let raw_value = column(record, value_column, ColumnRole::Value)?;
                    Ok(ChartValue::Cell(x, y, to_number(&raw_value)))
                }
                None => Ok(ChartValue::Point(x, y)),
            }
        })
        .collect::<ChartsResult<Vec<_>>>()?;

    log::debug!(
        "Transformed {} records into {}",
        values.len(),
        series.label(index)
    );

    Ok(SeriesDescriptor {
        name: series.name.clone(),
        values,
    })
}

/// Build named points for categorical charts from a name and a value column
pub fn pie_values(
    records: &[Record],
    name_column: &str,
    y_column: &str,
) -> ChartsResult<Vec<PieChartValue>> {
    let missing = |role, column: &str| ChartsError::MissingColumn {
        role,
        column: column.to_string(),
        series: "pie series".to_string(),
    };

    records
        .iter()
        .map(|record| {
            let name = record
                .get(name_column)
                .ok_or_else(|| missing(ColumnRole::XAxis, name_column))?;
            let y = record
                .get(y_column)
                .ok_or_else(|| missing(ColumnRole::YAxis, y_column))?;

            Ok(PieChartValue {
                name: to_text(name),
                y: parse_float(y),
                color: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use viz_house_shared::{ColumnType, XValue};

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test records must be objects"),
        }
    }

    #[test]
    fn test_missing_y_column_fails_fast() {
        let records = vec![record(json!({"a": 1}))];
        let config = ChartConfig {
            series: vec![SeriesConfig::new("a", ColumnType::Number, "b")],
        };

        let err = transform_query_results(&records, &config).unwrap_err();
        match &err {
            ChartsError::MissingColumn { role, column, .. } => {
                assert_eq!(*role, ColumnRole::YAxis);
                assert_eq!(column, "b");
            }
            other => panic!("Wrong error variant: {other:?}"),
        }
        assert!(err.to_string().contains("column b"));
    }

    #[test]
    fn test_missing_x_column_checked_first() {
        let records = vec![record(json!({"y": 1}))];
        let config = ChartConfig {
            series: vec![SeriesConfig::new("x", ColumnType::Date, "missing_too").with_name("Load")],
        };

        let err = transform_query_results(&records, &config).unwrap_err();
        assert!(matches!(
            &err,
            ChartsError::MissingColumn { role: ColumnRole::XAxis, column, series }
                if column == "x" && series == "series 'Load'"
        ));
    }

    #[test]
    fn test_null_cell_is_not_missing() {
        let records = vec![record(json!({"x": "a", "y": null}))];
        let config = ChartConfig {
            series: vec![SeriesConfig::new("x", ColumnType::String, "y")],
        };

        let series = transform_query_results(&records, &config).unwrap();
        assert!(series[0].values[0].y().is_nan());
    }

    #[test]
    fn test_value_column_produces_cells() {
        let records = vec![
            record(json!({"day": "mon", "hour": "3", "hits": "12"})),
            record(json!({"day": "tue", "hour": 4, "hits": 7})),
        ];
        let config = ChartConfig {
            series: vec![SeriesConfig::new("day", ColumnType::String, "hour").with_value("hits")],
        };

        let series = transform_query_results(&records, &config).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, None);
        assert_eq!(
            series[0].values,
            vec![
                ChartValue::Cell(XValue::Text("mon".to_string()), 3.0, 12.0),
                ChartValue::Cell(XValue::Text("tue".to_string()), 4.0, 7.0),
            ]
        );
    }

    #[test]
    fn test_missing_value_column() {
        let records = vec![record(json!({"x": 1, "y": 2}))];
        let config = ChartConfig {
            series: vec![SeriesConfig::new("x", ColumnType::Number, "y").with_value("v")],
        };

        assert!(matches!(
            transform_query_results(&records, &config),
            Err(ChartsError::MissingColumn { role: ColumnRole::Value, .. })
        ));
    }

    #[test]
    fn test_multiple_series_share_records() {
        let records = vec![
            record(json!({"t": "1", "a": "10", "b": "20"})),
            record(json!({"t": "2", "a": "11", "b": "21"})),
        ];
        let config = ChartConfig {
            series: vec![
                SeriesConfig::new("t", ColumnType::Number, "a").with_name("A"),
                SeriesConfig::new("t", ColumnType::Number, "b").with_name("B"),
            ],
        };

        let series = transform_query_results(&records, &config).unwrap();
        let ys: Vec<Vec<f64>> = series
            .iter()
            .map(|s| s.values.iter().map(ChartValue::y).collect())
            .collect();
        assert_eq!(ys, vec![vec![10.0, 11.0], vec![20.0, 21.0]]);
        assert_eq!(series[1].name.as_deref(), Some("B"));
    }

    #[test]
    fn test_empty_records_give_empty_series() {
        let config = ChartConfig {
            series: vec![SeriesConfig::new("x", ColumnType::Date, "y")],
        };
        let series = transform_query_results(&[], &config).unwrap();
        assert_eq!(series, vec![SeriesDescriptor::default()]);
    }

    #[test]
    fn test_pie_values() {
        let records = vec![
            record(json!({"engine": "MergeTree", "tables": "12"})),
            record(json!({"engine": "Log", "tables": 3})),
        ];

        let values = pie_values(&records, "engine", "tables").unwrap();
        assert_eq!(values[0].name, "MergeTree");
        assert_eq!(values[0].y, 12.0);
        assert_eq!(values[1].y, 3.0);

        assert!(pie_values(&records, "engine", "rows").is_err());
    }
}
