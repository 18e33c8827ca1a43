//! Remote chart demonstration
//!
//! With a config file argument (JSON, YAML or TOML) the chart queries the
//! configured endpoint; without one a local mock endpoint serves a small
//! query log.

use std::sync::Arc;
use std::time::Duration;
use viz_house_config::{AutoRefreshInterval, Authentication, ConfigParser, RemoteChartConfig};
use viz_house_integration::{RemoteChart, RenderProps};
use viz_house_options::{
    time_series_chart_options, LegendVerticalPosition, TimeSeriesChartProps, XYSeriesDescriptor,
};
use viz_house_shared::{ChartConfig, ColumnType, SeriesConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("Viz House Remote Chart Demo\n");

    // Keep the mock server alive for the whole run
    let mut mock_server = None;
    let config = match std::env::args().nth(1) {
        Some(path) => ConfigParser::parse_file(path)?,
        None => {
            let mut server = mockito::Server::new_async().await;
            server
                .mock("POST", "/")
                .with_status(200)
                .with_body(query_log_rows())
                .create_async()
                .await;
            let config = demo_config(&server.url());
            mock_server = Some(server);
            config
        }
    };

    println!("Querying {}", config.url);

    let chart = RemoteChart::from_config(&config)?.with_render_callback(Arc::new(
        |props: &RenderProps| {
            if props.is_loading {
                println!("  loading...");
            } else if props.has_error() {
                println!("  error: {}", props.error_message);
            } else {
                let points: usize = props.series.iter().map(|s| s.values.len()).sum();
                println!("  {} series, {} points", props.series.len(), points);
            }
        },
    ));

    chart.start()?;

    // Watch a few refresh cycles
    let mut updates = chart.subscribe();
    let watch_for = chart.period().map_or(Duration::from_secs(2), |p| p * 2 + p / 2);
    let _ = tokio::time::timeout(watch_for, async {
        while updates.changed().await.is_ok() {}
    })
    .await;

    let props = chart.props();
    let series = props
        .series
        .iter()
        .map(XYSeriesDescriptor::from)
        .collect::<Vec<_>>();

    let mut chart_props = TimeSeriesChartProps::new(series);
    chart_props.chart.title = Some("Read bytes".to_string());
    chart_props.chart.legend_position = Some(LegendVerticalPosition::Bottom);

    println!("\nEngine options:");
    println!(
        "{}",
        serde_json::to_string_pretty(&time_series_chart_options(&chart_props))?
    );

    let stats = chart.stats();
    println!("\nRefresh statistics:");
    println!("  Cycles started: {}", stats.cycles_started);
    println!("  Cycles succeeded: {}", stats.cycles_succeeded);
    println!("  Cycles failed: {}", stats.cycles_failed);
    if let Some(ms) = stats.last_cycle_duration_ms {
        println!("  Last cycle: {ms}ms");
    }

    chart.shutdown();
    drop(mock_server);

    Ok(())
}

fn demo_config(url: &str) -> RemoteChartConfig {
    let chart = ChartConfig {
        series: vec![
            SeriesConfig::new("event_time", ColumnType::Date, "read_bytes").with_name("Reads"),
        ],
    };

    RemoteChartConfig::new(url, Authentication::basic("default", ""), chart)
        .with_auto_refresh(AutoRefreshInterval::named("5s"))
}

fn query_log_rows() -> String {
    (0..12)
        .map(|i| {
            format!(
                "{{\"event_time\":\"2024-03-01 10:{:02}:00\",\"read_bytes\":\"{}\"}}\n",
                i * 5,
                (i * 37 % 11 + 1) * 4096
            )
        })
        .collect()
}
