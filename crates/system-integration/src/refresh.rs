//! Remote chart session: initial load plus optional auto-refresh

use crate::lifecycle::{PhaseTracker, RefreshPhase, RefreshStats};
use crate::render::{RenderCallback, RenderProps};
use crate::{IntegrationError, Result};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use viz_house_config::{AutoRefreshInterval, ConfigValidator, RemoteChartConfig};
use viz_house_data::{transform_query_results, QuerySource, RemoteFetcher};
use viz_house_shared::{ChartConfig, ChartsError, ChartsResult, SeriesDescriptor};

/// One chart bound to a remote query.
///
/// [`start`](Self::start) runs the first fetch-and-transform cycle right
/// away and, when an auto-refresh interval is configured, keeps a single
/// timer task repeating it. Failures land in
/// [`RenderProps::error_message`] and never stop the timer.
pub struct RemoteChart {
    inner: Arc<SessionInner>,
    started: AtomicBool,
    worker: Mutex<Option<JoinHandle<()>>>,
}

struct SessionInner {
    source: Arc<dyn QuerySource>,
    chart_config: ChartConfig,
    period: Option<Duration>,
    props: watch::Sender<RenderProps>,
    on_render: RwLock<Option<RenderCallback>>,
    tracker: PhaseTracker,
    /// Bumped on teardown; cycles tagged with an older value are discarded
    generation: AtomicU64,
    cycle_lock: tokio::sync::Mutex<()>,
}

impl RemoteChart {
    pub fn new(
        source: Arc<dyn QuerySource>,
        chart_config: ChartConfig,
        auto_refresh: Option<AutoRefreshInterval>,
    ) -> Self {
        let period = auto_refresh.as_ref().and_then(AutoRefreshInterval::period);
        let (props, _) = watch::channel(RenderProps::default());

        Self {
            inner: Arc::new(SessionInner {
                source,
                chart_config,
                period,
                props,
                on_render: RwLock::new(None),
                tracker: PhaseTracker::new(),
                generation: AtomicU64::new(0),
                cycle_lock: tokio::sync::Mutex::new(()),
            }),
            started: AtomicBool::new(false),
            worker: Mutex::new(None),
        }
    }

    /// Validate a full configuration and fetch over HTTP
    pub fn from_config(config: &RemoteChartConfig) -> Result<Self> {
        ConfigValidator::validate(config)?;

        let fetcher = RemoteFetcher::from_config(config);
        let chart = Self::new(
            Arc::new(fetcher),
            config.chart_config.clone(),
            config.auto_refresh.clone(),
        );
        Ok(chart.with_dimensions(&config.height, &config.width))
    }

    pub fn with_render_callback(self, callback: RenderCallback) -> Self {
        self.set_render_callback(callback);
        self
    }

    pub fn with_dimensions(self, height: &str, width: &str) -> Self {
        self.inner.props.send_modify(|props| {
            props.height = height.to_string();
            props.width = width.to_string();
        });
        self
    }

    pub fn set_render_callback(&self, callback: RenderCallback) {
        *self.inner.on_render.write() = Some(callback);
    }

    /// Refresh period, `None` when the chart loads once
    pub fn period(&self) -> Option<Duration> {
        self.inner.period
    }

    pub fn subscribe(&self) -> watch::Receiver<RenderProps> {
        self.inner.props.subscribe()
    }

    pub fn props(&self) -> RenderProps {
        self.inner.props.borrow().clone()
    }

    pub fn phase(&self) -> RefreshPhase {
        self.inner.tracker.phase()
    }

    pub fn stats(&self) -> RefreshStats {
        self.inner.tracker.stats()
    }

    pub fn is_active(&self) -> bool {
        self.started.load(Ordering::SeqCst) && !self.inner.tracker.is_shut_down()
    }

    /// Activate the session.
    ///
    /// Returns `Ok(false)` without doing anything when the session was
    /// already activated, so at most one timer ever exists.
    pub fn start(&self) -> Result<bool> {
        if self.inner.tracker.is_shut_down() {
            return Err(IntegrationError::Lifecycle(
                "Cannot start a session that was shut down".to_string(),
            ));
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| IntegrationError::Lifecycle(format!("No async runtime: {e}")))?;

        if self.started.swap(true, Ordering::SeqCst) {
            log::debug!("{} already active", self.inner.source.describe());
            return Ok(false);
        }

        let inner = Arc::clone(&self.inner);
        let generation = inner.generation.load(Ordering::SeqCst);
        let handle = runtime.spawn(async move { inner.run(generation).await });
        *self.worker.lock() = Some(handle);

        Ok(true)
    }

    /// Run one cycle now, outside the timer schedule
    pub async fn refresh(&self) -> Result<()> {
        let generation = self.inner.generation.load(Ordering::SeqCst);
        self.inner.run_cycle(generation).await
    }

    /// Cancel the timer and any cycle it is running; later results are dropped
    pub fn shutdown(&self) {
        if self.inner.tracker.is_shut_down() {
            return;
        }

        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.worker.lock().take() {
            handle.abort();
            if self.inner.period.is_some() {
                log::info!("Stopped auto-refresh for {}", self.inner.source.describe());
            }
        }
        self.inner.tracker.shut_down();
    }
}

impl Drop for RemoteChart {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl SessionInner {
    async fn run(&self, generation: u64) {
        // created before the first load so ticks stay aligned to activation
        let ticker = self.period.map(|period| {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.tracker.record_timer_started();
            log::info!(
                "Auto-refreshing {} every {}ms",
                self.source.describe(),
                period.as_millis()
            );
            ticker
        });

        // failures are already published to the render state
        let _ = self.run_cycle(generation).await;

        let Some(mut ticker) = ticker else {
            return;
        };

        loop {
            ticker.tick().await;
            if self.is_stale(generation) {
                break;
            }
            let _ = self.run_cycle(generation).await;
        }
    }

    async fn run_cycle(&self, generation: u64) -> Result<()> {
        let _guard = self.cycle_lock.lock().await;

        if self.is_stale(generation) {
            return Err(ChartsError::Cancelled.into());
        }

        self.tracker.begin_cycle()?;
        self.publish(|props| props.is_loading = true);

        log::debug!("Refreshing {}", self.source.describe());
        let outcome = self.load().await;

        if self.is_stale(generation) {
            self.tracker.record_discarded();
            log::debug!(
                "Discarding result for {} after shutdown",
                self.source.describe()
            );
            return Err(ChartsError::Cancelled.into());
        }

        match outcome {
            Ok((record_count, series)) => {
                self.tracker.complete_cycle(record_count)?;
                log::debug!(
                    "Loaded {} records into {} series",
                    record_count,
                    series.len()
                );
                self.publish(|props| {
                    props.series = series;
                    props.error_message.clear();
                    props.error = None;
                    props.is_loading = false;
                });
                Ok(())
            }
            Err(err) => {
                self.tracker.fail_cycle()?;
                if err.is_transient() {
                    log::warn!("Refresh of {} failed: {}", self.source.describe(), err);
                } else {
                    log::error!("Refresh of {} failed: {}", self.source.describe(), err);
                }
                let message = err.to_string();
                let error = err.clone();
                self.publish(|props| {
                    props.series.clear();
                    props.error_message = message;
                    props.error = Some(error);
                    props.is_loading = false;
                });
                Err(err.into())
            }
        }
    }

    async fn load(&self) -> ChartsResult<(usize, Vec<SeriesDescriptor>)> {
        let records = self.source.fetch_records().await?;
        let series = transform_query_results(&records, &self.chart_config)?;
        Ok((records.len(), series))
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    fn publish(&self, update: impl FnOnce(&mut RenderProps)) {
        self.props.send_modify(update);

        let callback = self.on_render.read().clone();
        if let Some(callback) = callback {
            let snapshot = self.props.borrow().clone();
            callback(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use viz_house_shared::{ColumnType, Record, SeriesConfig};

    struct StaticSource(Vec<Record>);

    #[async_trait]
    impl QuerySource for StaticSource {
        async fn fetch_records(&self) -> ChartsResult<Vec<Record>> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            "static rows".to_string()
        }
    }

    fn record(x: &str, y: f64) -> Record {
        match json!({"x": x, "y": y}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn chart_config() -> ChartConfig {
        ChartConfig {
            series: vec![SeriesConfig::new("x", ColumnType::String, "y")],
        }
    }

    #[tokio::test]
    async fn test_refresh_publishes_series() {
        let source = StaticSource(vec![record("a", 1.0), record("b", 2.0)]);
        let chart = RemoteChart::new(Arc::new(source), chart_config(), None);

        chart.refresh().await.unwrap();

        let props = chart.props();
        assert!(!props.is_loading);
        assert!(!props.has_error());
        assert_eq!(props.series.len(), 1);
        assert_eq!(props.series[0].values.len(), 2);
        assert_eq!(chart.phase(), RefreshPhase::Ready);
        assert_eq!(chart.stats().last_record_count, Some(2));
    }

    #[tokio::test]
    async fn test_missing_column_surfaces_as_message() {
        let source = StaticSource(vec![record("a", 1.0)]);
        let config = ChartConfig {
            series: vec![SeriesConfig::new("x", ColumnType::String, "bytes")],
        };
        let chart = RemoteChart::new(Arc::new(source), config, None);

        assert!(chart.refresh().await.is_err());

        let props = chart.props();
        assert!(props.series.is_empty());
        assert!(props.error_message.contains("bytes"));
        assert!(matches!(
            &props.error,
            Some(err @ ChartsError::MissingColumn { .. }) if !err.is_transient()
        ));
        assert_eq!(chart.phase(), RefreshPhase::Errored);
    }

    #[tokio::test]
    async fn test_shutdown_is_terminal() {
        let chart = RemoteChart::new(Arc::new(StaticSource(Vec::new())), chart_config(), None);
        chart.shutdown();

        assert!(chart.start().is_err());
        assert!(matches!(
            chart.refresh().await,
            Err(IntegrationError::Charts(ChartsError::Cancelled))
        ));
        assert_eq!(chart.phase(), RefreshPhase::ShutDown);
    }

    #[test]
    fn test_start_requires_runtime() {
        let chart = RemoteChart::new(Arc::new(StaticSource(Vec::new())), chart_config(), None);
        assert!(matches!(chart.start(), Err(IntegrationError::Lifecycle(_))));
        assert!(!chart.is_active());
    }

    #[test]
    fn test_dimensions_default_to_inherit() {
        let chart = RemoteChart::new(Arc::new(StaticSource(Vec::new())), chart_config(), None);
        assert_eq!(chart.props().height, "inherit");

        let sized = chart.with_dimensions("300px", "100%");
        assert_eq!(sized.props().height, "300px");
        assert_eq!(sized.props().width, "100%");
    }
}
