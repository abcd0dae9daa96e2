//! Prometheus metrics for reconciliation batches.

use prometheus::{
    CounterVec, Gauge, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::{Duration, Instant};

/// Label value for endpoint batches
pub const KIND_ENDPOINTS: &str = "endpoints";
/// Label value for open-call batches
pub const KIND_OPENS: &str = "opens";

/// Application metrics collector for Prometheus integration
#[derive(Clone)]
pub struct AppMetrics {
    pub registry: Registry,
    pub records_received_total: CounterVec,
    pub records_emitted_total: CounterVec,
    pub records_skipped_total: CounterVec,
    pub reconcile_duration_seconds: HistogramVec,
    pub identifiers: GaugeVec,
    pub app_uptime_seconds: Gauge,
    pub app_info: CounterVec,
    pub start_time: Instant,
}

/// Counts describing one finished batch
#[derive(Debug, Clone, Copy)]
pub struct BatchOutcome {
    pub received: usize,
    pub emitted: usize,
    pub skipped: usize,
    pub identifiers: usize,
    pub duration: Duration,
}

impl AppMetrics {
    /// Create a new metrics collector and register every metric
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let records_received_total = CounterVec::new(
            Opts::new(
                "generalizer_records_received_total",
                "Raw records submitted for reconciliation",
            ),
            &["kind"],
        )?;

        let records_emitted_total = CounterVec::new(
            Opts::new(
                "generalizer_records_emitted_total",
                "Generalized records returned by reconciliation",
            ),
            &["kind"],
        )?;

        let records_skipped_total = CounterVec::new(
            Opts::new(
                "generalizer_records_skipped_total",
                "Records dropped because they could not be parsed",
            ),
            &["kind"],
        )?;

        let reconcile_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "generalizer_reconcile_duration_seconds",
                "Time spent reconciling one batch",
            )
            .buckets(vec![
                0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ]),
            &["kind"],
        )?;

        let identifiers = GaugeVec::new(
            Opts::new("generalizer_identifiers", "Trie roots held by an analyzer"),
            &["kind"],
        )?;

        let app_uptime_seconds = Gauge::new("app_uptime_seconds", "Application uptime in seconds")?;

        let app_info = CounterVec::new(
            Opts::new("app_info", "Application information"),
            &["version", "commit", "build_time"],
        )?;

        registry.register(Box::new(records_received_total.clone()))?;
        registry.register(Box::new(records_emitted_total.clone()))?;
        registry.register(Box::new(records_skipped_total.clone()))?;
        registry.register(Box::new(reconcile_duration_seconds.clone()))?;
        registry.register(Box::new(identifiers.clone()))?;
        registry.register(Box::new(app_uptime_seconds.clone()))?;
        registry.register(Box::new(app_info.clone()))?;

        app_info
            .with_label_values(&[
                env!("CARGO_PKG_VERSION"),
                option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
                option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
            ])
            .inc();

        Ok(Self {
            registry,
            records_received_total,
            records_emitted_total,
            records_skipped_total,
            reconcile_duration_seconds,
            identifiers,
            app_uptime_seconds,
            app_info,
            start_time: Instant::now(),
        })
    }

    /// Record the outcome of a reconciliation batch of the given kind
    pub fn record_batch(&self, kind: &str, outcome: BatchOutcome) {
        self.records_received_total
            .with_label_values(&[kind])
            .inc_by(outcome.received as f64);
        self.records_emitted_total
            .with_label_values(&[kind])
            .inc_by(outcome.emitted as f64);
        self.records_skipped_total
            .with_label_values(&[kind])
            .inc_by(outcome.skipped as f64);
        self.reconcile_duration_seconds
            .with_label_values(&[kind])
            .observe(outcome.duration.as_secs_f64());
        self.identifiers
            .with_label_values(&[kind])
            .set(outcome.identifiers as f64);
    }

    /// Update the application uptime gauge
    pub fn update_uptime(&self) {
        self.app_uptime_seconds
            .set(self.start_time.elapsed().as_secs_f64());
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder.encode_to_string(&metric_families)
    }
}
