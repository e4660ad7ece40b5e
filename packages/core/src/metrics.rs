//! Prometheus metrics registry for the mood journal.
//!
//! [`AppMetrics`] owns all registered metrics and the [`Registry`] they
//! belong to. Construct it once at startup, wrap in `Arc`, and pass it
//! to the journal service and HTTP middleware.
//!
//! Exposed at `GET /metrics` in Prometheus text exposition format
//! (`text/plain; version=0.0.4`).

use prometheus::{
    Counter, CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry,
};

/// All application-level Prometheus metrics.
pub struct AppMetrics {
    /// Total number of journal entries created.
    pub entries_created_total: Counter,
    /// Current number of entries held by the store.
    pub entries_stored: Gauge,
    /// Total number of mood analysis attempts (success + fallback).
    pub analyses_total: Counter,
    /// Analyses that degraded to the fallback, labelled by failure cause.
    pub analysis_fallbacks_total: CounterVec,
    /// HTTP request count, labelled by method, path, and status code.
    pub http_requests_total: CounterVec,
    /// HTTP request latency histogram in seconds.
    pub http_request_duration: Histogram,
    /// The registry that owns all of the above metrics.
    pub registry: Registry,
}

impl AppMetrics {
    /// Create and register all metrics. Returns an error if any metric
    /// name is invalid or duplicated.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let entries_created_total = Counter::with_opts(Opts::new(
            "mood_journal_entries_created_total",
            "Journal entries created",
        ))?;

        let entries_stored = Gauge::with_opts(Opts::new(
            "mood_journal_entries_stored",
            "Current number of journal entries in the store",
        ))?;

        let analyses_total = Counter::with_opts(Opts::new(
            "mood_journal_analyses_total",
            "Mood analysis attempts",
        ))?;

        let analysis_fallbacks_total = CounterVec::new(
            Opts::new(
                "mood_journal_analysis_fallbacks_total",
                "Mood analyses that fell back to default values, by cause",
            ),
            &["cause"],
        )?;

        let http_requests_total = CounterVec::new(
            Opts::new(
                "mood_journal_http_requests_total",
                "HTTP requests by method, path, and status",
            ),
            &["method", "path", "status"],
        )?;

        let http_request_duration = Histogram::with_opts(
            HistogramOpts::new(
                "mood_journal_http_request_duration_seconds",
                "HTTP request latency in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 15.0]),
        )?;

        registry.register(Box::new(entries_created_total.clone()))?;
        registry.register(Box::new(entries_stored.clone()))?;
        registry.register(Box::new(analyses_total.clone()))?;
        registry.register(Box::new(analysis_fallbacks_total.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration.clone()))?;

        Ok(Self {
            entries_created_total,
            entries_stored,
            analyses_total,
            analysis_fallbacks_total,
            http_requests_total,
            http_request_duration,
            registry,
        })
    }

    /// Render all metrics as Prometheus text format (for the `/metrics` endpoint).
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&metric_families, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap_or_default())
    }
}
