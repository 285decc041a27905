//! Basic metrics instrumentation for the tracking client.
//!
//! Provides counters and duration tracking for HTTP requests and tracking
//! operations, including calls skipped while tracking is inactive.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Metrics collector for tracking client activity.
#[derive(Debug, Clone)]
pub struct Metrics {
    /// Total number of HTTP requests made
    http_requests_total: Arc<AtomicU64>,

    /// Total number of HTTP errors
    http_errors_total: Arc<AtomicU64>,

    /// Total duration of all HTTP requests in milliseconds
    http_duration_total_ms: Arc<AtomicU64>,

    /// Number of runs started
    runs_started_total: Arc<AtomicU64>,

    /// Number of runs ended
    runs_ended_total: Arc<AtomicU64>,

    /// Number of artifact files uploaded
    artifacts_uploaded_total: Arc<AtomicU64>,

    /// Number of tracking calls skipped because tracking was inactive
    skipped_inactive_total: Arc<AtomicU64>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            http_requests_total: Arc::new(AtomicU64::new(0)),
            http_errors_total: Arc::new(AtomicU64::new(0)),
            http_duration_total_ms: Arc::new(AtomicU64::new(0)),
            runs_started_total: Arc::new(AtomicU64::new(0)),
            runs_ended_total: Arc::new(AtomicU64::new(0)),
            artifacts_uploaded_total: Arc::new(AtomicU64::new(0)),
            skipped_inactive_total: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record an HTTP request with duration.
    pub fn record_http_request(&self, duration: Duration) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        self.http_duration_total_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record an HTTP error.
    pub fn record_http_error(&self) {
        self.http_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a run started.
    pub fn record_run_started(&self) {
        self.runs_started_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a run ended.
    pub fn record_run_ended(&self) {
        self.runs_ended_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record artifact files uploaded.
    pub fn record_artifacts_uploaded(&self, count: usize) {
        self.artifacts_uploaded_total
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record a tracking call skipped because tracking was inactive.
    pub fn record_skipped_inactive(&self) {
        self.skipped_inactive_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total HTTP requests.
    pub fn http_requests_total(&self) -> u64 {
        self.http_requests_total.load(Ordering::Relaxed)
    }

    /// Get total HTTP errors.
    pub fn http_errors_total(&self) -> u64 {
        self.http_errors_total.load(Ordering::Relaxed)
    }

    /// Get total HTTP duration in milliseconds.
    pub fn http_duration_total_ms(&self) -> u64 {
        self.http_duration_total_ms.load(Ordering::Relaxed)
    }

    /// Get average HTTP request duration in milliseconds.
    pub fn http_duration_avg_ms(&self) -> f64 {
        let total = self.http_duration_total_ms.load(Ordering::Relaxed);
        let count = self.http_requests_total.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    /// Get total runs started.
    pub fn runs_started_total(&self) -> u64 {
        self.runs_started_total.load(Ordering::Relaxed)
    }

    /// Get total runs ended.
    pub fn runs_ended_total(&self) -> u64 {
        self.runs_ended_total.load(Ordering::Relaxed)
    }

    /// Get total artifact files uploaded.
    pub fn artifacts_uploaded_total(&self) -> u64 {
        self.artifacts_uploaded_total.load(Ordering::Relaxed)
    }

    /// Get total tracking calls skipped while inactive.
    pub fn skipped_inactive_total(&self) -> u64 {
        self.skipped_inactive_total.load(Ordering::Relaxed)
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        self.http_requests_total.store(0, Ordering::Relaxed);
        self.http_errors_total.store(0, Ordering::Relaxed);
        self.http_duration_total_ms.store(0, Ordering::Relaxed);
        self.runs_started_total.store(0, Ordering::Relaxed);
        self.runs_ended_total.store(0, Ordering::Relaxed);
        self.artifacts_uploaded_total.store(0, Ordering::Relaxed);
        self.skipped_inactive_total.store(0, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics.
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            http_requests_total: self.http_requests_total(),
            http_errors_total: self.http_errors_total(),
            http_duration_total_ms: self.http_duration_total_ms(),
            http_duration_avg_ms: self.http_duration_avg_ms(),
            runs_started_total: self.runs_started_total(),
            runs_ended_total: self.runs_ended_total(),
            artifacts_uploaded_total: self.artifacts_uploaded_total(),
            skipped_inactive_total: self.skipped_inactive_total(),
        }
    }
}

/// A snapshot of metrics values.
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub http_requests_total: u64,
    pub http_errors_total: u64,
    pub http_duration_total_ms: u64,
    pub http_duration_avg_ms: f64,
    pub runs_started_total: u64,
    pub runs_ended_total: u64,
    pub artifacts_uploaded_total: u64,
    pub skipped_inactive_total: u64,
}

/// Helper for timing HTTP requests.
pub struct HttpTimer {
    start: Instant,
    metrics: Metrics,
}

impl HttpTimer {
    /// Start timing an HTTP request.
    pub fn new(metrics: Metrics) -> Self {
        Self {
            start: Instant::now(),
            metrics,
        }
    }

    /// Complete the timing and record the duration.
    pub fn complete(self) {
        let duration = self.start.elapsed();
        self.metrics.record_http_request(duration);
    }

    /// Complete the timing and record as an error.
    pub fn complete_with_error(self) {
        let duration = self.start.elapsed();
        self.metrics.record_http_request(duration);
        self.metrics.record_http_error();
    }
}
