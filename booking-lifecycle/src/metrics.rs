//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `booking_operations_total{operation,outcome}` - Invocations by outcome
//!   (`ok` or the error kind)
//! - `booking_operation_duration_seconds{operation}` - Invocation latency

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Invocations by operation and outcome
    pub operations_total: IntCounterVec,

    /// Invocation latency
    pub operation_duration: HistogramVec,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let operations_total = IntCounterVec::new(
            Opts::new("booking_operations_total", "Booking invocations by outcome"),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "booking_operation_duration_seconds",
                "Booking invocation latency",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.010, 0.050, 0.100, 0.500, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self {
            operations_total,
            operation_duration,
            registry,
        })
    }

    /// Record one invocation
    pub fn record(&self, operation: &str, outcome: &str, elapsed: Duration) {
        self.operations_total
            .with_label_values(&[operation, outcome])
            .inc();
        self.operation_duration
            .with_label_values(&[operation])
            .observe(elapsed.as_secs_f64());
    }

    /// Invocations seen for a label pair
    pub fn count(&self, operation: &str, outcome: &str) -> u64 {
        self.operations_total
            .with_label_values(&[operation, outcome])
            .get()
    }

    /// Prometheus text exposition
    pub fn render(&self) -> prometheus::Result<String> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}
