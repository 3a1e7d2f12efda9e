//! Metrics collection for coffee-service.
//!
//! HTTP request metrics come from `service_core`'s middleware through the
//! `metrics` facade; per-operation outcomes live in a Prometheus registry.

use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{IntCounterVec, Opts, Registry};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static PROMETHEUS_REGISTRY: OnceLock<Registry> = OnceLock::new();
pub static COFFEE_OPERATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Install the Prometheus recorder and register the service counters.
/// Calling it again after a successful install is a no-op.
pub fn init_metrics() -> anyhow::Result<()> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;
    // Lost a race with another initialiser; its handle is equivalent.
    let _ = METRICS_HANDLE.set(handle);

    let registry = Registry::new();

    let operations_counter = IntCounterVec::new(
        Opts::new(
            "coffee_operations_total",
            "Coffee store operations by operation and outcome",
        ),
        &["operation", "outcome"],
    )
    .context("failed to create coffee_operations_total metric")?;

    registry
        .register(Box::new(operations_counter.clone()))
        .context("failed to register coffee_operations_total")?;

    let _ = PROMETHEUS_REGISTRY.set(registry);
    let _ = COFFEE_OPERATIONS_TOTAL.set(operations_counter);

    Ok(())
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    if let Some(registry) = PROMETHEUS_REGISTRY.get() {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).ok();
        if let Ok(custom_metrics) = String::from_utf8(buffer) {
            output.push_str(&custom_metrics);
        }
    }

    output
}

/// Count one handled store operation, e.g. `("create", "created")`.
pub fn record_operation(operation: &str, outcome: &str) {
    if let Some(counter) = COFFEE_OPERATIONS_TOTAL.get() {
        counter.with_label_values(&[operation, outcome]).inc();
    }
}
