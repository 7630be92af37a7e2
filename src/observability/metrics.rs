//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_decisions_total` (counter): decisions by tenant and kind
//! - `gateway_identity_calls_total` (counter): identity calls by op and outcome
//! - `gateway_identity_call_duration_seconds` (histogram): identity latency
//! - `gateway_upstream_requests_total` (counter): forwarded requests by status
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exporter runs its own HTTP listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_decision(tenant: &'static str, decision: &'static str) {
    metrics::counter!(
        "gateway_decisions_total",
        "tenant" => tenant,
        "decision" => decision
    )
    .increment(1);
}

pub fn record_identity_call(op: &'static str, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "gateway_identity_calls_total",
        "op" => op,
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("gateway_identity_call_duration_seconds", "op" => op)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream(status: u16) {
    metrics::counter!("gateway_upstream_requests_total", "status" => status.to_string())
        .increment(1);
}
