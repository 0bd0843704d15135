//! Metrics collection and exposition.
//!
//! # Metrics
//! - `settings_reads_total` (counter): reads by outcome
//! - `settings_updates_total` (counter): updates by outcome
//! - `settings_reloads_scheduled_total` (counter): deferred reloads by reason
//! - `settings_reloads_total` (counter): reloads applied by trigger and result
//! - `settings_restart_pending` (gauge): 1 while a restart is owed

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder with its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_settings_read(outcome: &'static str) {
    metrics::counter!("settings_reads_total", "outcome" => outcome).increment(1);
}

pub fn record_settings_update(outcome: &'static str) {
    metrics::counter!("settings_updates_total", "outcome" => outcome).increment(1);
}

pub fn record_reload_scheduled(reason: &'static str) {
    metrics::counter!("settings_reloads_scheduled_total", "reason" => reason).increment(1);
}

pub fn record_reload(trigger: &'static str, success: bool) {
    let result = if success { "ok" } else { "error" };
    metrics::counter!("settings_reloads_total", "trigger" => trigger, "result" => result)
        .increment(1);
}

pub fn set_restart_pending(pending: bool) {
    metrics::gauge!("settings_restart_pending").set(if pending { 1.0 } else { 0.0 });
}
