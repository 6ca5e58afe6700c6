//! Reload metrics.
//!
//! # Metrics
//! - `livecfg_fetch_duration_seconds` (histogram): fetch + resolve latency by environment
//! - `livecfg_reload_total` (counter): reload attempts by environment and outcome
//! - `livecfg_snapshot_keys` (gauge): keys in the last published snapshot

use std::time::Instant;

use metrics::{counter, gauge, histogram};

use crate::model::Environment;

/// Record one fetch-and-resolve attempt.
pub fn record_fetch(environment: &Environment, start: Instant, success: bool) {
    let env = environment.name().to_string();
    histogram!("livecfg_fetch_duration_seconds", "environment" => env.clone())
        .record(start.elapsed().as_secs_f64());
    let outcome = if success { "success" } else { "failure" };
    counter!("livecfg_reload_total", "environment" => env, "outcome" => outcome).increment(1);
}

/// Record the size of a newly published snapshot.
pub fn record_snapshot_size(environment: &Environment, keys: usize) {
    let env = environment.name().to_string();
    gauge!("livecfg_snapshot_keys", "environment" => env).set(keys as f64);
}
