// Prometheus metrics registry and collectors
// Author: kelexine (https://github.com/kelexine)

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec,
    Encoder, HistogramVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // RATE GATE METRICS
    // ============================================================================

    /// Gate decisions
    pub static ref GATE_ADMISSIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("gate_admissions_total", "Total rate gate decisions"),
        &["outcome"], // outcome: admitted, throttled, window_reset, cancelled
        REGISTRY
    ).unwrap();

    /// Time callers spent blocked on the character quota
    pub static ref GATE_WAIT: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("gate_wait_seconds", "Time spent waiting for the quota window")
            .buckets(vec![0.1, 1.0, 5.0, 10.0, 30.0, 60.0, 100.0, 300.0]),
        &["limit"], // limit: characters
        REGISTRY
    ).unwrap();

    /// Characters admitted through the gate
    pub static ref GATE_CHARACTERS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("gate_characters_total", "Total characters admitted through the rate gate"),
        &["limit"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // GOOGLE API METRICS
    // ============================================================================

    /// Total Google API calls
    pub static ref API_CALLS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("api_calls_total", "Total Google API calls"),
        &["service", "status_code"],
        REGISTRY
    ).unwrap();

    /// Google API call duration
    pub static ref API_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("api_duration_seconds", "Google API call duration")
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // OAUTH METRICS
    // ============================================================================

    /// OAuth token refresh events
    pub static ref OAUTH_REFRESHES: CounterVec = register_counter_vec_with_registry!(
        Opts::new("oauth_refreshes_total", "Total OAuth token refreshes"),
        &["status"], // status: success, failure
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        GATE_ADMISSIONS.with_label_values(&["admitted"]).inc();
        API_CALLS.with_label_values(&["translate", "200"]).inc();

        let metrics = gather_metrics();
        assert!(metrics.contains("gate_admissions_total"));
        assert!(metrics.contains("api_calls_total"));
    }
}
