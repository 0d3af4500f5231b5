// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{
    gather_metrics, API_CALLS, API_DURATION, GATE_ADMISSIONS, GATE_CHARACTERS, GATE_WAIT,
    OAUTH_REFRESHES, REGISTRY,
};

use crate::ratelimit::{GateEvent, GateObserver};

/// Helper to record Google API call metrics
pub fn record_api_call(service: &str, status_code: u16, duration_secs: f64) {
    API_CALLS
        .with_label_values(&[service, &status_code.to_string()])
        .inc();

    API_DURATION
        .with_label_values(&[service])
        .observe(duration_secs);
}

/// Helper to record OAuth metrics
pub fn record_oauth_refresh(success: bool) {
    let status = if success { "success" } else { "failure" };
    OAUTH_REFRESHES.with_label_values(&[status]).inc();
}

/// Feeds rate gate events into the Prometheus registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsObserver;

impl GateObserver for MetricsObserver {
    fn on_event(&self, event: &GateEvent) {
        GATE_ADMISSIONS.with_label_values(&[event.reason()]).inc();

        match event {
            GateEvent::Admitted { characters, .. } => {
                GATE_CHARACTERS
                    .with_label_values(&["characters"])
                    .inc_by(*characters as f64);
            }
            GateEvent::WindowReset { characters, waited } => {
                GATE_CHARACTERS
                    .with_label_values(&["characters"])
                    .inc_by(*characters as f64);
                if !waited.is_zero() {
                    GATE_WAIT
                        .with_label_values(&["characters"])
                        .observe(waited.as_secs_f64());
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_observer_counts_outcomes() {
        let before = GATE_ADMISSIONS.with_label_values(&["throttled"]).get();

        MetricsObserver.on_event(&GateEvent::Throttled {
            accumulated: 120,
            wait: Duration::from_secs(3),
        });

        let after = GATE_ADMISSIONS.with_label_values(&["throttled"]).get();
        assert_eq!(after - before, 1.0);
    }

    #[test]
    fn test_throttled_request_characters_counted_on_reset() {
        let characters = GATE_CHARACTERS.with_label_values(&["characters"]);
        let before = characters.get();

        MetricsObserver.on_event(&GateEvent::Throttled {
            accumulated: 150,
            wait: Duration::from_secs(10),
        });
        MetricsObserver.on_event(&GateEvent::WindowReset {
            characters: 150,
            waited: Duration::from_secs(10),
        });

        assert_eq!(characters.get() - before, 150.0);
    }

    #[test]
    fn test_record_api_call() {
        let before = API_CALLS.with_label_values(&["speech", "503"]).get();
        record_api_call("speech", 503, 0.2);
        assert_eq!(API_CALLS.with_label_values(&["speech", "503"]).get() - before, 1.0);
    }
}
