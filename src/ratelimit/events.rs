// Rate gate observability hooks
// Author: kelexine (https://github.com/kelexine)

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A state change inside [`super::RateGate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateEvent {
    /// Request fit in the current window.
    Admitted { characters: u64, accumulated: u64 },
    /// Window is over its character limit; the caller is about to wait.
    Throttled { accumulated: u64, wait: Duration },
    /// The window elapsed and the counters were cleared. `characters` is the
    /// request admitted by the reset; zero for a manual reset.
    WindowReset { characters: u64, waited: Duration },
    /// A throttled caller gave up before the window elapsed.
    Cancelled { accumulated: u64 },
}

impl GateEvent {
    pub fn reason(&self) -> &'static str {
        match self {
            GateEvent::Admitted { .. } => "admitted",
            GateEvent::Throttled { .. } => "throttled",
            GateEvent::WindowReset { .. } => "window_reset",
            GateEvent::Cancelled { .. } => "cancelled",
        }
    }
}

/// Receives gate events. Called while the gate lock is held, so keep it cheap.
pub trait GateObserver: Send + Sync {
    fn on_event(&self, event: &GateEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl GateObserver for NoopObserver {
    fn on_event(&self, _event: &GateEvent) {}
}

/// Writes gate events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl GateObserver for TracingObserver {
    fn on_event(&self, event: &GateEvent) {
        match event {
            GateEvent::Admitted {
                characters,
                accumulated,
            } => {
                debug!(
                    reason = event.reason(),
                    characters, accumulated, "Request admitted"
                );
            }
            GateEvent::Throttled { accumulated, wait } => {
                info!(
                    reason = event.reason(),
                    accumulated,
                    wait_ms = wait.as_millis() as u64,
                    "Character quota reached, waiting for window to elapse"
                );
            }
            GateEvent::WindowReset { characters, waited } => {
                info!(
                    reason = event.reason(),
                    characters,
                    waited_ms = waited.as_millis() as u64,
                    "Quota window reset"
                );
            }
            GateEvent::Cancelled { accumulated } => {
                warn!(reason = event.reason(), accumulated, "Quota wait cancelled");
            }
        }
    }
}

/// Forwards each event to every observer in order.
impl GateObserver for Vec<Arc<dyn GateObserver>> {
    fn on_event(&self, event: &GateEvent) {
        for observer in self {
            observer.on_event(event);
        }
    }
}
