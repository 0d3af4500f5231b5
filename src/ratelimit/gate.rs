//! Client-side character quota gate.
//!
//! Google meters the Translation API by characters per rolling window and
//! answers with HTTP 429 once the quota is spent. `RateGate` keeps callers
//! under that limit by holding them back instead of letting the request fail:
//! every admitted request first sleeps a fixed per-request pause, then adds its
//! character count to the shared [`QuotaWindow`]. When the window goes over
//! `character_limit`, the caller waits until `delay_limit_seconds` have passed
//! since the window opened, and the window is cleared.
//!
//! The window lock is held across the wait, so concurrent callers queue behind
//! a throttled one and see the fresh window once it resets.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use super::events::{GateEvent, GateObserver, TracingObserver};
use super::window::QuotaWindow;
use crate::config::RateGateConfig;
use crate::error::{Error, Result};
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};

/// Point-in-time view of the gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaSnapshot {
    pub accumulated_characters: u64,
    pub window_elapsed: Duration,
    pub over_limit: bool,
}

/// Shared, cloneable quota gate. Clones share one window.
#[derive(Clone)]
pub struct RateGate {
    inner: Arc<Inner>,
}

struct Inner {
    config: RateGateConfig,
    /// FIFO admission queue, held by an admitter for the whole throttle wait.
    queue: Mutex<()>,
    /// Only ever locked for a read-modify-write, never across an await.
    window: StdMutex<QuotaWindow>,
    observer: Arc<dyn GateObserver>,
}

impl Inner {
    fn window(&self) -> MutexGuard<'_, QuotaWindow> {
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RateGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateGate")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl RateGate {
    /// Creates a gate that reports to the tracing subscriber.
    pub fn new(config: RateGateConfig) -> Self {
        Self::with_observer(config, Arc::new(TracingObserver))
    }

    pub fn with_observer(config: RateGateConfig, observer: Arc<dyn GateObserver>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                queue: Mutex::new(()),
                window: StdMutex::new(QuotaWindow::new(Instant::now())),
                observer,
            }),
        }
    }

    pub fn config(&self) -> &RateGateConfig {
        &self.inner.config
    }

    /// Sleeps the fixed per-request pause. Used directly by calls that carry
    /// no characters.
    pub async fn pace(&self) {
        let delay = self.inner.config.per_request_delay();
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }

    /// Admits a request of `characters` characters, waiting if the window is
    /// over its limit.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` for a negative count. The window is left
    /// untouched in that case.
    pub async fn admit(&self, characters: i64) -> Result<()> {
        self.run(characters, None, std::future::pending()).await
    }

    /// Like [`RateGate::admit`], with the caller's notion of the current time
    /// used for the first elapsed-time check.
    pub async fn admit_at(&self, characters: i64, now: Instant) -> Result<()> {
        self.run(characters, Some(now), std::future::pending()).await
    }

    /// Like [`RateGate::admit`], but gives up with `Error::Cancelled` as soon
    /// as `cancel` completes, whether the caller is still pacing, queued
    /// behind another admitter or waiting for the window.
    ///
    /// Characters recorded before cancellation stay recorded. A caller
    /// cancelled before reaching the window records nothing.
    pub async fn admit_until<F>(&self, characters: i64, cancel: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.run(characters, None, cancel).await
    }

    /// Never waits on a throttled admitter.
    pub async fn snapshot(&self) -> QuotaSnapshot {
        let window = self.inner.window();
        QuotaSnapshot {
            accumulated_characters: window.accumulated_characters(),
            window_elapsed: window.elapsed(Instant::now()),
            over_limit: window.is_over(self.inner.config.character_limit),
        }
    }

    /// Clears the window immediately. A throttled admitter sees the cleared
    /// window on its next check and proceeds.
    pub async fn reset(&self) {
        self.inner.window().reset(Instant::now());
        self.inner.observer.on_event(&GateEvent::WindowReset {
            characters: 0,
            waited: Duration::ZERO,
        });
    }

    async fn run<F>(&self, characters: i64, now: Option<Instant>, cancel: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let characters = u64::try_from(characters).map_err(|_| {
            Error::InvalidArgument(format!(
                "character count must be non-negative, got {}",
                characters
            ))
        })?;

        let config = &self.inner.config;
        let observer = &self.inner.observer;
        tokio::pin!(cancel);

        tokio::select! {
            _ = self.pace() => {}
            _ = &mut cancel => return Err(self.cancelled()),
        }
        let _turn = tokio::select! {
            turn = self.inner.queue.lock() => turn,
            _ = &mut cancel => return Err(self.cancelled()),
        };

        let now = now.unwrap_or_else(Instant::now);
        let (accumulated, over, wait) = {
            let mut window = self.inner.window();
            let accumulated = window.record(characters);
            (
                accumulated,
                window.is_over(config.character_limit),
                window.remaining(now, config.delay_limit()),
            )
        };
        if !over {
            observer.on_event(&GateEvent::Admitted {
                characters,
                accumulated,
            });
            return Ok(());
        }

        observer.on_event(&GateEvent::Throttled { accumulated, wait });

        let poll_interval = config.poll_interval();
        let wait_started = Instant::now();
        let mut remaining = wait;
        while !remaining.is_zero() {
            let step = if poll_interval.is_zero() {
                remaining
            } else {
                remaining.min(poll_interval)
            };

            tokio::select! {
                _ = sleep(step) => {}
                _ = &mut cancel => return Err(self.cancelled()),
            }

            let (over, accumulated, left) = {
                let window = self.inner.window();
                (
                    window.is_over(config.character_limit),
                    window.accumulated_characters(),
                    window.remaining(Instant::now(), config.delay_limit()),
                )
            };
            if !over {
                // reset by hand while we slept
                observer.on_event(&GateEvent::Admitted {
                    characters,
                    accumulated,
                });
                return Ok(());
            }
            remaining = left;
        }

        let reset_at = Instant::now();
        self.inner.window().reset(reset_at);
        observer.on_event(&GateEvent::WindowReset {
            characters,
            waited: reset_at.saturating_duration_since(wait_started),
        });
        Ok(())
    }

    fn cancelled(&self) -> Error {
        let accumulated = self.inner.window().accumulated_characters();
        self.inner
            .observer
            .on_event(&GateEvent::Cancelled { accumulated });
        Error::Cancelled
    }
}
