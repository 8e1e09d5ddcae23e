//! Background replenishment of a permit gate.
//!
//! The replenisher is an explicitly owned tokio task. It waits on a `Ticker`
//! and resets the gate on every tick until it receives a stop signal or its
//! handle is dropped.

use crate::application::gate::GateCore;
use crate::application::ports::Ticker;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::info;

/// Error returned when the replenisher task does not stop cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownError {
    /// The replenisher task panicked
    TaskPanicked,
    /// The replenisher task was cancelled by the runtime
    TaskCancelled,
}

impl std::fmt::Display for ShutdownError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownError::TaskPanicked => write!(f, "replenisher task panicked"),
            ShutdownError::TaskCancelled => write!(f, "replenisher task was cancelled"),
        }
    }
}

impl std::error::Error for ShutdownError {}

/// Production ticker backed by `tokio::time::Interval`.
///
/// The first tick completes one full period after construction, not
/// immediately. Missed ticks are skipped rather than replayed in a burst.
/// A period too long for the clock to represent never ticks.
#[derive(Debug)]
pub struct IntervalTicker {
    period: Duration,
    first: Option<Instant>,
    interval: Option<Interval>,
}

impl IntervalTicker {
    /// Create a ticker firing every `period`, starting one period from now.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            first: Instant::now()
                .checked_add(period)
                .filter(|first| first.checked_add(period).is_some()),
            interval: None,
        }
    }

    /// Tick period.
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Ticker for IntervalTicker {
    fn tick(&mut self) -> impl Future<Output = ()> + Send {
        async move {
            let Some(first) = self.first else {
                return std::future::pending::<()>().await;
            };

            // Created lazily so that construction does not need a runtime.
            let period = self.period;
            let interval = self.interval.get_or_insert_with(|| {
                let mut interval = interval_at(first, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                interval
            });
            interval.tick().await;
        }
    }
}

/// Drives `replenish` from a ticker on a background task.
pub(crate) struct Replenisher<T: Ticker> {
    ticker: T,
}

impl<T: Ticker> Replenisher<T> {
    pub(crate) fn new(ticker: T) -> Self {
        Self { ticker }
    }

    /// Spawn the task on `runtime`.
    ///
    /// The task holds only the shared core; it exits when stopped through the
    /// returned handle or when the handle is dropped.
    pub(crate) fn start(self, runtime: &Handle, core: Arc<GateCore>) -> ReplenisherHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let mut ticker = self.ticker;

        let join = runtime.spawn(async move {
            info!("replenisher started");
            loop {
                tokio::select! {
                    biased;
                    // Fires on an explicit stop and when the handle is dropped.
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => core.replenish(),
                }
            }
            info!("replenisher stopped");
        });

        ReplenisherHandle {
            stop: stop_tx,
            join,
        }
    }
}

/// Handle owning the replenisher task.
#[derive(Debug)]
pub(crate) struct ReplenisherHandle {
    stop: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl ReplenisherHandle {
    /// Signal the task to stop without waiting for it to exit.
    ///
    /// The task checks the stop signal before every tick, so no tick seen
    /// after this call replenishes.
    pub(crate) fn stop(self) -> StoppingReplenisher {
        // The task may already be gone; the join reports why.
        let _ = self.stop.send(());
        StoppingReplenisher { join: self.join }
    }

    /// Signal the task to stop and wait for it to exit.
    pub(crate) async fn shutdown(self) -> Result<(), ShutdownError> {
        self.stop().join().await
    }
}

/// A replenisher task that has been told to stop.
#[derive(Debug)]
pub(crate) struct StoppingReplenisher {
    join: JoinHandle<()>,
}

impl StoppingReplenisher {
    /// Wait for the task to exit.
    pub(crate) async fn join(self) -> Result<(), ShutdownError> {
        match self.join.await {
            Ok(()) => Ok(()),
            Err(e) if e.is_panic() => Err(ShutdownError::TaskPanicked),
            Err(_) => Err(ShutdownError::TaskCancelled),
        }
    }
}
