//! Fixed-window permit gate.
//!
//! The gate hands out at most `capacity` permits between two replenishes.
//! Acquirers that find it exhausted wait until the next replenish, which
//! resets the count straight to `capacity` and wakes every waiter so each can
//! retry. Permits are never returned individually.
//!
//! # Concurrency
//!
//! `available` lives behind a single mutex and is only touched by
//! `try_take` (decrement by one) and `replenish` (set to capacity). Waiters
//! register with the `Notify` before checking the count, so a replenish that
//! lands between the check and the await still wakes them. The decrement
//! happens in the same poll that returns, so dropping an `acquire` future at
//! any await point leaves the count untouched.
//!
//! # Liveness caveat
//!
//! `shutdown` stops automatic replenishment but does not wake waiters. A
//! caller suspended in `acquire` at that point stays suspended until someone
//! calls `replenish` or the caller cancels its own wait.

use crate::application::metrics::Metrics;
use crate::application::ports::Ticker;
use crate::application::replenisher::{
    IntervalTicker, Replenisher, ReplenisherHandle, ShutdownError,
};
use crate::domain::window::{GateConfigError, Window, WindowUnit};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, trace};

/// Error returned when automatic replenishment cannot be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    /// Automatic replenishment is already running
    AlreadyRunning,
    /// The gate has been shut down
    ShutDown,
    /// Not called from within a tokio runtime
    NoRuntime,
}

impl std::fmt::Display for StartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartError::AlreadyRunning => write!(f, "automatic replenishment already running"),
            StartError::ShutDown => write!(f, "gate has been shut down"),
            StartError::NoRuntime => write!(f, "no tokio runtime available to spawn replenisher"),
        }
    }
}

impl std::error::Error for StartError {}

/// Lifecycle state of a gate's automatic replenishment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Constructed, no timer running
    Created,
    /// Background replenisher active
    Running,
    /// Timer stopped for good
    Shutdown,
}

#[derive(Debug)]
enum Lifecycle {
    Created,
    Running(ReplenisherHandle),
    Shutdown,
}

/// State shared between gate handles and the replenisher task.
#[derive(Debug)]
pub(crate) struct GateCore {
    window: Window,
    available: Mutex<usize>,
    notify: Notify,
    metrics: Metrics,
}

impl GateCore {
    pub(crate) fn new(window: Window, metrics: Metrics) -> Self {
        Self {
            window,
            available: Mutex::new(window.capacity()),
            notify: Notify::new(),
            metrics,
        }
    }

    pub(crate) fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    // Nothing panics while the lock is held, so a poisoned lock still holds a valid count.
    fn lock_available(&self) -> MutexGuard<'_, usize> {
        self.available
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn try_take(&self) -> bool {
        {
            let mut available = self.lock_available();
            if *available == 0 {
                return false;
            }
            *available -= 1;
        }
        self.metrics.record_granted();
        true
    }

    pub(crate) fn replenish(&self) {
        let capacity = self.window.capacity();
        let previous = {
            let mut available = self.lock_available();
            std::mem::replace(&mut *available, capacity)
        };
        self.metrics.record_replenish();
        self.notify.notify_waiters();

        trace!(capacity, restored = capacity - previous, "permits replenished");
    }
}

/// Concurrency-safe fixed-window permit gate.
///
/// Cloning is cheap; all clones share the same permits and lifecycle.
///
/// # Example
/// ```no_run
/// use document_throttle::PermitGate;
/// use std::time::Duration;
///
/// # async fn example() {
/// let gate = PermitGate::new(10, Duration::from_secs(60)).unwrap();
/// gate.start_auto_replenish().unwrap();
///
/// gate.acquire().await; // one of ten permits for this minute
///
/// gate.shutdown().await.unwrap();
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PermitGate {
    core: Arc<GateCore>,
    lifecycle: Arc<Mutex<Lifecycle>>,
}

impl PermitGate {
    /// Create a gate with `capacity` permits per `interval`.
    ///
    /// The gate starts full. Automatic replenishment is not running until
    /// `start_auto_replenish` is called.
    ///
    /// # Errors
    /// Returns `GateConfigError` if `capacity` is 0 or `interval` is zero.
    pub fn new(capacity: usize, interval: Duration) -> Result<Self, GateConfigError> {
        Ok(Self::from_window(Window::new(capacity, interval)?))
    }

    /// Create a gate with `capacity` permits per one `unit` of time.
    ///
    /// # Errors
    /// Returns `GateConfigError::ZeroCapacity` if `capacity` is 0.
    pub fn per_unit(capacity: usize, unit: WindowUnit) -> Result<Self, GateConfigError> {
        Ok(Self::from_window(Window::per_unit(capacity, unit)?))
    }

    /// Create a gate from validated window parameters.
    pub fn from_window(window: Window) -> Self {
        Self::with_metrics(window, Metrics::new())
    }

    /// Create a gate that records into an existing metrics tracker.
    pub fn with_metrics(window: Window, metrics: Metrics) -> Self {
        Self {
            core: Arc::new(GateCore::new(window, metrics)),
            lifecycle: Arc::new(Mutex::new(Lifecycle::Created)),
        }
    }

    /// Wait for a permit and consume it.
    ///
    /// Returns immediately while permits remain in the current window;
    /// otherwise waits for the next replenish. There is no built-in deadline.
    /// Wrap the call in `tokio::time::timeout` or `tokio::select!` to bound
    /// it; dropping the future never consumes a permit.
    pub async fn acquire(&self) {
        if self.core.try_take() {
            return;
        }

        self.core.metrics.record_waited();
        debug!(
            capacity = self.core.window.capacity(),
            "permits exhausted, waiting for replenish"
        );

        loop {
            let notified = self.core.notify.notified();
            let mut notified = std::pin::pin!(notified);
            notified.as_mut().enable();

            if self.core.try_take() {
                return;
            }

            notified.await;
        }
    }

    /// Consume a permit if one is available, without waiting.
    pub fn try_acquire(&self) -> bool {
        self.core.try_take()
    }

    /// Reset the available permits to full capacity and wake all waiters.
    ///
    /// Calling this on a full gate has no observable effect beyond metrics.
    pub fn replenish(&self) {
        self.core.replenish();
    }

    /// Start replenishing every `interval` on a tokio task.
    ///
    /// The first replenish happens one full interval after this call.
    ///
    /// # Errors
    /// See [`StartError`].
    pub fn start_auto_replenish(&self) -> Result<(), StartError> {
        // The ticker reads the clock at construction, so check for a runtime first.
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(StartError::NoRuntime);
        }
        self.start_auto_replenish_with(IntervalTicker::new(self.core.window.interval()))
    }

    /// Start replenishing on every tick of `ticker`.
    ///
    /// # Errors
    /// See [`StartError`].
    pub fn start_auto_replenish_with<T: Ticker>(&self, ticker: T) -> Result<(), StartError> {
        let mut lifecycle = self.lock_lifecycle();
        match *lifecycle {
            Lifecycle::Running(_) => return Err(StartError::AlreadyRunning),
            Lifecycle::Shutdown => return Err(StartError::ShutDown),
            Lifecycle::Created => {}
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| StartError::NoRuntime)?;
        let handle = Replenisher::new(ticker).start(&runtime, Arc::clone(&self.core));
        *lifecycle = Lifecycle::Running(handle);
        Ok(())
    }

    /// Stop automatic replenishment.
    ///
    /// The stop signal is sent before the lifecycle lock is released, so once
    /// any call returns no further tick replenishes. The caller that stopped
    /// the task also waits for it to exit; concurrent and later calls return
    /// as soon as the stop has been signalled. Callers already waiting in
    /// `acquire` are not woken.
    ///
    /// # Errors
    /// Returns `ShutdownError` if the replenisher task panicked or was cancelled.
    pub async fn shutdown(&self) -> Result<(), ShutdownError> {
        let stopping = {
            let mut lifecycle = self.lock_lifecycle();
            match std::mem::replace(&mut *lifecycle, Lifecycle::Shutdown) {
                Lifecycle::Running(handle) => Some(handle.stop()),
                Lifecycle::Created | Lifecycle::Shutdown => None,
            }
        };

        if let Some(stopping) = stopping {
            stopping.join().await?;
        }
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> GateState {
        match *self.lock_lifecycle() {
            Lifecycle::Created => GateState::Created,
            Lifecycle::Running(_) => GateState::Running,
            Lifecycle::Shutdown => GateState::Shutdown,
        }
    }

    /// Whether automatic replenishment is active.
    pub fn is_running(&self) -> bool {
        self.state() == GateState::Running
    }

    /// Permits available right now.
    pub fn available(&self) -> usize {
        *self.core.lock_available()
    }

    /// Permits restored by each replenish.
    pub fn capacity(&self) -> usize {
        self.core.window.capacity()
    }

    /// Length of each window.
    pub fn interval(&self) -> Duration {
        self.core.window.interval()
    }

    /// Window parameters.
    pub fn window(&self) -> Window {
        self.core.window
    }

    /// Get a reference to the metrics tracker.
    pub fn metrics(&self) -> &Metrics {
        &self.core.metrics
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
