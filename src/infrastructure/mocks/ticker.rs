//! Manually fired ticker for testing.

use crate::application::ports::Ticker;
use std::future::Future;
use tokio::sync::mpsc;

/// Ticker that completes a tick only when its trigger fires.
///
/// Lets tests drive the replenisher without waiting on any clock.
///
/// # Examples
///
/// ```
/// use document_throttle::infrastructure::mocks::MockTicker;
/// use document_throttle::PermitGate;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let gate = PermitGate::new(1, Duration::from_secs(3600)).unwrap();
/// let (ticker, trigger) = MockTicker::new();
/// gate.start_auto_replenish_with(ticker).unwrap();
///
/// gate.acquire().await;
/// assert_eq!(gate.available(), 0);
///
/// trigger.fire();
/// gate.acquire().await; // completes once the replenisher has run
///
/// gate.shutdown().await.unwrap();
/// # }
/// ```
#[derive(Debug)]
pub struct MockTicker {
    ticks: mpsc::UnboundedReceiver<()>,
}

/// Trigger paired with a `MockTicker`.
///
/// Cloneable; every clone fires the same ticker.
#[derive(Debug, Clone)]
pub struct TickTrigger {
    ticks: mpsc::UnboundedSender<()>,
}

impl MockTicker {
    /// Create a ticker and the trigger that fires it.
    pub fn new() -> (Self, TickTrigger) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { ticks: rx }, TickTrigger { ticks: tx })
    }
}

impl TickTrigger {
    /// Complete one tick.
    ///
    /// Ticks fired while the ticker is not being awaited are queued. Firing
    /// after the ticker has been dropped does nothing.
    pub fn fire(&self) {
        let _ = self.ticks.send(());
    }
}

impl Ticker for MockTicker {
    fn tick(&mut self) -> impl Future<Output = ()> + Send {
        async move {
            if self.ticks.recv().await.is_none() {
                // All triggers dropped: never tick again.
                std::future::pending::<()>().await;
            }
        }
    }
}
