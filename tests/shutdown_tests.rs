//! Lifecycle of automatic replenishment.

use document_throttle::infrastructure::mocks::{MockTicker, MockTransport};
use document_throttle::{DocumentSubmitter, GateState, PermitGate, StartError};
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test(start_paused = true)]
async fn test_no_automatic_replenish_after_shutdown() {
    let gate = PermitGate::new(2, Duration::from_secs(60)).unwrap();
    gate.start_auto_replenish().unwrap();

    gate.acquire().await;
    gate.acquire().await;
    gate.shutdown().await.unwrap();

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(gate.available(), 0);
    assert_eq!(gate.metrics().replenishments(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_leaves_waiters_blocked() {
    let gate = PermitGate::new(1, Duration::from_secs(60)).unwrap();
    gate.start_auto_replenish().unwrap();
    gate.acquire().await;

    let waiter = {
        let gate = gate.clone();
        tokio::spawn(async move { gate.acquire().await })
    };
    tokio::task::yield_now().await;

    // Shutdown completes without waiting for the blocked acquirer.
    timeout(Duration::from_secs(1), gate.shutdown())
        .await
        .expect("shutdown should not wait on acquirers")
        .unwrap();

    tokio::time::sleep(Duration::from_secs(300)).await;
    assert!(!waiter.is_finished());

    // A manual replenish still releases it.
    gate.replenish();
    timeout(Duration::from_secs(1), waiter)
        .await
        .expect("waiter should proceed after manual replenish")
        .unwrap();
}

#[tokio::test]
async fn test_shutdown_is_idempotent() {
    let gate = PermitGate::new(1, Duration::from_secs(60)).unwrap();
    gate.start_auto_replenish().unwrap();

    gate.shutdown().await.unwrap();
    gate.shutdown().await.unwrap();
    gate.clone().shutdown().await.unwrap();

    assert_eq!(gate.state(), GateState::Shutdown);
    assert_eq!(gate.start_auto_replenish(), Err(StartError::ShutDown));
}

#[tokio::test]
async fn test_manual_ticks_drive_replenishment() {
    let gate = PermitGate::new(2, Duration::from_secs(3600)).unwrap();
    let (ticker, trigger) = MockTicker::new();
    gate.start_auto_replenish_with(ticker).unwrap();

    for _ in 0..3 {
        gate.acquire().await;
        gate.acquire().await;
        assert_eq!(gate.available(), 0);

        trigger.fire();
        timeout(Duration::from_secs(5), async {
            while gate.available() < 2 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("tick should replenish the gate");
    }

    gate.shutdown().await.unwrap();

    gate.acquire().await;
    trigger.fire();
    tokio::task::yield_now().await;
    assert_eq!(gate.available(), 1);
}

#[tokio::test]
async fn test_submitter_shutdown_stops_gate() {
    let (ticker, _trigger) = MockTicker::new();
    let submitter = DocumentSubmitter::builder()
        .build_with_ticker(MockTransport::new(), ticker)
        .unwrap();
    assert!(submitter.gate().is_running());

    submitter.shutdown().await.unwrap();
    assert_eq!(submitter.gate().state(), GateState::Shutdown);
}
