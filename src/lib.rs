//! # document-throttle
//!
//! Fixed-window admission control for a remote document-submission endpoint.
//!
//! The crate centers on [`PermitGate`]: a concurrency-safe counter of permits
//! that callers take one at a time and that a background task resets to full
//! capacity every interval. [`DocumentSubmitter`] composes the gate with an
//! HTTP transport so that no more than `capacity` documents are posted per
//! window.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use document_throttle::{Document, DocumentSubmitter, SubmitError, WindowUnit};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // 10 documents per minute, replenished automatically
//! let submitter = DocumentSubmitter::builder()
//!     .with_capacity(10)
//!     .with_window_unit(WindowUnit::Minute)
//!     .build()?;
//!
//! let doc = Document {
//!     doc_id: Some("12345".to_string()),
//!     doc_type: Some("LP_INTRODUCE_GOODS".to_string()),
//!     ..Document::default()
//! };
//!
//! match submitter.submit(&doc, "signature").await {
//!     Ok(()) => println!("accepted"),
//!     Err(SubmitError::Rejected { status, body }) => println!("rejected ({status}): {body}"),
//!     Err(e) => return Err(e.into()),
//! }
//!
//! submitter.shutdown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Fixed Windows
//!
//! Capacity is restored all at once at the start of every window. There is
//! no smoothing: a burst of `capacity` requests right before a reset can be
//! followed by another `capacity` right after it. The reset always *sets* the
//! count to `capacity`; it never adds back a computed delta, so acquisitions
//! racing with a reset cannot push the count past `capacity`.
//!
//! ## Using the Gate Directly
//!
//! ```rust,no_run
//! use document_throttle::PermitGate;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let gate = PermitGate::new(5, Duration::from_secs(1)).unwrap();
//! gate.start_auto_replenish().unwrap();
//!
//! for _ in 0..20 {
//!     gate.acquire().await;
//!     // at most 5 iterations per second reach this point
//! }
//!
//! gate.shutdown().await.unwrap();
//! # }
//! ```
//!
//! ## Cancellation
//!
//! `acquire` has no deadline of its own. Bound it with `tokio::time::timeout`
//! or race it in `tokio::select!`; a dropped acquire never consumes a permit.
//! [`DocumentSubmitter::submit_or_cancel`] does the racing for you and reports
//! [`SubmitError::Cancelled`].
//!
//! ## Shutdown
//!
//! `shutdown` stops automatic replenishment and is safe to call repeatedly.
//! It does **not** wake callers already waiting for a permit: they stay
//! suspended until `replenish` is called manually or they cancel.
//!
//! ## Observability
//!
//! Gate and submitter share a [`Metrics`] tracker:
//!
//! ```rust,no_run
//! # use document_throttle::PermitGate;
//! # use std::time::Duration;
//! # let gate = PermitGate::new(5, Duration::from_secs(1)).unwrap();
//! let snapshot = gate.metrics().snapshot();
//! println!("permits granted: {}", snapshot.permits_granted);
//! println!("rejection rate: {:.2}%", snapshot.rejection_rate() * 100.0);
//! ```
//!
//! Events are logged through `tracing`; install any subscriber to see them.

// Domain layer - pure values
pub mod domain;

// Application layer - gate, replenisher, submitter
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

pub use domain::{
    document::{Description, Document, Product},
    window::{GateConfigError, Window, WindowUnit},
};

pub use application::{
    gate::{GateState, PermitGate, StartError},
    metrics::{Metrics, MetricsSnapshot},
    ports::{RemoteResponse, Ticker, Transport, TransportError, TransportErrorKind},
    replenisher::{IntervalTicker, ShutdownError},
    submitter::{DocumentSubmitter, SubmitError},
};

pub use infrastructure::{
    builder::{BuildError, SubmitterBuilder, DEFAULT_CAPACITY, DEFAULT_ENDPOINT, DEFAULT_INTERVAL},
    http::{ReqwestTransport, SignaturePlacement},
};
