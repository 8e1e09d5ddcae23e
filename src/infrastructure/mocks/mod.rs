//! Mock implementations for testing.
//!
//! This module provides test doubles for infrastructure adapters,
//! enabling controlled testing of application logic.

pub mod layer;
pub mod ticker;
pub mod transport;

pub use layer::{CapturedEvent, MockCaptureLayer};
pub use ticker::{MockTicker, TickTrigger};
pub use transport::{MockTransport, RecordedRequest};
