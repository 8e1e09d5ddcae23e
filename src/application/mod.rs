//! Application layer - orchestration of admission and submission.
//!
//! This layer coordinates the domain values and manages the runtime behavior:
//! - Permit gate (fixed-window admission)
//! - Replenisher (background timer task)
//! - Document submitter (gate + transport)
//! - Metrics
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from timer and HTTP details.

pub mod gate;
pub mod metrics;
pub mod ports;
pub mod replenisher;
pub mod submitter;
