//! Infrastructure layer - external adapters and integrations.
//!
//! This layer provides adapters for:
//! - HTTP delivery (reqwest)
//! - The builder that wires gate, replenisher and transport together

pub mod builder;
pub mod http;

/// Mock implementations for testing.
///
/// This module is only available when the `test-helpers` feature is enabled,
/// or during test builds. It provides controllable test doubles for the
/// timer and transport ports, plus a log capturing layer.
///
/// To use these mocks in integration tests, add to your `Cargo.toml`:
/// ```toml
/// [dev-dependencies]
/// document-throttle = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
