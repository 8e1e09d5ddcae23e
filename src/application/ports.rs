//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use std::fmt::Debug;
use std::future::Future;

/// Port for the replenishment timer.
///
/// Each completed `tick` triggers one replenish of the gate. Infrastructure
/// provides `IntervalTicker` (tokio interval) for production and
/// `MockTicker` for tests that need to fire replenishments by hand.
pub trait Ticker: Send + 'static {
    /// Wait for the next tick.
    ///
    /// Must be cancel safe: the replenisher races it against its stop signal.
    fn tick(&mut self) -> impl Future<Output = ()> + Send;
}

/// Response returned by the remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl RemoteResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Status 200 is the only accepted outcome.
    pub fn is_accepted(&self) -> bool {
        self.status == 200
    }
}

/// Broad classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Could not establish a connection
    Connect,
    /// The request or response timed out
    Timeout,
    /// The request could not be built or sent
    Request,
    /// The response body could not be read
    Body,
}

/// Network-level failure while sending a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
}

impl TransportError {
    /// Create a transport error.
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Failure classification.
    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// Underlying error description.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Request => "request",
            TransportErrorKind::Body => "body",
        };
        write!(f, "{} error: {}", kind, self.message)
    }
}

impl std::error::Error for TransportError {}

/// Port for delivering a serialized document.
///
/// The transport owns every wire detail beyond the JSON body: endpoint,
/// headers, timeouts, and where (if anywhere) the signature goes.
/// Infrastructure provides `ReqwestTransport` and `MockTransport`.
pub trait Transport: Send + Sync + Debug + 'static {
    /// Send one request carrying `body` and return the remote response.
    ///
    /// # Arguments
    /// * `body` - Serialized document (JSON)
    /// * `signature` - Caller-supplied document signature
    ///
    /// # Errors
    /// Returns `TransportError` if no response could be obtained.
    fn send(
        &self,
        body: String,
        signature: &str,
    ) -> impl Future<Output = Result<RemoteResponse, TransportError>> + Send;
}
