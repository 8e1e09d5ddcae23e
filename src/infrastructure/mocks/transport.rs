//! Scripted transport for testing.

use crate::application::ports::{RemoteResponse, Transport, TransportError};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A request captured by `MockTransport`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct RecordedRequest {
    pub body: String,
    pub signature: String,
}

/// Transport that records requests and replays scripted outcomes.
///
/// Outcomes are consumed in the order they were pushed; once the script is
/// empty every request is answered with status 200. Clones share the script
/// and the recorded requests.
///
/// # Examples
///
/// ```
/// use document_throttle::infrastructure::mocks::MockTransport;
/// use document_throttle::{Document, DocumentSubmitter, PermitGate, RemoteResponse, SubmitError};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let transport = MockTransport::new();
/// transport.push_response(RemoteResponse::new(500, "quota exceeded"));
///
/// let gate = PermitGate::new(5, Duration::from_secs(60)).unwrap();
/// let submitter = DocumentSubmitter::new(gate, transport.clone());
///
/// let result = submitter.submit(&Document::default(), "sig").await;
/// assert!(matches!(result, Err(SubmitError::Rejected { status: 500, .. })));
/// assert_eq!(transport.requests().len(), 1);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockState>>,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct MockState {
    script: VecDeque<Result<RemoteResponse, TransportError>>,
    requests: Vec<RecordedRequest>,
}

impl MockTransport {
    /// Create a transport that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response by `delay` (uses tokio time, so it honors paused clocks).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a response.
    pub fn push_response(&self, response: RemoteResponse) {
        self.lock().script.push_back(Ok(response));
    }

    /// Queue a transport failure.
    pub fn push_error(&self, error: TransportError) {
        self.lock().script.push_back(Err(error));
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner
            .lock()
            .expect("MockTransport mutex poisoned - a test thread panicked while holding the lock")
    }
}

impl Transport for MockTransport {
    fn send(
        &self,
        body: String,
        signature: &str,
    ) -> impl Future<Output = Result<RemoteResponse, TransportError>> + Send {
        let outcome = {
            let mut state = self.lock();
            state.requests.push(RecordedRequest {
                body,
                signature: signature.to_string(),
            });
            state
                .script
                .pop_front()
                .unwrap_or_else(|| Ok(RemoteResponse::new(200, "")))
        };
        let delay = self.delay;

        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            outcome
        }
    }
}
