//! Rate-limited document submission.
//!
//! Every submission takes one permit from the gate before anything is sent.
//! The permit is consumed whatever the remote outcome; there are no retries.

use crate::application::gate::PermitGate;
use crate::application::metrics::Metrics;
use crate::application::ports::{Transport, TransportError};
use crate::application::replenisher::ShutdownError;
use crate::domain::document::Document;

use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Error returned when a submission does not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The request could not be delivered
    Transport(TransportError),
    /// The endpoint answered with a status other than 200
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body, kept as diagnostic text
        body: String,
    },
    /// The caller abandoned the submission
    Cancelled,
    /// The document could not be serialized
    Encode(String),
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::Transport(e) => write!(f, "failed to send document: {}", e),
            SubmitError::Rejected { status, body } => {
                write!(f, "document rejected with status {}: {}", status, body)
            }
            SubmitError::Cancelled => write!(f, "submission cancelled"),
            SubmitError::Encode(e) => write!(f, "failed to serialize document: {}", e),
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmitError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TransportError> for SubmitError {
    fn from(e: TransportError) -> Self {
        SubmitError::Transport(e)
    }
}

/// Submits documents through a permit gate.
///
/// Generic over the transport so tests can swap in a scripted one. Cloning
/// shares both the gate and the transport.
#[derive(Debug)]
pub struct DocumentSubmitter<T>
where
    T: Transport,
{
    gate: PermitGate,
    transport: Arc<T>,
}

impl<T> Clone for DocumentSubmitter<T>
where
    T: Transport,
{
    fn clone(&self) -> Self {
        Self {
            gate: self.gate.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T> DocumentSubmitter<T>
where
    T: Transport,
{
    /// Create a submitter from a gate and a transport.
    ///
    /// The gate's lifecycle is left as is; start automatic replenishment on
    /// it separately if needed.
    pub fn new(gate: PermitGate, transport: T) -> Self {
        Self {
            gate,
            transport: Arc::new(transport),
        }
    }

    /// Submit one document.
    ///
    /// Waits for a permit (at most one window when the gate is replenished
    /// automatically), serializes the document, and sends it once.
    ///
    /// # Errors
    /// Returns `SubmitError::Rejected` for any status other than 200,
    /// `SubmitError::Transport` if no response arrived, and
    /// `SubmitError::Encode` if serialization failed.
    pub async fn submit(&self, document: &Document, signature: &str) -> Result<(), SubmitError> {
        self.submit_or_cancel(document, signature, std::future::pending())
            .await
    }

    /// Submit one document unless `cancel` completes first.
    ///
    /// Cancelling while waiting for a permit leaves the gate untouched.
    /// Cancelling during the send drops the in-flight request; the permit
    /// already taken stays consumed.
    ///
    /// # Errors
    /// As [`submit`](Self::submit), plus `SubmitError::Cancelled`.
    pub async fn submit_or_cancel<C>(
        &self,
        document: &Document,
        signature: &str,
        cancel: C,
    ) -> Result<(), SubmitError>
    where
        C: Future<Output = ()>,
    {
        let result = tokio::select! {
            biased;
            _ = cancel => Err(SubmitError::Cancelled),
            result = self.submit_inner(document, signature) => result,
        };

        self.record_outcome(document, &result);
        result
    }

    async fn submit_inner(&self, document: &Document, signature: &str) -> Result<(), SubmitError> {
        self.gate.acquire().await;

        let body = document
            .to_json()
            .map_err(|e| SubmitError::Encode(e.to_string()))?;

        debug!(
            doc_id = document.doc_id.as_deref().unwrap_or_default(),
            bytes = body.len(),
            "sending document"
        );

        let response = self.transport.send(body, signature).await?;
        if response.is_accepted() {
            Ok(())
        } else {
            Err(SubmitError::Rejected {
                status: response.status,
                body: response.body,
            })
        }
    }

    fn record_outcome(&self, document: &Document, result: &Result<(), SubmitError>) {
        let metrics = self.gate.metrics();
        let doc_id = document.doc_id.as_deref().unwrap_or_default();

        match result {
            Ok(()) => {
                metrics.record_accepted();
                debug!(doc_id, "document accepted");
            }
            Err(SubmitError::Rejected { status, body }) => {
                metrics.record_rejected();
                warn!(doc_id, status, body = body.as_str(), "document rejected");
            }
            Err(SubmitError::Transport(e)) => {
                metrics.record_transport_failure();
                warn!(doc_id, error = %e, "document not delivered");
            }
            Err(SubmitError::Cancelled) => {
                metrics.record_cancelled();
                debug!(doc_id, "submission cancelled");
            }
            Err(SubmitError::Encode(e)) => {
                metrics.record_encode_failure();
                warn!(doc_id, error = e.as_str(), "document not serializable");
            }
        }
    }

    /// Get a reference to the gate.
    pub fn gate(&self) -> &PermitGate {
        &self.gate
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a reference to the metrics tracker.
    pub fn metrics(&self) -> &Metrics {
        self.gate.metrics()
    }

    /// Stop the gate's automatic replenishment.
    ///
    /// # Errors
    /// See [`PermitGate::shutdown`].
    pub async fn shutdown(&self) -> Result<(), ShutdownError> {
        self.gate.shutdown().await
    }
}
