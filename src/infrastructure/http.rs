//! HTTP transport backed by `reqwest`.
//!
//! Sends each document as a single POST with `Content-Type: application/json`.
//! The signature is attached according to the configured `SignaturePlacement`.

use crate::application::ports::{RemoteResponse, Transport, TransportError, TransportErrorKind};

use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Url};
use std::future::Future;

/// Where the document signature travels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SignaturePlacement {
    /// The signature is not sent
    #[default]
    Omit,
    /// The signature is sent as the value of the named header
    Header(String),
}

/// Transport posting documents to a fixed endpoint.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    endpoint: Url,
    signature_header: Option<HeaderName>,
}

impl ReqwestTransport {
    /// Create a transport.
    ///
    /// `signature_header` is already validated; the builder converts a
    /// `SignaturePlacement` into it.
    pub(crate) fn new(client: Client, endpoint: Url, signature_header: Option<HeaderName>) -> Self {
        Self {
            client,
            endpoint,
            signature_header,
        }
    }

    /// Endpoint every document is posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Header carrying the signature, if any.
    pub fn signature_header(&self) -> Option<&HeaderName> {
        self.signature_header.as_ref()
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        body: String,
        signature: &str,
    ) -> impl Future<Output = Result<RemoteResponse, TransportError>> + Send {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body);

        let mut invalid_signature = None;
        if let Some(name) = &self.signature_header {
            match HeaderValue::from_str(signature) {
                Ok(value) => request = request.header(name.clone(), value),
                Err(e) => invalid_signature = Some(e.to_string()),
            }
        }

        async move {
            if let Some(e) = invalid_signature {
                return Err(TransportError::new(
                    TransportErrorKind::Request,
                    format!("signature is not a valid header value: {}", e),
                ));
            }

            let response = request.send().await.map_err(classify)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| {
                TransportError::new(TransportErrorKind::Body, e.to_string())
            })?;

            Ok(RemoteResponse { status, body })
        }
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    let kind = if error.is_timeout() {
        TransportErrorKind::Timeout
    } else if error.is_connect() {
        TransportErrorKind::Connect
    } else {
        TransportErrorKind::Request
    };
    TransportError::new(kind, error.to_string())
}
