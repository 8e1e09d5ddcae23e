//! Configuration surface for a ready-to-use submitter.
//!
//! `SubmitterBuilder` wires a permit gate, its replenisher and an HTTP
//! transport together from a handful of settings.

use crate::application::gate::{PermitGate, StartError};
use crate::application::metrics::Metrics;
use crate::application::ports::{Ticker, Transport};
use crate::application::submitter::DocumentSubmitter;
use crate::domain::window::{GateConfigError, Window, WindowUnit};
use crate::infrastructure::http::{ReqwestTransport, SignaturePlacement};

use reqwest::header::HeaderName;
use reqwest::{Client, Url};
use std::time::Duration;

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://ismp.crpt.ru/api/v3/lk/documents/create";

/// Permits per window used when none is configured.
pub const DEFAULT_CAPACITY: usize = 10;

/// Window length used when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Error returned when building a `DocumentSubmitter` fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Capacity or interval is invalid
    Gate(GateConfigError),
    /// The endpoint is not a valid URL
    InvalidEndpoint(String),
    /// The signature header name is not a valid header name
    InvalidSignatureHeader(String),
    /// The HTTP client could not be initialized
    HttpClient(String),
    /// Automatic replenishment could not be started
    Start(StartError),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Gate(e) => write!(f, "gate configuration error: {}", e),
            BuildError::InvalidEndpoint(e) => write!(f, "invalid endpoint: {}", e),
            BuildError::InvalidSignatureHeader(name) => {
                write!(f, "invalid signature header name: {:?}", name)
            }
            BuildError::HttpClient(e) => write!(f, "failed to build HTTP client: {}", e),
            BuildError::Start(e) => write!(f, "failed to start replenisher: {}", e),
        }
    }
}

impl std::error::Error for BuildError {}

impl From<GateConfigError> for BuildError {
    fn from(e: GateConfigError) -> Self {
        BuildError::Gate(e)
    }
}

impl From<StartError> for BuildError {
    fn from(e: StartError) -> Self {
        BuildError::Start(e)
    }
}

/// Builder for constructing a `DocumentSubmitter`.
#[derive(Debug, Clone)]
pub struct SubmitterBuilder {
    endpoint: String,
    capacity: usize,
    interval: Duration,
    request_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    signature_placement: SignaturePlacement,
    auto_replenish: bool,
    metrics: Option<Metrics>,
}

impl Default for SubmitterBuilder {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            capacity: DEFAULT_CAPACITY,
            interval: DEFAULT_INTERVAL,
            request_timeout: None,
            connect_timeout: None,
            signature_placement: SignaturePlacement::Omit,
            auto_replenish: true,
            metrics: None,
        }
    }
}

impl SubmitterBuilder {
    /// Set the endpoint documents are posted to.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the number of permits per window.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the window length.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the window length to one `unit`.
    pub fn with_window_unit(mut self, unit: WindowUnit) -> Self {
        self.interval = unit.as_duration();
        self
    }

    /// Bound each request, from connect to the end of the response body.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Bound connection establishment.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Choose where the document signature is sent.
    pub fn with_signature_placement(mut self, placement: SignaturePlacement) -> Self {
        self.signature_placement = placement;
        self
    }

    /// Enable or disable automatic replenishment (enabled by default).
    ///
    /// With it disabled the gate only refills when `replenish` is called.
    pub fn with_auto_replenish(mut self, enabled: bool) -> Self {
        self.auto_replenish = enabled;
        self
    }

    /// Record into an existing metrics tracker.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build a submitter that posts over HTTP.
    ///
    /// Must be called within a tokio runtime when automatic replenishment is
    /// enabled.
    ///
    /// # Errors
    /// Returns `BuildError` if the configuration is invalid.
    pub fn build(self) -> Result<DocumentSubmitter<ReqwestTransport>, BuildError> {
        let transport = self.build_transport()?;
        self.build_with_transport(transport)
    }

    /// Build a submitter around any transport.
    ///
    /// HTTP settings (endpoint, timeouts, signature placement) are ignored.
    ///
    /// # Errors
    /// Returns `BuildError` if the gate configuration is invalid or the
    /// replenisher cannot be started.
    pub fn build_with_transport<T: Transport>(
        self,
        transport: T,
    ) -> Result<DocumentSubmitter<T>, BuildError> {
        let gate = self.build_gate()?;
        if self.auto_replenish {
            gate.start_auto_replenish()?;
        }
        Ok(DocumentSubmitter::new(gate, transport))
    }

    /// Build a submitter whose gate is replenished on every tick of `ticker`.
    ///
    /// The auto-replenish setting is ignored.
    ///
    /// # Errors
    /// Returns `BuildError` if the gate configuration is invalid or the
    /// replenisher cannot be started.
    pub fn build_with_ticker<T, K>(
        self,
        transport: T,
        ticker: K,
    ) -> Result<DocumentSubmitter<T>, BuildError>
    where
        T: Transport,
        K: Ticker,
    {
        let gate = self.build_gate()?;
        gate.start_auto_replenish_with(ticker)?;
        Ok(DocumentSubmitter::new(gate, transport))
    }

    fn build_gate(&self) -> Result<PermitGate, BuildError> {
        let window = Window::new(self.capacity, self.interval)?;
        let metrics = self.metrics.clone().unwrap_or_default();
        Ok(PermitGate::with_metrics(window, metrics))
    }

    fn build_transport(&self) -> Result<ReqwestTransport, BuildError> {
        let endpoint =
            Url::parse(&self.endpoint).map_err(|e| BuildError::InvalidEndpoint(e.to_string()))?;

        let signature_header = match &self.signature_placement {
            SignaturePlacement::Omit => None,
            SignaturePlacement::Header(name) => Some(
                HeaderName::from_bytes(name.as_bytes())
                    .map_err(|_| BuildError::InvalidSignatureHeader(name.clone()))?,
            ),
        };

        let mut client = Client::builder();
        if let Some(timeout) = self.request_timeout {
            client = client.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            client = client.connect_timeout(timeout);
        }
        let client = client
            .build()
            .map_err(|e| BuildError::HttpClient(e.to_string()))?;

        Ok(ReqwestTransport::new(client, endpoint, signature_header))
    }
}

impl DocumentSubmitter<ReqwestTransport> {
    /// Create a builder for configuring a submitter.
    ///
    /// Defaults:
    /// - Endpoint: [`DEFAULT_ENDPOINT`]
    /// - Capacity: 10 permits
    /// - Interval: 60 seconds
    /// - Timeouts: none
    /// - Signature: not sent
    /// - Automatic replenishment: enabled
    pub fn builder() -> SubmitterBuilder {
        SubmitterBuilder::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::gate::GateState;
    use crate::infrastructure::mocks::{MockTicker, MockTransport};

    #[tokio::test]
    async fn test_defaults() {
        let submitter = DocumentSubmitter::builder().build().unwrap();

        assert_eq!(submitter.gate().capacity(), DEFAULT_CAPACITY);
        assert_eq!(submitter.gate().interval(), DEFAULT_INTERVAL);
        assert_eq!(submitter.gate().state(), GateState::Running);
        assert_eq!(submitter.transport().endpoint().as_str(), DEFAULT_ENDPOINT);
        assert!(submitter.transport().signature_header().is_none());

        submitter.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_custom_settings() {
        let submitter = DocumentSubmitter::builder()
            .with_endpoint("http://localhost:8080/documents")
            .with_capacity(3)
            .with_window_unit(WindowUnit::Second)
            .with_request_timeout(Duration::from_secs(5))
            .with_connect_timeout(Duration::from_secs(1))
            .with_signature_placement(SignaturePlacement::Header("X-Signature".to_string()))
            .with_auto_replenish(false)
            .build()
            .unwrap();

        assert_eq!(submitter.gate().capacity(), 3);
        assert_eq!(submitter.gate().interval(), Duration::from_secs(1));
        assert_eq!(submitter.gate().state(), GateState::Created);
        assert_eq!(
            submitter.transport().signature_header().map(|h| h.as_str()),
            Some("x-signature")
        );
    }

    #[test]
    fn test_zero_capacity() {
        let result = DocumentSubmitter::builder().with_capacity(0).build();
        assert!(matches!(
            result,
            Err(BuildError::Gate(GateConfigError::ZeroCapacity))
        ));
    }

    #[test]
    fn test_zero_interval() {
        let result = DocumentSubmitter::builder()
            .with_interval(Duration::ZERO)
            .build();
        assert!(matches!(
            result,
            Err(BuildError::Gate(GateConfigError::ZeroInterval))
        ));
    }

    #[test]
    fn test_invalid_endpoint() {
        let result = DocumentSubmitter::builder()
            .with_endpoint("not a url")
            .build();
        assert!(matches!(result, Err(BuildError::InvalidEndpoint(_))));
    }

    #[test]
    fn test_invalid_signature_header() {
        let result = DocumentSubmitter::builder()
            .with_signature_placement(SignaturePlacement::Header("bad header".to_string()))
            .build();
        assert_eq!(
            result.unwrap_err(),
            BuildError::InvalidSignatureHeader("bad header".to_string())
        );
    }

    #[test]
    fn test_auto_replenish_requires_runtime() {
        let result = DocumentSubmitter::builder().build_with_transport(MockTransport::new());
        assert!(matches!(
            result,
            Err(BuildError::Start(StartError::NoRuntime))
        ));
    }

    #[test]
    fn test_manual_replenish_needs_no_runtime() {
        let submitter = DocumentSubmitter::builder()
            .with_auto_replenish(false)
            .build_with_transport(MockTransport::new())
            .unwrap();
        assert_eq!(submitter.gate().state(), GateState::Created);
    }

    #[tokio::test]
    async fn test_build_with_ticker_shares_metrics() {
        let metrics = Metrics::new();
        let (ticker, trigger) = MockTicker::new();

        let submitter = DocumentSubmitter::builder()
            .with_capacity(1)
            .with_metrics(metrics.clone())
            .build_with_ticker(MockTransport::new(), ticker)
            .unwrap();

        submitter.gate().acquire().await;
        trigger.fire();
        submitter.gate().acquire().await;

        assert_eq!(metrics.permits_granted(), 2);
        assert_eq!(metrics.replenishments(), 1);

        submitter.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_unrepresentable_interval_builds() {
        let submitter = DocumentSubmitter::builder()
            .with_interval(Duration::MAX)
            .build_with_transport(MockTransport::new())
            .unwrap();

        assert_eq!(submitter.gate().interval(), Duration::MAX);
        assert_eq!(submitter.gate().state(), GateState::Running);

        submitter.shutdown().await.unwrap();
    }

    #[test]
    fn test_build_error_display() {
        assert_eq!(
            BuildError::Gate(GateConfigError::ZeroCapacity).to_string(),
            "gate configuration error: capacity must be greater than 0"
        );
        assert_eq!(
            BuildError::Start(StartError::NoRuntime).to_string(),
            "failed to start replenisher: no tokio runtime available to spawn replenisher"
        );
    }
}
