//! Log capturing layer for testing.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::Level;
use tracing_subscriber::Layer;

/// Layer that records every event it sees.
///
/// Used to assert on what the gate and submitter log.
#[derive(Clone, Default)]
pub struct MockCaptureLayer {
    captured: Arc<Mutex<Vec<CapturedEvent>>>,
}

/// Captured event information.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub message: String,
    /// Every non-message field, formatted with `Debug`
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    /// Look up a recorded field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

impl MockCaptureLayer {
    /// Create a new capture layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all captured events.
    pub fn get_captured(&self) -> Vec<CapturedEvent> {
        self.lock().clone()
    }

    /// Get captured events whose message equals `message`.
    pub fn with_message(&self, message: &str) -> Vec<CapturedEvent> {
        self.lock()
            .iter()
            .filter(|event| event.message == message)
            .cloned()
            .collect()
    }

    /// Get the count of captured events.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Clear all captured events.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CapturedEvent>> {
        self.captured.lock().expect(
            "MockCaptureLayer mutex poisoned - a test thread panicked while holding the lock",
        )
    }
}

impl<S> Layer<S> for MockCaptureLayer
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        self.lock().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: BTreeMap<String, String>,
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields
                .insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields
                .insert(field.name().to_string(), format!("{:?}", value));
        }
    }
}
