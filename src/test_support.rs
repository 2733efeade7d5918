// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Test helpers: log capture and a scripted [`Source`].
//!
//! Library code only emits `tracing` events; tests install a capturing subscriber for
//! the duration of a closure and inspect what was logged.

use crate::endpoint::Endpoint;
use crate::errors::SourceError;
use crate::source::{EventHandler, Source};
use std::fmt::{self, Write as _};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::instrument::WithSubscriber;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// One captured log event.
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    /// Message followed by ` key=value` for every structured field
    pub text: String,
}

#[derive(Default)]
struct TextVisitor {
    message: String,
    fields: String,
}

impl Visit for TextVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = TextVisitor::default();
        event.record(&mut visitor);

        if let Ok(mut events) = self.events.lock() {
            events.push(CapturedEvent {
                level: *event.metadata().level(),
                text: format!("{}{}", visitor.message, visitor.fields),
            });
        }
    }
}

/// Runs `f` with a capturing subscriber and returns its result with every event logged.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<CapturedEvent>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        events: Arc::clone(&events),
    });

    let result = tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().map(|e| e.clone()).unwrap_or_default();
    (result, captured)
}

/// Awaits `future` with a capturing subscriber and returns its output with every event
/// logged while it was polled.
pub async fn capture_logs_async<F: Future>(future: F) -> (F::Output, Vec<CapturedEvent>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        events: Arc::clone(&events),
    });

    let result = future.with_subscriber(subscriber).await;
    let captured = events.lock().map(|e| e.clone()).unwrap_or_default();
    (result, captured)
}

/// Captured events at `level`.
pub fn at_level(events: &[CapturedEvent], level: Level) -> Vec<&CapturedEvent> {
    events.iter().filter(|e| e.level == level).collect()
}

// ============================================================================
// Mock Source
// ============================================================================

/// A source returning a fixed result and recording how it was used.
pub struct MockSource {
    endpoints: Vec<Endpoint>,
    error: Option<String>,
    calls: AtomicUsize,
    handlers: Mutex<Vec<EventHandler>>,
}

impl MockSource {
    pub fn returning(endpoints: Vec<Endpoint>) -> Arc<Self> {
        Arc::new(Self {
            endpoints,
            error: None,
            calls: AtomicUsize::new(0),
            handlers: Mutex::new(Vec::new()),
        })
    }

    /// A source whose `endpoints` fails with `message`.
    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            endpoints: Vec::new(),
            error: Some(message.to_string()),
            calls: AtomicUsize::new(0),
            handlers: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.lock().map(|h| h.len()).unwrap_or_default()
    }

    /// Invokes every registered handler, as a watch event would.
    pub fn fire(&self) {
        if let Ok(handlers) = self.handlers.lock() {
            for handler in handlers.iter() {
                handler();
            }
        }
    }
}

#[async_trait::async_trait]
impl Source for MockSource {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.error {
            Some(message) => Err(SourceError::Other(anyhow::anyhow!(message.clone()))),
            None => Ok(self.endpoints.clone()),
        }
    }

    fn add_event_handler(&self, handler: EventHandler) {
        if let Ok(mut handlers) = self.handlers.lock() {
            handlers.push(handler);
        }
    }
}
