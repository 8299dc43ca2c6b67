//! Mock sinks and handlers for exercising the dispatcher

use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::dispatch::{Delivery, RepresentationSink};
use crate::error::{DispatchError, DispatchResult};
use crate::handler::ResponseHandler;
use crate::protocol::{Representation, ResponseEnvelope};

/// Sink that keeps every delivery for later inspection
#[derive(Debug, Default)]
pub struct RecordingSink {
    deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.deliveries.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut deliveries) = self.deliveries.lock() {
            deliveries.clear();
        }
    }
}

impl RepresentationSink for RecordingSink {
    fn publish(&self, delivery: Delivery) {
        if let Ok(mut deliveries) = self.deliveries.lock() {
            deliveries.push(delivery);
        }
    }
}

/// Shared call counters for a [`CountingHandler`]
///
/// Cloned out before the handler is moved into a chain.
#[derive(Debug, Clone, Default)]
pub struct HandlerCounters {
    predicate_calls: Arc<AtomicUsize>,
    handle_calls: Arc<AtomicUsize>,
}

impl HandlerCounters {
    pub fn predicate_calls(&self) -> usize {
        self.predicate_calls.load(Ordering::SeqCst)
    }

    pub fn handle_calls(&self) -> usize {
        self.handle_calls.load(Ordering::SeqCst)
    }
}

type Predicate = Box<dyn Fn(&ResponseEnvelope) -> bool + Send + Sync>;

/// Handler that counts how often its predicate and action run
pub struct CountingHandler {
    name: &'static str,
    predicate: Predicate,
    fail: bool,
    counters: HandlerCounters,
}

impl CountingHandler {
    /// Handler whose predicate always returns `accepts`
    pub fn new(name: &'static str, accepts: bool) -> Self {
        Self::matching(name, move |_| accepts)
    }

    /// Handler with a custom predicate
    pub fn matching<F>(name: &'static str, predicate: F) -> Self
    where
        F: Fn(&ResponseEnvelope) -> bool + Send + Sync + 'static,
    {
        Self {
            name,
            predicate: Box::new(predicate),
            fail: false,
            counters: HandlerCounters::default(),
        }
    }

    /// Make `handle` return a malformed-payload error instead of succeeding
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn counters(&self) -> HandlerCounters {
        self.counters.clone()
    }
}

impl ResponseHandler for CountingHandler {
    fn name(&self) -> &'static str {
        self.name
    }

    fn can_handle(&self, envelope: &ResponseEnvelope) -> bool {
        self.counters.predicate_calls.fetch_add(1, Ordering::SeqCst);
        (self.predicate)(envelope)
    }

    fn handle(&self, envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
        self.counters.handle_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DispatchError::malformed(self.name, "configured to fail"));
        }
        Ok(Representation::Custom(json!({
            "handler": self.name,
            "url": envelope.url(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_recording_sink_keeps_deliveries() {
        let sink = RecordingSink::new();
        assert!(sink.is_empty());

        sink.publish(Delivery {
            envelope_id: Uuid::new_v4(),
            url: "http://x/".to_string(),
            handler: "user".to_string(),
            representation: Representation::Custom(json!(null)),
        });

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.deliveries()[0].handler, "user");
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_counting_handler_counts() {
        let handler = CountingHandler::new("probe", true);
        let counters = handler.counters();
        let envelope = ResponseEnvelope::get("http://x/");

        assert!(handler.can_handle(&envelope));
        assert!(handler.handle(&envelope).is_ok());
        assert_eq!(counters.predicate_calls(), 1);
        assert_eq!(counters.handle_calls(), 1);
    }

    #[test]
    fn test_failing_handler() {
        let handler = CountingHandler::new("probe", true).failing();
        assert!(handler.handle(&ResponseEnvelope::get("http://x/")).is_err());
    }
}
