//! Dispatcher facade
//!
//! Owns a chain, a sink and a metrics collector. `dispatch` never returns an
//! error: every outcome is recorded on the envelope itself.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::chain::DispatchChain;
use super::sink::{Delivery, NullSink, RepresentationSink};
use crate::config::{DispatcherConfig, DispatcherSection};
use crate::error::{DispatchError, DispatchResult};
use crate::handler::ResponseHandler;
use crate::observability::DispatchMetrics;
use crate::protocol::{Representation, ResponseEnvelope};
use crate::{dispatch_span, handler_span};

/// Routes envelopes through a [`DispatchChain`]
pub struct Dispatcher {
    name: String,
    chain: DispatchChain,
    sink: Arc<dyn RepresentationSink>,
    metrics: Arc<DispatchMetrics>,
    max_diagnostic_len: usize,
    catch_panics: bool,
}

impl Dispatcher {
    /// Dispatcher with default settings, a [`NullSink`] and fresh metrics
    pub fn new(chain: DispatchChain) -> Self {
        let defaults = DispatcherSection::default();
        Self {
            name: defaults.name,
            chain,
            sink: Arc::new(NullSink),
            metrics: Arc::new(DispatchMetrics::new()),
            max_diagnostic_len: defaults.max_diagnostic_len,
            catch_panics: defaults.catch_panics,
        }
    }

    /// Build the configured chain and apply the dispatcher settings
    pub fn from_config(config: &DispatcherConfig) -> DispatchResult<Self> {
        config.validate()?;
        let chain = DispatchChain::from_config(&config.chain)?;
        Ok(Self::new(chain).with_settings(&config.dispatcher))
    }

    pub fn with_settings(mut self, settings: &DispatcherSection) -> Self {
        self.name = settings.name.clone();
        self.max_diagnostic_len = settings.max_diagnostic_len;
        self.catch_panics = settings.catch_panics;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn RepresentationSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<DispatchMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chain(&self) -> &DispatchChain {
        &self.chain
    }

    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    /// The handler `dispatch` would run, without running it
    pub fn select(&self, envelope: &ResponseEnvelope) -> &dyn ResponseHandler {
        self.chain.select(envelope)
    }

    /// Classify and process one envelope
    ///
    /// Exactly one handler runs for an unprocessed envelope and the envelope
    /// ends `Processed` or `Failed`. Envelopes already in a terminal state are
    /// rejected untouched.
    pub fn dispatch(&self, envelope: &mut ResponseEnvelope) {
        let span = dispatch_span!(
            dispatcher = %self.name,
            envelope_id = %envelope.id(),
            url = %envelope.url(),
            status = envelope.status()
        );
        let _enter = span.enter();

        self.metrics.envelope_received();

        if envelope.state().is_terminal() {
            self.metrics.envelope_rejected();
            warn!(
                state = envelope.state().label(),
                handler = envelope.state().handler().unwrap_or_default(),
                "Rejecting envelope that has already been dispatched"
            );
            return;
        }

        let (handler, evaluated) = self.chain.select_counted(envelope);
        self.metrics.predicates_evaluated(evaluated as u64);

        let started = Instant::now();
        let outcome = self.run_handler(handler, envelope);
        let elapsed = started.elapsed();

        match outcome {
            Ok(representation) => {
                self.record_success(handler.name(), envelope, representation, elapsed);
            }
            Err(error) => self.record_failure(handler.name(), envelope, error, elapsed),
        }
    }

    /// Dispatch each envelope in order
    pub fn dispatch_all<'a, I>(&self, envelopes: I)
    where
        I: IntoIterator<Item = &'a mut ResponseEnvelope>,
    {
        for envelope in envelopes {
            self.dispatch(envelope);
        }
    }

    fn run_handler(
        &self,
        handler: &dyn ResponseHandler,
        envelope: &ResponseEnvelope,
    ) -> DispatchResult<Representation> {
        let _span = handler_span!(handler = handler.name()).entered();

        if !self.catch_panics {
            return handler.handle(envelope);
        }

        panic::catch_unwind(AssertUnwindSafe(|| handler.handle(envelope))).unwrap_or_else(|_| {
            Err(DispatchError::HandlerPanicked {
                handler: handler.name(),
            })
        })
    }

    fn record_success(
        &self,
        handler: &'static str,
        envelope: &mut ResponseEnvelope,
        representation: Representation,
        elapsed: std::time::Duration,
    ) {
        if let Err(e) = envelope.mark_processed(handler) {
            error!(handler, error = %e, "Could not mark envelope processed");
            return;
        }
        self.metrics.envelope_processed(handler, elapsed);

        info!(
            handler,
            kind = representation.kind(),
            elapsed_us = elapsed.as_micros() as u64,
            "Envelope processed"
        );

        self.sink.publish(Delivery {
            envelope_id: envelope.id(),
            url: envelope.url().to_string(),
            handler: handler.to_string(),
            representation,
        });
    }

    fn record_failure(
        &self,
        handler: &'static str,
        envelope: &mut ResponseEnvelope,
        failure: DispatchError,
        elapsed: std::time::Duration,
    ) {
        let diagnostic = failure.diagnostic_with_limit(self.max_diagnostic_len);

        match &failure {
            DispatchError::UnrecognizedRepresentation { reason } => {
                self.metrics.envelope_unrecognized();
                warn!(handler, %reason, "No handler recognized the response");
            }
            DispatchError::HandlerPanicked { .. } => {
                self.metrics.handler_panicked();
                error!(handler, "Handler panicked, envelope marked failed");
            }
            _ => error!(handler, diagnostic = %diagnostic.message, "Handler failed"),
        }

        if let Err(e) = envelope.mark_failed(handler, diagnostic) {
            error!(handler, error = %e, "Could not mark envelope failed");
            return;
        }
        self.metrics.envelope_failed(handler, elapsed);
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DispatchChain::standard())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("name", &self.name)
            .field("chain", &self.chain)
            .field("catch_panics", &self.catch_panics)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::chain::ChainBuilder;
    use crate::error::FailureKind;
    use crate::handler::HandlerDescriptor;
    use crate::protocol::{ProcessingState, ReprType};
    use crate::testing::RecordingSink;

    fn always(_: &ResponseEnvelope) -> bool {
        true
    }

    fn explode(_: &ResponseEnvelope) -> DispatchResult<Representation> {
        panic!("boom")
    }

    const EXPLODING: HandlerDescriptor = HandlerDescriptor::new("exploding", always, explode);

    fn user_envelope() -> ResponseEnvelope {
        ResponseEnvelope::get("http://localhost:8080/restful/user")
            .with_repr_type(ReprType::User)
            .with_body(r#"{"userName": "sven", "roles": ["admin"], "links": []}"#)
    }

    #[test]
    fn test_processed_envelope_is_published() {
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = Dispatcher::default().with_sink(sink.clone());
        let mut envelope = user_envelope();

        dispatcher.dispatch(&mut envelope);

        assert_eq!(envelope.state().handler(), Some("user"));
        assert!(matches!(envelope.state(), ProcessingState::Processed { .. }));

        let deliveries = sink.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].envelope_id, envelope.id());
        assert_eq!(deliveries[0].representation.kind(), "user");
    }

    #[test]
    fn test_terminal_envelope_is_rejected() {
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = Dispatcher::default().with_sink(sink.clone());
        let mut envelope = user_envelope();

        dispatcher.dispatch(&mut envelope);
        let state = envelope.state().clone();
        dispatcher.dispatch(&mut envelope);

        assert_eq!(envelope.state(), &state);
        assert_eq!(sink.len(), 1);

        let snapshot = dispatcher.metrics().snapshot();
        assert_eq!(snapshot.envelopes.received, 2);
        assert_eq!(snapshot.envelopes.rejected, 1);
        assert_eq!(snapshot.envelopes.processed, 1);
    }

    #[test]
    fn test_panic_becomes_failure() {
        let chain = ChainBuilder::new().push(EXPLODING).build().unwrap();
        let dispatcher = Dispatcher::new(chain);
        let mut envelope = ResponseEnvelope::get("http://x/");

        dispatcher.dispatch(&mut envelope);

        let diagnostic = envelope.state().diagnostic().unwrap();
        assert_eq!(diagnostic.kind, FailureKind::HandlerPanicked);
        assert_eq!(envelope.state().handler(), Some("exploding"));
        assert_eq!(dispatcher.metrics().snapshot().envelopes.handler_panics, 1);
    }

    #[test]
    fn test_unrecognized_counted() {
        let dispatcher = Dispatcher::default();
        let mut envelope = ResponseEnvelope::get("http://x/nowhere").with_body(r#"{"x": 1}"#);

        dispatcher.dispatch(&mut envelope);

        let diagnostic = envelope.state().diagnostic().unwrap();
        assert_eq!(diagnostic.kind, FailureKind::UnrecognizedRepresentation);
        let snapshot = dispatcher.metrics().snapshot();
        assert_eq!(snapshot.envelopes.unrecognized, 1);
        assert_eq!(snapshot.envelopes.failed, 1);
    }

    #[test]
    fn test_diagnostic_length_follows_settings() {
        let settings = DispatcherSection {
            max_diagnostic_len: 40,
            ..DispatcherSection::default()
        };
        let dispatcher = Dispatcher::default().with_settings(&settings);
        let mut envelope = ResponseEnvelope::get("http://x/restful/objects/demo.X/1")
            .with_repr_type(ReprType::Object)
            .with_body(format!(r#"{{"members": "{}"}}"#, "x".repeat(500)));

        dispatcher.dispatch(&mut envelope);

        let diagnostic = envelope.state().diagnostic().unwrap();
        assert_eq!(diagnostic.kind, FailureKind::MalformedPayload);
        assert!(diagnostic.message.chars().count() <= 40);
    }

    #[test]
    fn test_from_config_applies_exclusions() {
        let config = DispatcherConfig::from_toml_str(
            "[dispatcher]\nname = \"demo\"\n[chain]\nexclude = [\"user\"]\n",
        )
        .unwrap();
        let dispatcher = Dispatcher::from_config(&config).unwrap();
        assert_eq!(dispatcher.name(), "demo");

        let mut envelope = user_envelope();
        dispatcher.dispatch(&mut envelope);
        assert_ne!(envelope.state().handler(), Some("user"));
    }
}
