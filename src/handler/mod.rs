//! Handler contract for the dispatch chain
//!
//! A handler is a two-operation capability: a cheap, side-effect-free predicate
//! deciding whether an envelope belongs to it, and a processing action turning
//! the envelope into a [`Representation`]. Handlers never know about each other;
//! ordering is entirely the chain's concern.
//!
//! Built-in handlers are plain [`HandlerDescriptor`] values (a name plus two
//! function pointers). Anything that needs configuration or captured state can
//! implement [`ResponseHandler`] directly.

use serde::de::DeserializeOwned;
use std::fmt;

use crate::error::{DispatchError, DispatchResult};
use crate::protocol::{Representation, ResponseEnvelope};

pub mod builtin;
pub mod default;

pub use default::{DefaultHandler, DEFAULT_HANDLER_NAME};

/// Classification and processing contract for one representation kind
pub trait ResponseHandler: Send + Sync {
    /// Unique name within a chain, used in diagnostics and metrics
    fn name(&self) -> &'static str;

    /// Decide whether this handler is responsible for the envelope
    ///
    /// Must be pure and cheap: it runs for every envelope that reaches this
    /// position in the chain, before any parsing is attempted.
    fn can_handle(&self, envelope: &ResponseEnvelope) -> bool;

    /// Interpret the envelope
    ///
    /// Only called after [`can_handle`](Self::can_handle) returned `true` for
    /// the same envelope. A failure here is final for the envelope; the chain
    /// never forwards on processing errors.
    fn handle(&self, envelope: &ResponseEnvelope) -> DispatchResult<Representation>;
}

pub type MatchFn = fn(&ResponseEnvelope) -> bool;
pub type ProcessFn = fn(&ResponseEnvelope) -> DispatchResult<Representation>;

/// A handler expressed as a name with predicate and action functions
#[derive(Clone, Copy)]
pub struct HandlerDescriptor {
    name: &'static str,
    matches: MatchFn,
    process: ProcessFn,
}

impl HandlerDescriptor {
    pub const fn new(name: &'static str, matches: MatchFn, process: ProcessFn) -> Self {
        Self {
            name,
            matches,
            process,
        }
    }
}

impl ResponseHandler for HandlerDescriptor {
    fn name(&self) -> &'static str {
        self.name
    }

    fn can_handle(&self, envelope: &ResponseEnvelope) -> bool {
        (self.matches)(envelope)
    }

    fn handle(&self, envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
        (self.process)(envelope)
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<H: ResponseHandler + ?Sized> ResponseHandler for Box<H> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn can_handle(&self, envelope: &ResponseEnvelope) -> bool {
        (**self).can_handle(envelope)
    }

    fn handle(&self, envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
        (**self).handle(envelope)
    }
}

/// Deserialize the envelope body as JSON, attributing failures to `handler`
pub fn parse_body<T: DeserializeOwned>(
    handler: &'static str,
    envelope: &ResponseEnvelope,
) -> DispatchResult<T> {
    if envelope.body().is_empty() {
        return Err(DispatchError::malformed(handler, "empty response body"));
    }
    serde_json::from_slice(envelope.body()).map_err(|e| DispatchError::malformed(handler, e.to_string()))
}
