//! Ordered handler chain
//!
//! A chain is an immutable list of handlers evaluated front to back, with a
//! [`DefaultHandler`] that is always last and always matches. The fallback is a
//! separate field rather than a list entry, so no chain can be built without
//! one and nothing can be placed after it.

use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::config::ChainSection;
use crate::handler::builtin::{standard_handler_names, standard_handlers};
use crate::handler::{DefaultHandler, ResponseHandler, DEFAULT_HANDLER_NAME};
use crate::protocol::ResponseEnvelope;

/// Chain assembly errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("Duplicate handler name in chain: {0}")]
    DuplicateHandler(String),
    #[error("Unknown handler name: {0}")]
    UnknownHandler(String),
    #[error("The default handler is always part of the chain and cannot be excluded")]
    CannotExcludeDefault,
}

/// Assembles a [`DispatchChain`]
#[derive(Default)]
pub struct ChainBuilder {
    handlers: Vec<Box<dyn ResponseHandler>>,
}

impl ChainBuilder {
    /// Empty builder; the resulting chain holds only the fallback
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-loaded with every built-in handler in standard order
    pub fn standard() -> Self {
        let mut builder = Self::new();
        for handler in standard_handlers() {
            builder = builder.push(handler);
        }
        builder
    }

    /// Append a handler after those already added
    pub fn push<H: ResponseHandler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Insert a handler immediately before the one named `before`
    ///
    /// Naming the fallback appends the handler at the end of the chain.
    pub fn insert_before<H: ResponseHandler + 'static>(
        mut self,
        before: &str,
        handler: H,
    ) -> Result<Self, ChainError> {
        if before == DEFAULT_HANDLER_NAME {
            self.handlers.push(Box::new(handler));
            return Ok(self);
        }

        let position = self
            .handlers
            .iter()
            .position(|h| h.name() == before)
            .ok_or_else(|| ChainError::UnknownHandler(before.to_string()))?;
        self.handlers.insert(position, Box::new(handler));
        Ok(self)
    }

    /// Remove the handler named `name`
    pub fn without(mut self, name: &str) -> Result<Self, ChainError> {
        if name == DEFAULT_HANDLER_NAME {
            return Err(ChainError::CannotExcludeDefault);
        }

        let before = self.handlers.len();
        self.handlers.retain(|h| h.name() != name);
        if self.handlers.len() == before {
            return Err(ChainError::UnknownHandler(name.to_string()));
        }
        Ok(self)
    }

    /// Validate names and freeze the chain
    pub fn build(self) -> Result<DispatchChain, ChainError> {
        let mut seen = HashSet::new();
        for handler in &self.handlers {
            let name = handler.name();
            if name == DEFAULT_HANDLER_NAME || !seen.insert(name) {
                return Err(ChainError::DuplicateHandler(name.to_string()));
            }
        }

        Ok(DispatchChain {
            handlers: self.handlers,
            fallback: DefaultHandler::new(),
        })
    }
}

/// Immutable, totally ordered handler sequence ending in the fallback
pub struct DispatchChain {
    handlers: Vec<Box<dyn ResponseHandler>>,
    fallback: DefaultHandler,
}

impl DispatchChain {
    /// All built-in handlers in standard order
    pub fn standard() -> Self {
        Self {
            handlers: standard_handlers()
                .into_iter()
                .map(|h| Box::new(h) as Box<dyn ResponseHandler>)
                .collect(),
            fallback: DefaultHandler::new(),
        }
    }

    /// Standard chain minus the handlers the configuration excludes
    pub fn from_config(section: &ChainSection) -> Result<Self, ChainError> {
        let known = standard_handler_names();
        let mut builder = ChainBuilder::standard();

        for name in &section.exclude {
            if name == DEFAULT_HANDLER_NAME {
                return Err(ChainError::CannotExcludeDefault);
            }
            if !known.contains(&name.as_str()) {
                return Err(ChainError::UnknownHandler(name.clone()));
            }
            // Listing a name twice is harmless
            if builder.handlers.iter().any(|h| h.name() == name) {
                builder = builder.without(name)?;
            }
        }

        builder.build()
    }

    /// Handler names in evaluation order, fallback included
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers
            .iter()
            .map(|h| h.name())
            .chain(std::iter::once(self.fallback.name()))
            .collect()
    }

    /// First handler whose predicate accepts the envelope
    pub fn select(&self, envelope: &ResponseEnvelope) -> &dyn ResponseHandler {
        self.select_counted(envelope).0
    }

    /// Like [`select`](Self::select), also reporting how many predicates ran
    pub fn select_counted(&self, envelope: &ResponseEnvelope) -> (&dyn ResponseHandler, usize) {
        for (index, handler) in self.handlers.iter().enumerate() {
            if handler.can_handle(envelope) {
                return (&**handler, index + 1);
            }
            tracing::trace!(handler = handler.name(), "Predicate declined envelope");
        }
        (&self.fallback as &dyn ResponseHandler, self.handlers.len() + 1)
    }
}

impl fmt::Debug for DispatchChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchChain")
            .field("handlers", &self.handler_names())
            .finish()
    }
}
