//! Error types for response dispatch
//!
//! Every failure the dispatch core can observe is a [`DispatchError`]. Failures
//! that end an envelope's processing are converted into a [`Diagnostic`] that is
//! stored on the envelope, so callers observe them through envelope state rather
//! than through a propagated error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Default upper bound for diagnostic messages
pub const DEFAULT_MAX_DIAGNOSTIC_LEN: usize = 500;

const TRUNCATE_SUFFIX: &str = "...[truncated]";

static SECRET_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(password|passwd|token|key|secret|authorization)([=:]\s*)[^\s&;,]+")
        .expect("secret pattern is a valid regex")
});

static URL_USERINFO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([a-z][a-z0-9+.-]*://)[^/@\s]+@").expect("userinfo pattern is a valid regex")
});

/// Main error type for dispatch operations
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unrecognized representation: {reason}")]
    UnrecognizedRepresentation { reason: UnrecognizedReason },

    #[error("malformed {handler} payload: {message}")]
    MalformedPayload {
        handler: &'static str,
        message: String,
    },

    #[error("handler {handler} panicked while processing the response")]
    HandlerPanicked { handler: &'static str },

    #[error("invalid envelope state transition from {from} to {to}")]
    StateTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("Chain error: {0}")]
    Chain(#[from] crate::dispatch::chain::ChainError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Why the fallback handler was reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum UnrecognizedReason {
    /// Response carried no body at all
    EmptyBody,
    /// A profile was declared that is not part of the vocabulary
    UnknownProfile(String),
    /// Media type no handler understands
    NonJsonMediaType(String),
    /// Declared (or assumed) JSON that does not parse
    InvalidJson,
    /// Valid JSON whose shape no handler recognised
    UnrecognizedStructure,
}

impl fmt::Display for UnrecognizedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnrecognizedReason::EmptyBody => write!(f, "empty response body"),
            UnrecognizedReason::UnknownProfile(profile) => write!(f, "unknown profile {profile}"),
            UnrecognizedReason::NonJsonMediaType(media) => {
                write!(f, "unsupported media type {media}")
            }
            UnrecognizedReason::InvalidJson => write!(f, "body is not valid JSON"),
            UnrecognizedReason::UnrecognizedStructure => {
                write!(f, "JSON structure matches no known representation")
            }
        }
    }
}

/// Failure classes surfaced on a failed envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnrecognizedRepresentation,
    MalformedPayload,
    HandlerPanicked,
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::UnrecognizedRepresentation => "unrecognized representation",
            FailureKind::MalformedPayload => "malformed payload",
            FailureKind::HandlerPanicked => "handler panicked",
            FailureKind::Internal => "internal error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sanitized description of a processing failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: FailureKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl DispatchError {
    /// Convert into an envelope diagnostic using the default length limit
    pub fn to_diagnostic(&self) -> Diagnostic {
        self.diagnostic_with_limit(DEFAULT_MAX_DIAGNOSTIC_LEN)
    }

    /// Convert into an envelope diagnostic, truncating to `max_len` characters
    pub fn diagnostic_with_limit(&self, max_len: usize) -> Diagnostic {
        let kind = match self {
            DispatchError::UnrecognizedRepresentation { .. } => {
                FailureKind::UnrecognizedRepresentation
            }
            DispatchError::MalformedPayload { .. } => FailureKind::MalformedPayload,
            DispatchError::HandlerPanicked { .. } => FailureKind::HandlerPanicked,
            DispatchError::StateTransition { .. }
            | DispatchError::Chain(_)
            | DispatchError::Config(_) => FailureKind::Internal,
        };

        Diagnostic {
            kind,
            message: sanitize_diagnostic(&self.to_string(), max_len),
        }
    }

    /// Create malformed payload error
    pub fn malformed<S: Into<String>>(handler: &'static str, message: S) -> Self {
        Self::MalformedPayload {
            handler,
            message: message.into(),
        }
    }

    /// Create unrecognized representation error
    pub fn unrecognized(reason: UnrecognizedReason) -> Self {
        Self::UnrecognizedRepresentation { reason }
    }
}

/// Redact credentials and bound the length of a diagnostic message.
///
/// Response URLs and server error bodies regularly echo credentials back, and
/// diagnostics end up in logs.
pub fn sanitize_diagnostic(message: &str, max_len: usize) -> String {
    let redacted = URL_USERINFO.replace_all(message, "${1}***@");
    let redacted = SECRET_PAIR.replace_all(&redacted, "${1}${2}***");

    if redacted.chars().count() <= max_len {
        return redacted.into_owned();
    }

    let keep = max_len.saturating_sub(TRUNCATE_SUFFIX.len());
    let mut truncated: String = redacted.chars().take(keep).collect();
    truncated.push_str(TRUNCATE_SUFFIX);
    truncated
}

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;
