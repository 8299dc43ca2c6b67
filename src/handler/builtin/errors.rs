//! HTTP failure handlers
//!
//! Error responses are classified by status before anything else: a 4xx/5xx
//! body can look like any other representation (or like HTML), and it must
//! never be interpreted as one.

use serde_json::Value;
use tracing::warn;

use crate::error::{DispatchError, DispatchResult};
use crate::handler::HandlerDescriptor;
use crate::protocol::representation::{HttpError, Unauthorized};
use crate::protocol::{ReprType, Representation, ResponseEnvelope};

/// `401 Unauthorized`; sits immediately before [`HTTP_ERROR`]
pub const HTTP_401: HandlerDescriptor =
    HandlerDescriptor::new("http-401", is_unauthorized, parse_unauthorized);

/// Any other error status, or an explicit `error` profile
pub const HTTP_ERROR: HandlerDescriptor =
    HandlerDescriptor::new("http-error", is_http_error, parse_http_error);

fn is_unauthorized(envelope: &ResponseEnvelope) -> bool {
    envelope.status() == 401
}

fn is_http_error(envelope: &ResponseEnvelope) -> bool {
    envelope.is_error_status() || envelope.has_repr_type(ReprType::Error)
}

fn parse_unauthorized(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    let json_str = |key: &str| {
        envelope
            .json()
            .and_then(|json| json.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let message = json_str("message")
        .or_else(|| body_excerpt(envelope))
        .unwrap_or_else(|| "authentication required".to_string());

    warn!(url = envelope.url(), "Server rejected credentials");

    Ok(Representation::Unauthorized(Unauthorized {
        url: envelope.url().to_string(),
        realm: json_str("realm"),
        message,
    }))
}

fn parse_http_error(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    if let Some(json) = envelope.json() {
        if let Ok(error) = serde_json::from_value::<HttpError>(json.clone()) {
            return Ok(Representation::HttpError(error));
        }
    }

    // Servers and proxies return HTML or plain text for many failures; keep
    // what is there rather than failing the envelope a second time.
    if envelope.is_error_status() {
        return Ok(Representation::HttpError(HttpError {
            http_status_code: envelope.status(),
            message: body_excerpt(envelope).unwrap_or_else(|| format!("HTTP {}", envelope.status())),
            detail: None,
        }));
    }

    Err(DispatchError::malformed(
        "http-error",
        "error profile without httpStatusCode and message",
    ))
}

/// First non-blank line of a textual body, bounded in length
fn body_excerpt(envelope: &ResponseEnvelope) -> Option<String> {
    const MAX_EXCERPT: usize = 200;

    let line = envelope
        .body_text()?
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())?;
    Some(line.chars().take(MAX_EXCERPT).collect())
}
