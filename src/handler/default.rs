//! Terminal fallback handler
//!
//! Always matches, never succeeds. Its job is to explain why nothing upstream
//! accepted the envelope so the failure can be diagnosed instead of dropped.

use tracing::debug;

use super::ResponseHandler;
use crate::error::{DispatchError, DispatchResult, UnrecognizedReason};
use crate::protocol::{Representation, ResponseEnvelope};

pub const DEFAULT_HANDLER_NAME: &str = "default";

/// Catch-all handler at the end of every chain
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHandler;

impl DefaultHandler {
    pub fn new() -> Self {
        Self
    }

    /// Work out why no specific handler matched (pure function)
    pub fn classify(envelope: &ResponseEnvelope) -> UnrecognizedReason {
        if envelope.body().is_empty() {
            return UnrecognizedReason::EmptyBody;
        }

        if let Some(media) = envelope.content_type() {
            if let Some(profile) = media.profile() {
                if media.repr_type().is_none() {
                    return UnrecognizedReason::UnknownProfile(profile.to_string());
                }
            }
            if !media.is_json() {
                return UnrecognizedReason::NonJsonMediaType(media.essence());
            }
        }

        if envelope.json().is_none() {
            return UnrecognizedReason::InvalidJson;
        }

        UnrecognizedReason::UnrecognizedStructure
    }
}

impl ResponseHandler for DefaultHandler {
    fn name(&self) -> &'static str {
        DEFAULT_HANDLER_NAME
    }

    fn can_handle(&self, _envelope: &ResponseEnvelope) -> bool {
        true
    }

    fn handle(&self, envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
        let reason = Self::classify(envelope);
        debug!(url = envelope.url(), %reason, "No handler recognised response");
        Err(DispatchError::unrecognized(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ReprType;

    #[test]
    fn test_always_matches() {
        let handler = DefaultHandler::new();
        assert!(handler.can_handle(&ResponseEnvelope::get("")));
        assert_eq!(handler.name(), "default");
    }

    #[test]
    fn test_empty_body() {
        let envelope = ResponseEnvelope::get("http://x/").with_content_type("text/html");
        assert_eq!(DefaultHandler::classify(&envelope), UnrecognizedReason::EmptyBody);
    }

    #[test]
    fn test_unknown_profile() {
        let envelope = ResponseEnvelope::get("http://x/")
            .with_content_type("application/json;profile=\"urn:example:widget\"")
            .with_body("{}");
        assert_eq!(
            DefaultHandler::classify(&envelope),
            UnrecognizedReason::UnknownProfile("urn:example:widget".to_string())
        );
    }

    #[test]
    fn test_non_json_media_type() {
        let envelope = ResponseEnvelope::get("http://x/")
            .with_content_type("text/html; charset=utf-8")
            .with_body("{}");
        assert_eq!(
            DefaultHandler::classify(&envelope),
            UnrecognizedReason::NonJsonMediaType("text/html".to_string())
        );
    }

    #[test]
    fn test_invalid_json() {
        let envelope = ResponseEnvelope::get("http://x/").with_body("<html/>");
        assert_eq!(DefaultHandler::classify(&envelope), UnrecognizedReason::InvalidJson);
    }

    #[test]
    fn test_known_profile_with_unmatched_structure() {
        let envelope = ResponseEnvelope::get("http://x/")
            .with_repr_type(ReprType::ActionResult)
            .with_body(r#"{"resultType": "stream"}"#);
        assert_eq!(
            DefaultHandler::classify(&envelope),
            UnrecognizedReason::UnrecognizedStructure
        );
    }

    #[test]
    fn test_handle_always_fails_unrecognized() {
        let envelope = ResponseEnvelope::get("http://x/").with_body("{}");
        let result = DefaultHandler::new().handle(&envelope);
        assert!(matches!(
            result,
            Err(DispatchError::UnrecognizedRepresentation { .. })
        ));
    }
}
