//! Built-in Restful Objects handlers
//!
//! [`standard_handlers`] returns them in chain priority order. The order is
//! part of the contract: status-based handlers first, then handlers keyed on
//! an exact profile or URL shape, then the generic structural probes
//! (`object` looks for a `members` key, `member` for `memberType`) which
//! would otherwise shadow the more specific representations carrying the
//! same keys.

use super::HandlerDescriptor;
use crate::protocol::ResponseEnvelope;

pub mod descriptions;
pub mod errors;
pub mod layout;
pub mod media;
pub mod members;
pub mod navigation;
pub mod results;

/// Built-in handlers in priority order (the fallback is not included)
pub fn standard_handlers() -> Vec<HandlerDescriptor> {
    vec![
        errors::HTTP_401,
        errors::HTTP_ERROR,
        navigation::RESTFUL,
        navigation::MENUBARS,
        navigation::USER,
        navigation::VERSION,
        navigation::SERVICES,
        navigation::DOMAIN_TYPES,
        descriptions::COLLECTION_DESCRIPTION,
        descriptions::PROPERTY_DESCRIPTION,
        descriptions::ACTION_PARAM_DESCRIPTION,
        descriptions::ACTION_DESCRIPTION,
        descriptions::DOMAIN_TYPE,
        members::ACTION,
        results::RESULT_LIST,
        results::RESULT_OBJECT,
        results::RESULT_VALUE,
        layout::LAYOUT_XML,
        layout::LAYOUT,
        members::PROPERTY,
        members::COLLECTION,
        members::OBJECT,
        members::MEMBER,
        media::DIAGRAM,
        media::ICON,
    ]
}

/// Names of the built-in handlers in priority order
pub fn standard_handler_names() -> Vec<&'static str> {
    use super::ResponseHandler;
    standard_handlers().iter().map(|h| h.name()).collect()
}

/// Last `n` path segments, or `None` if the path is shorter
pub(crate) fn tail_segments(envelope: &ResponseEnvelope, n: usize) -> Option<Vec<&str>> {
    let segments: Vec<&str> = envelope.segments().collect();
    let start = segments.len().checked_sub(n)?;
    Some(segments[start..].to_vec())
}
