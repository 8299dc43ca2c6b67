//! Non-JSON payloads: PlantUML diagrams and object icons.

use crate::error::{DispatchError, DispatchResult};
use crate::handler::HandlerDescriptor;
use crate::protocol::representation::{Diagram, Icon};
use crate::protocol::{Representation, ResponseEnvelope};

pub const DIAGRAM: HandlerDescriptor = HandlerDescriptor::new("diagram", is_diagram, parse_diagram);
pub const ICON: HandlerDescriptor = HandlerDescriptor::new("icon", is_icon, parse_icon);

const PLANTUML_MEDIA_TYPE: &str = "text/vnd.plantuml";
const PLANTUML_START: &[u8] = b"@startuml";

fn is_diagram(envelope: &ResponseEnvelope) -> bool {
    let declared = envelope
        .content_type()
        .is_some_and(|media| media.essence() == PLANTUML_MEDIA_TYPE);
    declared || starts_with_plantuml(envelope.body())
}

fn starts_with_plantuml(body: &[u8]) -> bool {
    let start = body
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(body.len());
    body[start..].starts_with(PLANTUML_START)
}

fn is_icon(envelope: &ResponseEnvelope) -> bool {
    envelope.content_type().is_some_and(|media| media.is_image())
}

fn parse_diagram(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    let source = envelope
        .body_text()
        .ok_or_else(|| DispatchError::malformed("diagram", "body is not valid UTF-8"))?;
    if source.trim().is_empty() {
        return Err(DispatchError::malformed("diagram", "empty diagram source"));
    }

    Ok(Representation::Diagram(Diagram {
        source: source.to_string(),
    }))
}

fn parse_icon(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    if envelope.body().is_empty() {
        return Err(DispatchError::malformed("icon", "empty image body"));
    }

    let media_type = envelope
        .content_type()
        .map(|media| media.essence())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok(Representation::Icon(Icon {
        media_type,
        bytes: envelope.body().to_vec(),
    }))
}
