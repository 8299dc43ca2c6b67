//! Apache Isis object layouts, served as JSON or as XML.

use crate::error::{DispatchError, DispatchResult};
use crate::handler::{parse_body, HandlerDescriptor};
use crate::protocol::representation::LayoutXml;
use crate::protocol::{ReprType, Representation, ResponseEnvelope};

pub const LAYOUT_XML: HandlerDescriptor =
    HandlerDescriptor::new("layout-xml", is_layout_xml, parse_layout_xml);
pub const LAYOUT: HandlerDescriptor = HandlerDescriptor::new("layout", is_layout, parse_layout);

fn is_layout_resource(envelope: &ResponseEnvelope) -> bool {
    envelope.has_repr_type(ReprType::ObjectLayout)
        || envelope.path_ends_with_segment("object-layout")
        || envelope.path_ends_with_segment("layout.xml")
}

fn is_layout_xml(envelope: &ResponseEnvelope) -> bool {
    envelope.content_type().is_some_and(|media| media.is_xml()) && is_layout_resource(envelope)
}

fn is_layout(envelope: &ResponseEnvelope) -> bool {
    envelope.is_json_candidate() && is_layout_resource(envelope)
}

fn parse_layout(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("layout", envelope).map(Representation::Layout)
}

fn parse_layout_xml(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    let document = envelope
        .body_text()
        .ok_or_else(|| DispatchError::malformed("layout-xml", "body is not valid UTF-8"))?;

    let root_element = root_element_name(document)
        .ok_or_else(|| DispatchError::malformed("layout-xml", "no document element found"))?;

    Ok(Representation::LayoutXml(LayoutXml {
        root_element: root_element.to_string(),
        document: document.to_string(),
    }))
}

/// Name of the first element, skipping the prolog, comments and doctype
fn root_element_name(document: &str) -> Option<&str> {
    let mut rest = document.trim_start_matches('\u{feff}');

    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix("<?") {
            rest = &after[after.find("?>")? + 2..];
        } else if let Some(after) = rest.strip_prefix("<!--") {
            rest = &after[after.find("-->")? + 3..];
        } else if let Some(after) = rest.strip_prefix("<!") {
            rest = &after[after.find('>')? + 1..];
        } else {
            let after = rest.strip_prefix('<')?;
            let end = after
                .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
                .unwrap_or(after.len());
            let name = &after[..end];
            return (!name.is_empty()).then_some(name);
        }
    }
}
