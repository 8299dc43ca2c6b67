//! Domain objects and their members
//!
//! `action`, `property` and `collection` are keyed on profile or on the
//! `/objects/...` and `/services/...` URL shapes. `object` and `member` are the
//! generic structural probes and must stay behind every handler whose
//! representation also carries a `members` or `memberType` key.

use crate::error::DispatchResult;
use crate::handler::{parse_body, HandlerDescriptor};
use crate::protocol::{ReprType, Representation, ResponseEnvelope};

use super::tail_segments;

pub const ACTION: HandlerDescriptor = HandlerDescriptor::new("action", is_action, parse_action);
pub const PROPERTY: HandlerDescriptor =
    HandlerDescriptor::new("property", is_property, parse_property);
pub const COLLECTION: HandlerDescriptor =
    HandlerDescriptor::new("collection", is_collection, parse_collection);
pub const OBJECT: HandlerDescriptor = HandlerDescriptor::new("object", is_object, parse_object);
pub const MEMBER: HandlerDescriptor = HandlerDescriptor::new("member", is_member, parse_member);

/// `.../objects/{type}/{id}/{kind}/{member}` or `.../services/{id}/{kind}/{member}`
fn is_instance_member_path(envelope: &ResponseEnvelope, kind: &str) -> bool {
    let owned_by_instance = envelope.has_segment("objects") || envelope.has_segment("services");
    if !owned_by_instance || envelope.has_segment("domain-types") {
        return false;
    }
    matches!(
        tail_segments(envelope, 2).as_deref(),
        Some([member_kind, _]) if member_kind.eq_ignore_ascii_case(kind)
    )
}

fn is_action(envelope: &ResponseEnvelope) -> bool {
    envelope.has_repr_type(ReprType::ObjectAction) || is_instance_member_path(envelope, "actions")
}

fn is_property(envelope: &ResponseEnvelope) -> bool {
    envelope.has_repr_type(ReprType::ObjectProperty)
        || is_instance_member_path(envelope, "properties")
}

fn is_collection(envelope: &ResponseEnvelope) -> bool {
    envelope.has_repr_type(ReprType::ObjectCollection)
        || is_instance_member_path(envelope, "collections")
}

fn is_object(envelope: &ResponseEnvelope) -> bool {
    envelope.has_repr_type(ReprType::Object) || envelope.has_top_level_key("members")
}

fn is_member(envelope: &ResponseEnvelope) -> bool {
    envelope.has_top_level_key("memberType")
}

fn parse_action(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("action", envelope).map(Representation::Action)
}

fn parse_property(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("property", envelope).map(Representation::Property)
}

fn parse_collection(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("collection", envelope).map(Representation::Collection)
}

fn parse_object(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("object", envelope).map(Representation::Object)
}

fn parse_member(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("member", envelope).map(Representation::Member)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatchError;
    use crate::handler::ResponseHandler;

    const OBJECT_BODY: &str = r#"{
        "domainType": "demo.JavaLangStringEntity",
        "instanceId": "1",
        "title": "Hello",
        "members": {
            "name": {"id": "name", "memberType": "property", "value": "Hello", "links": []},
            "delete": {"id": "delete", "memberType": "action", "links": []}
        },
        "links": [],
        "extensions": {"oid": "demo.JavaLangStringEntity:1"}
    }"#;

    #[test]
    fn test_object_by_profile_and_probe() {
        let declared = ResponseEnvelope::get("http://x/restful/objects/demo.X/1")
            .with_repr_type(ReprType::Object)
            .with_body(OBJECT_BODY);
        let probed = ResponseEnvelope::get("http://x/anything").with_body(OBJECT_BODY);

        assert!(OBJECT.can_handle(&declared));
        assert!(OBJECT.can_handle(&probed));

        match OBJECT.handle(&probed).unwrap() {
            Representation::Object(object) => {
                assert_eq!(object.title.as_deref(), Some("Hello"));
                assert_eq!(object.members.len(), 2);
                assert_eq!(object.members["delete"].member_type, "action");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_action_paths() {
        assert!(ACTION.can_handle(&ResponseEnvelope::get(
            "http://x/restful/services/demo.Menu/actions/listAll"
        )));
        assert!(ACTION.can_handle(&ResponseEnvelope::get(
            "http://x/restful/objects/demo.X/1/actions/delete"
        )));
        assert!(!ACTION.can_handle(&ResponseEnvelope::get(
            "http://x/restful/objects/demo.X/1/actions/delete/invoke"
        )));
        assert!(!ACTION.can_handle(&ResponseEnvelope::get(
            "http://x/restful/domain-types/demo.X/actions/delete"
        )));
    }

    #[test]
    fn test_property_parses_value() {
        let envelope = ResponseEnvelope::get("http://x/restful/objects/demo.X/1/properties/name")
            .with_body(r#"{"id": "name", "memberType": "property", "value": "Hello", "links": []}"#);

        assert!(PROPERTY.can_handle(&envelope));
        assert!(!COLLECTION.can_handle(&envelope));
        match PROPERTY.handle(&envelope).unwrap() {
            Representation::Property(property) => assert_eq!(property.value.unwrap(), "Hello"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_member_probe() {
        let envelope = ResponseEnvelope::get("http://x/unknown/place")
            .with_body(r#"{"id": "items", "memberType": "collection", "links": []}"#);
        assert!(MEMBER.can_handle(&envelope));
        assert!(!OBJECT.can_handle(&envelope));
    }

    #[test]
    fn test_object_without_members_map_is_malformed() {
        let envelope = ResponseEnvelope::get("http://x/restful/objects/demo.X/1")
            .with_repr_type(ReprType::Object)
            .with_body(r#"{"members": ["not", "a", "map"]}"#);

        assert!(matches!(
            OBJECT.handle(&envelope),
            Err(DispatchError::MalformedPayload { handler: "object", .. })
        ));
    }
}
