//! Domain type metadata: type descriptions and their member descriptions.
//!
//! Member descriptions live at
//! `.../domain-types/{type}/{properties|collections|actions}/{id}` and action
//! parameters one level deeper at `.../actions/{id}/params/{param}`.

use crate::error::DispatchResult;
use crate::handler::{parse_body, HandlerDescriptor};
use crate::protocol::{ReprType, Representation, ResponseEnvelope};

use super::tail_segments;

pub const COLLECTION_DESCRIPTION: HandlerDescriptor = HandlerDescriptor::new(
    "collection-description",
    is_collection_description,
    parse_collection_description,
);
pub const PROPERTY_DESCRIPTION: HandlerDescriptor = HandlerDescriptor::new(
    "property-description",
    is_property_description,
    parse_property_description,
);
pub const ACTION_DESCRIPTION: HandlerDescriptor = HandlerDescriptor::new(
    "action-description",
    is_action_description,
    parse_action_description,
);
pub const ACTION_PARAM_DESCRIPTION: HandlerDescriptor = HandlerDescriptor::new(
    "action-param-description",
    is_action_param_description,
    parse_action_param_description,
);
pub const DOMAIN_TYPE: HandlerDescriptor =
    HandlerDescriptor::new("domain-type", is_domain_type, parse_domain_type);

/// `.../domain-types/{type}/{kind}/{id}`
fn is_type_member_path(envelope: &ResponseEnvelope, kind: &str) -> bool {
    match tail_segments(envelope, 4).as_deref() {
        Some([domain_types, _, member_kind, _]) => {
            domain_types.eq_ignore_ascii_case("domain-types") && member_kind.eq_ignore_ascii_case(kind)
        }
        _ => false,
    }
}

fn is_collection_description(envelope: &ResponseEnvelope) -> bool {
    envelope.has_repr_type(ReprType::CollectionDescription)
        || is_type_member_path(envelope, "collections")
}

fn is_property_description(envelope: &ResponseEnvelope) -> bool {
    envelope.has_repr_type(ReprType::PropertyDescription)
        || is_type_member_path(envelope, "properties")
}

fn is_action_description(envelope: &ResponseEnvelope) -> bool {
    envelope.has_repr_type(ReprType::ActionDescription) || is_type_member_path(envelope, "actions")
}

fn is_action_param_description(envelope: &ResponseEnvelope) -> bool {
    if envelope.has_repr_type(ReprType::ActionParamDescription) {
        return true;
    }
    match tail_segments(envelope, 6).as_deref() {
        Some([domain_types, _, actions, _, params, _]) => {
            domain_types.eq_ignore_ascii_case("domain-types")
                && actions.eq_ignore_ascii_case("actions")
                && params.eq_ignore_ascii_case("params")
        }
        _ => false,
    }
}

fn is_domain_type(envelope: &ResponseEnvelope) -> bool {
    if envelope.has_repr_type(ReprType::DomainType) {
        return true;
    }
    matches!(
        tail_segments(envelope, 2).as_deref(),
        Some([domain_types, _]) if domain_types.eq_ignore_ascii_case("domain-types")
    )
}

fn parse_collection_description(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("collection-description", envelope).map(Representation::MemberDescription)
}

fn parse_property_description(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("property-description", envelope).map(Representation::MemberDescription)
}

fn parse_action_description(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("action-description", envelope).map(Representation::MemberDescription)
}

fn parse_action_param_description(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("action-param-description", envelope).map(Representation::MemberDescription)
}

fn parse_domain_type(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("domain-type", envelope).map(Representation::DomainType)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::ResponseHandler;

    const COLLECTION_DESCRIPTION_BODY: &str = r#"{
        "id" : "entities",
        "memberType" : "collection",
        "links" : [ {
            "rel" : "self",
            "href" : "http://localhost:8080/restful/domain-types/demo.JavaLangStrings/collections/entities",
            "method" : "GET",
            "type" : "application/json;profile=\"urn:org.restfulobjects:repr-types/collection-description\""
        } ],
        "extensions" : { "friendlyName" : "Entities", "friendlyNameForm" : "static" }
    }"#;

    #[test]
    fn test_collection_description_by_url() {
        let envelope = ResponseEnvelope::get(
            "http://localhost:8080/restful/domain-types/demo.JavaLangStrings/collections/entities",
        )
        .with_body(COLLECTION_DESCRIPTION_BODY);

        assert!(COLLECTION_DESCRIPTION.can_handle(&envelope));
        assert!(!PROPERTY_DESCRIPTION.can_handle(&envelope));
        assert!(!DOMAIN_TYPE.can_handle(&envelope));

        match COLLECTION_DESCRIPTION.handle(&envelope).unwrap() {
            Representation::MemberDescription(description) => {
                assert_eq!(description.id, "entities");
                assert_eq!(description.friendly_name(), Some("Entities"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_object_collection_url_is_not_a_description() {
        let envelope =
            ResponseEnvelope::get("http://localhost:8080/restful/objects/demo.X/1/collections/items");
        assert!(!COLLECTION_DESCRIPTION.can_handle(&envelope));
    }

    #[test]
    fn test_action_param_description_path() {
        let envelope = ResponseEnvelope::get(
            "http://x/restful/domain-types/demo.X/actions/update/params/name",
        );
        assert!(ACTION_PARAM_DESCRIPTION.can_handle(&envelope));
        assert!(!ACTION_DESCRIPTION.can_handle(&envelope));
    }

    #[test]
    fn test_domain_type_by_url_and_profile() {
        assert!(DOMAIN_TYPE.can_handle(&ResponseEnvelope::get(
            "http://x/restful/domain-types/demo.JavaLangStrings"
        )));
        assert!(DOMAIN_TYPE.can_handle(
            &ResponseEnvelope::get("http://x/elsewhere").with_repr_type(ReprType::DomainType)
        ));
        assert!(!DOMAIN_TYPE.can_handle(&ResponseEnvelope::get("http://x/restful/domain-types")));
    }

    #[test]
    fn test_domain_type_parses_members() {
        let envelope = ResponseEnvelope::get("http://x/restful/domain-types/demo.X").with_body(
            r#"{"canonicalName": "demo.X",
                "members": [{"rel": "urn:org.restfulobjects:rels/property", "href": "http://x/p"}],
                "typeActions": [], "links": []}"#,
        );

        match DOMAIN_TYPE.handle(&envelope).unwrap() {
            Representation::DomainType(domain_type) => {
                assert_eq!(domain_type.canonical_name, "demo.X");
                assert_eq!(domain_type.members.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
