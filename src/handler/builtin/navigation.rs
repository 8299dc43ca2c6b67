//! Top-level navigation resources: home page, menus, user, version, services
//! and the domain type list.

use crate::error::DispatchResult;
use crate::handler::{parse_body, HandlerDescriptor};
use crate::protocol::{ReprType, Representation, ResponseEnvelope};

pub const RESTFUL: HandlerDescriptor = HandlerDescriptor::new("restful", is_restful, parse_restful);
pub const MENUBARS: HandlerDescriptor =
    HandlerDescriptor::new("menubars", is_menubars, parse_menubars);
pub const USER: HandlerDescriptor = HandlerDescriptor::new("user", is_user, parse_user);
pub const VERSION: HandlerDescriptor = HandlerDescriptor::new("version", is_version, parse_version);
pub const SERVICES: HandlerDescriptor =
    HandlerDescriptor::new("services", is_services, parse_services);
pub const DOMAIN_TYPES: HandlerDescriptor =
    HandlerDescriptor::new("domain-types", is_domain_types, parse_domain_types);

/// Declared profile first; the URL decides only when no profile was declared
fn is_root_resource(envelope: &ResponseEnvelope, repr: ReprType, resource: &str) -> bool {
    match envelope.repr_type() {
        Some(declared) => declared == repr,
        None => envelope.is_root_resource(resource),
    }
}

fn is_restful(envelope: &ResponseEnvelope) -> bool {
    is_root_resource(envelope, ReprType::Homepage, "")
}

fn is_menubars(envelope: &ResponseEnvelope) -> bool {
    is_root_resource(envelope, ReprType::Menubars, "menuBars")
}

fn is_user(envelope: &ResponseEnvelope) -> bool {
    is_root_resource(envelope, ReprType::User, "user")
}

fn is_version(envelope: &ResponseEnvelope) -> bool {
    is_root_resource(envelope, ReprType::Version, "version")
}

// `list` is a generic profile, so the URL decides.
fn is_services(envelope: &ResponseEnvelope) -> bool {
    envelope.is_root_resource("services")
        && matches!(envelope.repr_type(), None | Some(ReprType::List))
}

fn is_domain_types(envelope: &ResponseEnvelope) -> bool {
    is_root_resource(envelope, ReprType::TypeList, "domain-types")
}

fn parse_restful(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("restful", envelope).map(Representation::Restful)
}

fn parse_menubars(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("menubars", envelope).map(Representation::Menubars)
}

fn parse_user(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("user", envelope).map(Representation::User)
}

fn parse_version(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("version", envelope).map(Representation::Version)
}

fn parse_services(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("services", envelope).map(Representation::Services)
}

fn parse_domain_types(envelope: &ResponseEnvelope) -> DispatchResult<Representation> {
    parse_body("domain-types", envelope).map(Representation::DomainTypes)
}
