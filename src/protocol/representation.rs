//! Domain representations produced by the built-in handlers
//!
//! These mirror the Restful Objects JSON shapes closely enough for a client to
//! navigate: links, members, results and the Apache Isis layout extensions.
//! Unknown fields are ignored; required fields missing from a payload make the
//! owning handler fail with a malformed-payload diagnostic.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Hypermedia link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub arguments: Option<Value>,
}

impl Link {
    /// `rel` with any `;` parameters stripped, e.g. `urn:org.restfulobjects:rels/details`
    pub fn rel_name(&self) -> &str {
        self.rel.split(';').next().unwrap_or_default()
    }
}

/// Free-form `extensions` block
pub type Extensions = Map<String, Value>;

/// Find the first link with the given relation name
pub fn find_link<'a>(links: &'a [Link], rel: &str) -> Option<&'a Link> {
    links.iter().find(|link| link.rel_name() == rel)
}

/// `homepage` representation at the API root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restful {
    pub links: Vec<Link>,
    #[serde(default)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_name: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub spec_version: String,
    #[serde(default)]
    pub implementation: Option<String>,
    #[serde(default)]
    pub optional_capabilities: Map<String, Value>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// `list` of service links, or `type-list` of domain types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkList {
    #[serde(alias = "values")]
    pub value: Vec<Link>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Apache Isis menu bars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menubars {
    pub primary: Value,
    #[serde(default)]
    pub secondary: Value,
    #[serde(default)]
    pub tertiary: Value,
}

/// `domain-type` representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainType {
    pub canonical_name: String,
    #[serde(default)]
    pub members: Vec<Link>,
    #[serde(default)]
    pub type_actions: Vec<Link>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub extensions: Extensions,
}

/// `property-description`, `collection-description`, `action-description`
/// and `action-param-description` share this shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDescription {
    pub id: String,
    #[serde(default)]
    pub member_type: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub extensions: Extensions,
}

impl MemberDescription {
    pub fn friendly_name(&self) -> Option<&str> {
        self.extensions.get("friendlyName").and_then(Value::as_str)
    }
}

/// Object member as it appears inside an object or on its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub member_type: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub disabled_reason: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub extensions: Extensions,
}

/// Domain object (`object` representation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainObject {
    #[serde(default)]
    pub domain_type: Option<String>,
    #[serde(default)]
    pub instance_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub members: BTreeMap<String, Member>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionParameter {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub num: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub choices: Option<Vec<Value>>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub extensions: Extensions,
}

/// `object-action` representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: String,
    #[serde(default)]
    pub member_type: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, ActionParameter>,
    #[serde(default)]
    pub disabled_reason: Option<String>,
    pub links: Vec<Link>,
    #[serde(default)]
    pub extensions: Extensions,
}

/// `object-property` representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    #[serde(default)]
    pub member_type: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub choices: Option<Vec<Value>>,
    #[serde(default)]
    pub disabled_reason: Option<String>,
    pub links: Vec<Link>,
    #[serde(default)]
    pub extensions: Extensions,
}

/// `object-collection` representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    #[serde(default)]
    pub member_type: Option<String>,
    #[serde(default)]
    pub value: Vec<Link>,
    #[serde(default)]
    pub disabled_reason: Option<String>,
    pub links: Vec<Link>,
    #[serde(default)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult {
    pub value: Vec<Link>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarResult {
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// `action-result` whose `resultType` is `list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultList {
    pub result_type: String,
    #[serde(default)]
    pub result: Option<ListResult>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// `action-result` whose `resultType` is `object`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultObject {
    pub result_type: String,
    pub result: DomainObject,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// `action-result` whose `resultType` is `scalar` or `void`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultValue {
    pub result_type: String,
    #[serde(default)]
    pub result: Option<ScalarResult>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Apache Isis object layout in JSON form (bootstrap grid)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub row: Vec<Value>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Object layout delivered as XML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutXml {
    /// Name of the document element, including any namespace prefix
    pub root_element: String,
    pub document: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub element: Vec<String>,
    #[serde(default)]
    pub cause: Option<Box<ErrorDetail>>,
}

/// Server-side failure (`error` representation or any 4xx/5xx response)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    pub http_status_code: u16,
    pub message: String,
    #[serde(default)]
    pub detail: Option<ErrorDetail>,
}

/// `401 Unauthorized`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unauthorized {
    pub url: String,
    /// Realm from the error body, when the server supplied one
    pub realm: Option<String>,
    pub message: String,
}

/// PlantUML diagram source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub source: String,
}

/// Binary image (object icons)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Icon {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Parsed domain representation, one variant per handler kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum Representation {
    Restful(Restful),
    Menubars(Menubars),
    User(User),
    Version(Version),
    Services(LinkList),
    DomainTypes(LinkList),
    MemberDescription(MemberDescription),
    DomainType(DomainType),
    Action(Action),
    ResultList(ResultList),
    ResultObject(ResultObject),
    ResultValue(ResultValue),
    Layout(Layout),
    LayoutXml(LayoutXml),
    Property(Property),
    Collection(Collection),
    Object(DomainObject),
    Member(Member),
    HttpError(HttpError),
    Unauthorized(Unauthorized),
    Diagram(Diagram),
    Icon(Icon),
    /// Produced by handlers registered outside this crate
    Custom(Value),
}

impl Representation {
    pub fn kind(&self) -> &'static str {
        match self {
            Representation::Restful(_) => "restful",
            Representation::Menubars(_) => "menubars",
            Representation::User(_) => "user",
            Representation::Version(_) => "version",
            Representation::Services(_) => "services",
            Representation::DomainTypes(_) => "domain-types",
            Representation::MemberDescription(_) => "member-description",
            Representation::DomainType(_) => "domain-type",
            Representation::Action(_) => "action",
            Representation::ResultList(_) => "result-list",
            Representation::ResultObject(_) => "result-object",
            Representation::ResultValue(_) => "result-value",
            Representation::Layout(_) => "layout",
            Representation::LayoutXml(_) => "layout-xml",
            Representation::Property(_) => "property",
            Representation::Collection(_) => "collection",
            Representation::Object(_) => "object",
            Representation::Member(_) => "member",
            Representation::HttpError(_) => "http-error",
            Representation::Unauthorized(_) => "unauthorized",
            Representation::Diagram(_) => "diagram",
            Representation::Icon(_) => "icon",
            Representation::Custom(_) => "custom",
        }
    }

    /// Links carried by the representation, if it has any
    pub fn links(&self) -> &[Link] {
        match self {
            Representation::Restful(r) => &r.links,
            Representation::User(r) => &r.links,
            Representation::Version(r) => &r.links,
            Representation::Services(r) | Representation::DomainTypes(r) => &r.links,
            Representation::MemberDescription(r) => &r.links,
            Representation::DomainType(r) => &r.links,
            Representation::Action(r) => &r.links,
            Representation::ResultList(r) => &r.links,
            Representation::ResultObject(r) => &r.links,
            Representation::ResultValue(r) => &r.links,
            Representation::Layout(r) => &r.links,
            Representation::Property(r) => &r.links,
            Representation::Collection(r) => &r.links,
            Representation::Object(r) => &r.links,
            Representation::Member(r) => &r.links,
            Representation::Menubars(_)
            | Representation::LayoutXml(_)
            | Representation::HttpError(_)
            | Representation::Unauthorized(_)
            | Representation::Diagram(_)
            | Representation::Icon(_)
            | Representation::Custom(_) => &[],
        }
    }
}
