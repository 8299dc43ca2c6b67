//! Representative Restful Objects responses, one per built-in handler
//!
//! Shapes follow what an Apache Isis demo application serves.

use crate::protocol::{HttpMethod, ReprType, ResponseEnvelope};

const BASE: &str = "http://localhost:8080/restful";

/// A captured response and the handler expected to claim it
#[derive(Debug, Clone)]
pub struct Fixture {
    pub expected_handler: &'static str,
    pub url: String,
    pub method: HttpMethod,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Fixture {
    fn new(expected_handler: &'static str, path: &str) -> Self {
        Self {
            expected_handler,
            url: format!("{BASE}{path}"),
            method: HttpMethod::Get,
            status: 200,
            content_type: None,
            body: Vec::new(),
        }
    }

    fn profile(mut self, repr: ReprType) -> Self {
        self.content_type = Some(repr.content_type());
        self
    }

    fn content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Fresh, unprocessed envelope for this fixture
    pub fn envelope(&self) -> ResponseEnvelope {
        let envelope = ResponseEnvelope::new(self.method, self.url.clone(), self.status)
            .with_body(self.body.clone());
        match &self.content_type {
            Some(content_type) => envelope.with_content_type(content_type),
            None => envelope,
        }
    }
}

pub const COLLECTION_DESCRIPTION_BODY: &str = r#"{
  "id" : "entities",
  "memberType" : "collection",
  "links" : [ {
    "rel" : "self",
    "href" : "http://localhost:8080/restful/domain-types/demo.JavaLangStrings/collections/entities",
    "method" : "GET",
    "type" : "application/json;profile=\"urn:org.restfulobjects:repr-types/collection-description\""
  }, {
    "rel" : "up",
    "href" : "http://localhost:8080/restful/domain-types/demo.JavaLangStrings",
    "method" : "GET",
    "type" : "application/json;profile=\"urn:org.restfulobjects:repr-types/domain-type\""
  }, {
    "rel" : "urn:org.restfulobjects:rels/return-type",
    "href" : "http://localhost:8080/restful/domain-types/java.util.List",
    "method" : "GET",
    "type" : "application/json;profile=\"urn:org.restfulobjects:repr-types/domain-type\""
  } ],
  "extensions" : {
    "friendlyName" : "Entities",
    "description" : "",
    "friendlyNameForm" : "static"
  }
}"#;

pub const DOMAIN_TYPE_BODY: &str = r#"{
  "canonicalName" : "demo.JavaLangStrings",
  "members" : [ {
    "rel" : "urn:org.restfulobjects:rels/collection-description",
    "href" : "http://localhost:8080/restful/domain-types/demo.JavaLangStrings/collections/entities",
    "method" : "GET"
  } ],
  "typeActions" : [ ],
  "links" : [ {
    "rel" : "self",
    "href" : "http://localhost:8080/restful/domain-types/demo.JavaLangStrings",
    "method" : "GET"
  } ],
  "extensions" : { "friendlyName" : "Java Lang Strings", "isService" : false }
}"#;

pub const OBJECT_BODY: &str = r#"{
  "domainType" : "demo.JavaLangStringEntity",
  "instanceId" : "1",
  "title" : "Hello",
  "members" : {
    "name" : { "id" : "name", "memberType" : "property", "value" : "Hello", "links" : [ ] },
    "delete" : { "id" : "delete", "memberType" : "action", "links" : [ ] },
    "children" : { "id" : "children", "memberType" : "collection", "links" : [ ] }
  },
  "links" : [ {
    "rel" : "self",
    "href" : "http://localhost:8080/restful/objects/demo.JavaLangStringEntity/1",
    "method" : "GET"
  } ],
  "extensions" : { "oid" : "demo.JavaLangStringEntity:1" }
}"#;

const LAYOUT_XML_BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<bs3:grid xmlns:bs3="http://isis.apache.org/applib/layout/grid/bootstrap3">
    <bs3:row>
        <bs3:col span="12" unreferencedActions="true"/>
    </bs3:row>
</bs3:grid>"#;

const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// One fixture per built-in handler plus one that nothing recognizes
pub fn standard_fixtures() -> Vec<Fixture> {
    let entity = "/objects/demo.JavaLangStringEntity/1";
    let menu_invoke = "/services/demo.JavaLangStrings/actions";

    vec![
        Fixture::new("http-401", "/user")
            .status(401)
            .content_type("text/plain")
            .body("Unauthorized"),
        Fixture::new("http-error", "/objects/demo.Missing/99")
            .status(404)
            .profile(ReprType::Error)
            .body(r#"{"httpStatusCode": 404, "message": "Could not locate object"}"#),
        Fixture::new("restful", "/")
            .profile(ReprType::Homepage)
            .body(format!(
                r#"{{"links": [{{"rel": "self", "href": "{BASE}/"}}, {{"rel": "urn:org.restfulobjects:rels/user", "href": "{BASE}/user"}}], "extensions": {{}}}}"#
            )),
        Fixture::new("menubars", "/menuBars")
            .profile(ReprType::Menubars)
            .body(r#"{"primary": {"menu": []}, "secondary": {"menu": []}, "tertiary": {"menu": []}}"#),
        Fixture::new("user", "/user")
            .profile(ReprType::User)
            .body(r#"{"userName": "sven", "roles": ["iniRealm:admin_role"], "links": []}"#),
        Fixture::new("version", "/version")
            .profile(ReprType::Version)
            .body(r#"{"specVersion": "1.0.0", "implVersion": "2.0.0", "optionalCapabilities": {"blobsClobs": "yes"}, "links": []}"#),
        Fixture::new("services", "/services")
            .profile(ReprType::List)
            .body(format!(
                r#"{{"value": [{{"rel": "urn:org.restfulobjects:rels/service;serviceId=\"demo.JavaLangStrings\"", "href": "{BASE}/services/demo.JavaLangStrings", "title": "Strings"}}], "links": []}}"#
            )),
        Fixture::new("domain-types", "/domain-types")
            .profile(ReprType::TypeList)
            .body(format!(
                r#"{{"values": [{{"rel": "urn:org.restfulobjects:rels/domain-type", "href": "{BASE}/domain-types/demo.JavaLangStrings"}}], "links": []}}"#
            )),
        Fixture::new(
            "collection-description",
            "/domain-types/demo.JavaLangStrings/collections/entities",
        )
        .profile(ReprType::CollectionDescription)
        .body(COLLECTION_DESCRIPTION_BODY),
        Fixture::new(
            "property-description",
            "/domain-types/demo.JavaLangStringEntity/properties/name",
        )
        .profile(ReprType::PropertyDescription)
        .body(r#"{"id": "name", "memberType": "property", "links": [], "extensions": {"friendlyName": "Name"}}"#),
        Fixture::new(
            "action-param-description",
            "/domain-types/demo.JavaLangStringEntity/actions/updateName/params/newName",
        )
        .profile(ReprType::ActionParamDescription)
        .body(r#"{"id": "newName", "links": [], "extensions": {"friendlyName": "New Name"}}"#),
        Fixture::new(
            "action-description",
            "/domain-types/demo.JavaLangStringEntity/actions/updateName",
        )
        .profile(ReprType::ActionDescription)
        .body(r#"{"id": "updateName", "memberType": "action", "links": [], "extensions": {}}"#),
        Fixture::new("domain-type", "/domain-types/demo.JavaLangStrings")
            .profile(ReprType::DomainType)
            .body(DOMAIN_TYPE_BODY),
        Fixture::new("action", &format!("{menu_invoke}/entities"))
            .profile(ReprType::ObjectAction)
            .body(r#"{"id": "entities", "memberType": "action", "parameters": {}, "links": []}"#),
        Fixture::new("result-list", &format!("{menu_invoke}/entities/invoke"))
            .profile(ReprType::ActionResult)
            .body(format!(
                r#"{{"resultType": "list", "result": {{"value": [{{"rel": "urn:org.restfulobjects:rels/element", "href": "{BASE}{entity}", "title": "Hello"}}], "links": []}}, "links": []}}"#
            )),
        Fixture::new("result-object", &format!("{menu_invoke}/first/invoke"))
            .method(HttpMethod::Post)
            .profile(ReprType::ActionResult)
            .body(format!(r#"{{"resultType": "object", "result": {OBJECT_BODY}}}"#)),
        Fixture::new("result-value", &format!("{menu_invoke}/count/invoke"))
            .profile(ReprType::ActionResult)
            .body(r#"{"resultType": "scalar", "result": {"value": 3, "links": []}}"#),
        Fixture::new("layout-xml", &format!("{entity}/object-layout"))
            .content_type("application/xml;profile=\"urn:org.apache.isis/v2/object-layout\"")
            .body(LAYOUT_XML_BODY),
        Fixture::new("layout", &format!("{entity}/object-layout"))
            .profile(ReprType::ObjectLayout)
            .body(r#"{"row": [{"cols": [{"col": {"span": 12}}]}], "links": []}"#),
        Fixture::new("property", &format!("{entity}/properties/name"))
            .profile(ReprType::ObjectProperty)
            .body(r#"{"id": "name", "memberType": "property", "value": "Hello", "links": []}"#),
        Fixture::new("collection", &format!("{entity}/collections/children"))
            .profile(ReprType::ObjectCollection)
            .body(r#"{"id": "children", "memberType": "collection", "value": [], "links": []}"#),
        Fixture::new("object", entity)
            .profile(ReprType::Object)
            .body(OBJECT_BODY),
        Fixture::new("member", "/objects/demo.JavaLangStringEntity/1/detached")
            .content_type("application/json")
            .body(r#"{"id": "detached", "memberType": "property", "value": null, "links": []}"#),
        Fixture::new("diagram", "/diagrams/demo.JavaLangStringEntity")
            .content_type("text/plain")
            .body("@startuml\nclass JavaLangStringEntity\n@enduml\n"),
        Fixture::new("icon", "/images/demo.JavaLangStringEntity.png")
            .content_type("image/png")
            .body(PNG_HEADER.to_vec()),
        Fixture::new("default", "/unknown")
            .content_type("text/html")
            .body("<html><body>Welcome</body></html>"),
    ]
}
