//! Representation-type vocabulary
//!
//! The controlled set of profile URNs that identify hypermedia response
//! shapes. Restful Objects defines the `urn:org.restfulobjects:repr-types/`
//! namespace; Apache Isis adds layout and menu representations under its own.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const RO_PROFILE_PREFIX: &str = "urn:org.restfulobjects:repr-types/";
pub const ISIS_PROFILE_PREFIX: &str = "urn:org.apache.isis/v2/";

/// Known representation types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReprType {
    Homepage,
    User,
    Version,
    List,
    Object,
    ObjectProperty,
    ObjectCollection,
    ObjectAction,
    ActionResult,
    TypeList,
    DomainType,
    PropertyDescription,
    CollectionDescription,
    ActionDescription,
    ActionParamDescription,
    Error,
    ObjectLayout,
    Menubars,
}

impl ReprType {
    pub const ALL: [ReprType; 18] = [
        ReprType::Homepage,
        ReprType::User,
        ReprType::Version,
        ReprType::List,
        ReprType::Object,
        ReprType::ObjectProperty,
        ReprType::ObjectCollection,
        ReprType::ObjectAction,
        ReprType::ActionResult,
        ReprType::TypeList,
        ReprType::DomainType,
        ReprType::PropertyDescription,
        ReprType::CollectionDescription,
        ReprType::ActionDescription,
        ReprType::ActionParamDescription,
        ReprType::Error,
        ReprType::ObjectLayout,
        ReprType::Menubars,
    ];

    /// Short name as it appears after the namespace prefix
    pub fn name(&self) -> &'static str {
        match self {
            ReprType::Homepage => "homepage",
            ReprType::User => "user",
            ReprType::Version => "version",
            ReprType::List => "list",
            ReprType::Object => "object",
            ReprType::ObjectProperty => "object-property",
            ReprType::ObjectCollection => "object-collection",
            ReprType::ObjectAction => "object-action",
            ReprType::ActionResult => "action-result",
            ReprType::TypeList => "type-list",
            ReprType::DomainType => "domain-type",
            ReprType::PropertyDescription => "property-description",
            ReprType::CollectionDescription => "collection-description",
            ReprType::ActionDescription => "action-description",
            ReprType::ActionParamDescription => "action-param-description",
            ReprType::Error => "error",
            ReprType::ObjectLayout => "object-layout",
            ReprType::Menubars => "menubars",
        }
    }

    fn namespace(&self) -> &'static str {
        match self {
            ReprType::ObjectLayout | ReprType::Menubars => ISIS_PROFILE_PREFIX,
            _ => RO_PROFILE_PREFIX,
        }
    }

    /// Full profile URN, e.g. `urn:org.restfulobjects:repr-types/object`
    pub fn urn(&self) -> String {
        format!("{}{}", self.namespace(), self.name())
    }

    /// Content-type header value declaring this profile
    pub fn content_type(&self) -> String {
        format!("application/json;profile=\"{}\"", self.urn())
    }

    /// Resolve a profile string against the vocabulary (exact, case-insensitive)
    pub fn from_profile(profile: &str) -> Option<Self> {
        let profile = profile.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|repr| {
                let namespace = repr.namespace();
                profile.len() == namespace.len() + repr.name().len()
                    && profile
                        .get(..namespace.len())
                        .is_some_and(|p| p.eq_ignore_ascii_case(namespace))
                    && profile
                        .get(namespace.len()..)
                        .is_some_and(|n| n.eq_ignore_ascii_case(repr.name()))
            })
    }

    /// True if the profile sits in a namespace this vocabulary owns
    pub fn is_known_namespace(profile: &str) -> bool {
        let lower = profile.trim().to_ascii_lowercase();
        lower.starts_with(RO_PROFILE_PREFIX) || lower.starts_with(ISIS_PROFILE_PREFIX)
    }
}

impl fmt::Display for ReprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_urn_resolves_to_itself() {
        for repr in ReprType::ALL {
            assert_eq!(ReprType::from_profile(&repr.urn()), Some(repr), "{repr}");
        }
    }

    #[test]
    fn test_from_profile_is_case_insensitive() {
        assert_eq!(
            ReprType::from_profile("URN:ORG.RESTFULOBJECTS:REPR-TYPES/Domain-Type"),
            Some(ReprType::DomainType)
        );
    }

    #[test]
    fn test_prefix_alone_is_not_a_match() {
        assert_eq!(ReprType::from_profile(RO_PROFILE_PREFIX), None);
        assert_eq!(
            ReprType::from_profile("urn:org.restfulobjects:repr-types/object-extra"),
            None
        );
        assert!(ReprType::is_known_namespace(
            "urn:org.restfulobjects:repr-types/object-extra"
        ));
    }

    #[test]
    fn test_isis_namespace() {
        assert_eq!(
            ReprType::Menubars.urn(),
            "urn:org.apache.isis/v2/menubars"
        );
        assert_eq!(
            ReprType::from_profile("urn:org.restfulobjects:repr-types/menubars"),
            None
        );
    }

    #[test]
    fn test_content_type_format() {
        assert_eq!(
            ReprType::DomainType.content_type(),
            "application/json;profile=\"urn:org.restfulobjects:repr-types/domain-type\""
        );
    }
}
