//! Content-type parsing for hypermedia responses
//!
//! Restful Objects servers declare the representation kind through a
//! `profile` parameter on the content type, e.g.
//! `application/json;profile="urn:org.restfulobjects:repr-types/object"`.
//! Parsing is lenient: the dispatch core only matches against the result,
//! it never rejects a response because of a malformed header.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::repr_types::ReprType;

/// Parsed `Content-Type` header value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaType {
    /// Top-level type, lowercased (e.g. `application`)
    pub main_type: String,
    /// Subtype, lowercased (e.g. `json`, `xml`, `svg+xml`)
    pub sub_type: String,
    /// Parameters in declaration order; names lowercased, values unquoted
    pub params: Vec<(String, String)>,
    raw: String,
}

impl MediaType {
    /// Parse a content-type header value (never fails)
    pub fn parse(raw: &str) -> Self {
        let mut parts = split_params(raw);
        let essence = parts.next().unwrap_or_default();

        let (main_type, sub_type) = match essence.split_once('/') {
            Some((main, sub)) => (main.trim().to_ascii_lowercase(), sub.trim().to_ascii_lowercase()),
            None => (essence.trim().to_ascii_lowercase(), String::new()),
        };

        let params = parts
            .filter_map(|param| {
                let (name, value) = param.split_once('=')?;
                let name = name.trim().to_ascii_lowercase();
                if name.is_empty() {
                    return None;
                }
                Some((name, unquote(value.trim())))
            })
            .collect();

        Self {
            main_type,
            sub_type,
            params,
            raw: raw.trim().to_string(),
        }
    }

    /// The original header value, trimmed
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// `type/subtype` without parameters
    pub fn essence(&self) -> String {
        format!("{}/{}", self.main_type, self.sub_type)
    }

    /// Look up a parameter by (case-insensitive) name
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The declared `profile` parameter, if any
    pub fn profile(&self) -> Option<&str> {
        self.param("profile").filter(|p| !p.is_empty())
    }

    /// The profile resolved against the known vocabulary
    pub fn repr_type(&self) -> Option<ReprType> {
        self.profile().and_then(ReprType::from_profile)
    }

    /// `application/json` or any `+json` structured syntax suffix
    pub fn is_json(&self) -> bool {
        (self.main_type == "application" && self.sub_type == "json")
            || self.sub_type.ends_with("+json")
    }

    /// `application/xml`, `text/xml` or any `+xml` suffix
    pub fn is_xml(&self) -> bool {
        self.sub_type == "xml" || self.sub_type.ends_with("+xml")
    }

    pub fn is_image(&self) -> bool {
        self.main_type == "image"
    }

    pub fn is_text(&self) -> bool {
        self.main_type == "text"
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Split on `;` while respecting double-quoted parameter values
fn split_params(raw: &str) -> impl Iterator<Item = String> + '_ {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for ch in raw.chars() {
        match ch {
            _ if escaped => {
                current.push(ch);
                escaped = false;
            }
            '\\' if in_quotes => {
                current.push(ch);
                escaped = true;
            }
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ';' if !in_quotes => segments.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    segments.push(current);

    segments.into_iter()
}

fn unquote(value: &str) -> String {
    match value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_restful_objects_profile() {
        let media = MediaType::parse(
            "application/json;profile=\"urn:org.restfulobjects:repr-types/collection-description\"",
        );

        assert_eq!(media.main_type, "application");
        assert_eq!(media.sub_type, "json");
        assert_eq!(
            media.profile(),
            Some("urn:org.restfulobjects:repr-types/collection-description")
        );
        assert_eq!(media.repr_type(), Some(ReprType::CollectionDescription));
        assert!(media.is_json());
    }

    #[test]
    fn test_parse_unquoted_profile_and_charset() {
        let media = MediaType::parse(
            "Application/JSON; charset=UTF-8; Profile=urn:org.restfulobjects:repr-types/object",
        );

        assert_eq!(media.essence(), "application/json");
        assert_eq!(media.param("charset"), Some("UTF-8"));
        assert_eq!(media.repr_type(), Some(ReprType::Object));
    }

    #[test]
    fn test_semicolon_inside_quotes_is_kept() {
        let media = MediaType::parse("text/plain;note=\"a;b\";x=1");
        assert_eq!(media.param("note"), Some("a;b"));
        assert_eq!(media.param("x"), Some("1"));
    }

    #[test]
    fn test_malformed_values_do_not_panic() {
        for raw in ["", ";;;", "/", "application", "=;=", "a/b;=c;profile", "\"unterminated"] {
            let media = MediaType::parse(raw);
            assert!(media.repr_type().is_none(), "unexpected profile for {raw:?}");
        }
    }

    #[test]
    fn test_suffix_detection() {
        assert!(MediaType::parse("application/vnd.api+json").is_json());
        assert!(MediaType::parse("image/svg+xml").is_xml());
        assert!(MediaType::parse("image/svg+xml").is_image());
        assert!(MediaType::parse("text/xml").is_xml());
        assert!(!MediaType::parse("text/html").is_json());
    }

    #[test]
    fn test_unknown_profile_is_preserved() {
        let media = MediaType::parse("application/json;profile=\"urn:example:unknown\"");
        assert_eq!(media.profile(), Some("urn:example:unknown"));
        assert_eq!(media.repr_type(), None);
        assert_eq!(media.to_string(), media.as_str());
    }

    proptest! {
        #[test]
        fn parse_never_fails(raw in ".*") {
            let media = MediaType::parse(&raw);
            prop_assert_eq!(media.as_str(), raw.trim());
            prop_assert!(!media.main_type.chars().any(|c| c.is_ascii_uppercase()));
            prop_assert!(media.params.iter().all(|(name, _)| !name.is_empty()));
        }

        #[test]
        fn declared_profile_resolves_quoted_or_not(
            repr in prop::sample::select(ReprType::ALL.to_vec()),
            quoted in any::<bool>(),
            charset in any::<bool>(),
        ) {
            let profile = if quoted {
                format!("\"{}\"", repr.urn())
            } else {
                repr.urn()
            };
            let charset = if charset { "; charset=utf-8" } else { "" };
            let raw = format!("application/json{charset};profile={profile}");

            let media = MediaType::parse(&raw);
            prop_assert_eq!(media.repr_type(), Some(repr));
            let urn = repr.urn();
            prop_assert_eq!(media.profile(), Some(urn.as_str()));
        }
    }
}
