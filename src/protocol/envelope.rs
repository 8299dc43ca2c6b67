//! Response envelope: the immutable record of one HTTP exchange
//!
//! The network layer builds one [`ResponseEnvelope`] per exchange and hands it to
//! the dispatcher. Request and response data never change after construction;
//! only the [`ProcessingState`] moves forward, exactly once.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::media_type::MediaType;
use super::repr_types::ReprType;
use crate::error::{Diagnostic, DispatchError, DispatchResult};

/// HTTP methods used by Restful Objects clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            "PATCH" => Ok(HttpMethod::Patch),
            other => Err(format!("Unsupported HTTP method: {other}")),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processing state of an envelope
///
/// `Unprocessed` moves to either terminal state exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProcessingState {
    #[default]
    Unprocessed,
    Processed {
        handler: String,
    },
    Failed {
        handler: String,
        diagnostic: Diagnostic,
    },
}

impl ProcessingState {
    pub fn label(&self) -> &'static str {
        match self {
            ProcessingState::Unprocessed => "unprocessed",
            ProcessingState::Processed { .. } => "processed",
            ProcessingState::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProcessingState::Unprocessed)
    }

    /// Name of the handler that moved the envelope into its terminal state
    pub fn handler(&self) -> Option<&str> {
        match self {
            ProcessingState::Unprocessed => None,
            ProcessingState::Processed { handler } | ProcessingState::Failed { handler, .. } => {
                Some(handler)
            }
        }
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            ProcessingState::Failed { diagnostic, .. } => Some(diagnostic),
            _ => None,
        }
    }
}

/// Serializable form of an envelope, used for fixtures and the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeRecord {
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default, alias = "contentType")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub body: String,
}

fn default_status() -> u16 {
    200
}

impl From<EnvelopeRecord> for ResponseEnvelope {
    fn from(record: EnvelopeRecord) -> Self {
        ResponseEnvelope::new(record.method, record.url, record.status)
            .with_content_type_opt(record.content_type.as_deref())
            .with_body(record.body)
    }
}

/// Immutable record of one HTTP exchange
#[derive(Debug)]
pub struct ResponseEnvelope {
    id: Uuid,
    url: String,
    method: HttpMethod,
    status: u16,
    body: Vec<u8>,
    content_type: Option<MediaType>,
    received_at: DateTime<Utc>,
    state: ProcessingState,
    path: OnceCell<String>,
    json: OnceCell<Option<Value>>,
}

impl ResponseEnvelope {
    /// Create an envelope with an empty body and no content type
    pub fn new(method: HttpMethod, url: impl Into<String>, status: u16) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            method,
            status,
            body: Vec::new(),
            content_type: None,
            received_at: Utc::now(),
            state: ProcessingState::Unprocessed,
            path: OnceCell::new(),
            json: OnceCell::new(),
        }
    }

    /// Convenience constructor for a `200 GET`
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url, 200)
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self.json = OnceCell::new();
        self
    }

    pub fn with_content_type(self, content_type: &str) -> Self {
        self.with_content_type_opt(Some(content_type))
    }

    fn with_content_type_opt(mut self, content_type: Option<&str>) -> Self {
        self.content_type = content_type
            .filter(|raw| !raw.trim().is_empty())
            .map(MediaType::parse);
        self.json = OnceCell::new();
        self
    }

    /// Declare a vocabulary profile as `application/json;profile="..."`
    pub fn with_repr_type(self, repr: ReprType) -> Self {
        self.with_content_type(&repr.content_type())
    }

    pub fn with_received_at(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = received_at;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn content_type(&self) -> Option<&MediaType> {
        self.content_type.as_ref()
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn state(&self) -> &ProcessingState {
        &self.state
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_error_status(&self) -> bool {
        self.status >= 400
    }

    /// Body decoded as UTF-8
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Declared profile resolved against the vocabulary
    pub fn repr_type(&self) -> Option<ReprType> {
        self.content_type.as_ref().and_then(MediaType::repr_type)
    }

    pub fn has_repr_type(&self, repr: ReprType) -> bool {
        self.repr_type() == Some(repr)
    }

    /// Request path without query or fragment, with trailing slashes removed
    pub fn path(&self) -> &str {
        self.path.get_or_init(|| extract_path(&self.url))
    }

    /// Non-empty path segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path().split('/').filter(|s| !s.is_empty())
    }

    pub fn last_segment(&self) -> Option<&str> {
        self.segments().last()
    }

    /// True when the path's final segment equals `segment` (case-insensitive)
    pub fn path_ends_with_segment(&self, segment: &str) -> bool {
        self.last_segment()
            .is_some_and(|last| last.eq_ignore_ascii_case(segment))
    }

    /// True when the path addresses `resource` directly below the first
    /// `restful` segment. An empty `resource` addresses that root itself.
    pub fn is_root_resource(&self, resource: &str) -> bool {
        let mut rest = self
            .segments()
            .skip_while(|s| !s.eq_ignore_ascii_case("restful"));
        if rest.next().is_none() {
            return false;
        }
        match (rest.next(), rest.next()) {
            (None, _) => resource.is_empty(),
            (Some(first), None) => first.eq_ignore_ascii_case(resource),
            _ => false,
        }
    }

    pub fn has_segment(&self, segment: &str) -> bool {
        self.segments().any(|s| s.eq_ignore_ascii_case(segment))
    }

    /// True if the body may be JSON: declared JSON or no declared content type
    pub fn is_json_candidate(&self) -> bool {
        self.content_type.as_ref().map_or(true, MediaType::is_json)
    }

    /// Lazily parsed JSON body; `None` when not a JSON candidate or invalid
    pub fn json(&self) -> Option<&Value> {
        self.json
            .get_or_init(|| {
                if !self.is_json_candidate() || self.body.is_empty() {
                    return None;
                }
                serde_json::from_slice(&self.body).ok()
            })
            .as_ref()
    }

    /// Structural probe: JSON object with the given top-level key
    pub fn has_top_level_key(&self, key: &str) -> bool {
        self.json()
            .and_then(Value::as_object)
            .is_some_and(|obj| obj.contains_key(key))
    }

    /// Structural probe: top-level string field equal to `expected`
    pub fn top_level_str_eq(&self, key: &str, expected: &str) -> bool {
        self.json()
            .and_then(|json| json.get(key))
            .and_then(Value::as_str)
            .is_some_and(|value| value == expected)
    }

    /// Move to `Processed`; only valid from `Unprocessed`
    pub(crate) fn mark_processed(&mut self, handler: &str) -> DispatchResult<()> {
        self.transition(ProcessingState::Processed {
            handler: handler.to_string(),
        })
    }

    /// Move to `Failed`; only valid from `Unprocessed`
    pub(crate) fn mark_failed(&mut self, handler: &str, diagnostic: Diagnostic) -> DispatchResult<()> {
        self.transition(ProcessingState::Failed {
            handler: handler.to_string(),
            diagnostic,
        })
    }

    fn transition(&mut self, next: ProcessingState) -> DispatchResult<()> {
        if self.state.is_terminal() {
            return Err(DispatchError::StateTransition {
                from: self.state.label(),
                to: next.label(),
            });
        }
        self.state = next;
        Ok(())
    }

    /// Serializable snapshot of the request/response data
    pub fn to_record(&self) -> EnvelopeRecord {
        EnvelopeRecord {
            url: self.url.clone(),
            method: self.method,
            status: self.status,
            content_type: self.content_type.as_ref().map(|m| m.as_str().to_string()),
            body: String::from_utf8_lossy(&self.body).into_owned(),
        }
    }
}

/// Path portion of an absolute or relative URL
fn extract_path(raw: &str) -> String {
    let path = match url::Url::parse(raw) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => {
            let without_fragment = raw.split('#').next().unwrap_or_default();
            let without_query = without_fragment.split('?').next().unwrap_or_default();
            without_query.to_string()
        }
    };

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
