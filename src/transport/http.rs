//! reqwest-based fetcher for Restful Objects resources

use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, Instrument};
use url::Url;

use crate::config::{ConfigError, DispatcherConfig, FetchSection};
use crate::fetch_span;
use crate::protocol::{HttpMethod, ResponseEnvelope};

/// Preference order sent with every request
const DEFAULT_ACCEPT: &str = "application/json, application/xml;q=0.9, */*;q=0.8";

/// Fetch errors
///
/// HTTP error statuses are not errors here: a 404 is still a response and goes
/// through dispatch like any other.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Response too large: {size} bytes (max: {max})")]
    ResponseTooLarge { size: usize, max: usize },
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Clone)]
struct Credentials {
    username: String,
    password: Option<String>,
}

/// Fetches resources relative to a Restful Objects base URL
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
    credentials: Option<Credentials>,
    max_response_bytes: usize,
}

impl HttpFetcher {
    /// Create a fetcher without credentials
    pub fn new(section: &FetchSection) -> Result<Self, FetchError> {
        let base_url = parse_url(&section.base_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(section.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            credentials: None,
            max_response_bytes: section.max_response_bytes,
        })
    }

    /// Create a fetcher, resolving basic-auth credentials from the environment
    pub fn from_config(config: &DispatcherConfig) -> Result<Self, FetchError> {
        let fetcher = Self::new(&config.fetch)?;
        let password = config.get_fetch_password()?;

        Ok(match config.get_fetch_username() {
            Some(username) => fetcher.with_credentials(username, password),
            None => fetcher,
        })
    }

    pub fn with_credentials(mut self, username: String, password: Option<String>) -> Self {
        self.credentials = Some(Credentials { username, password });
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an absolute URL, or a path relative to the base URL
    pub fn resolve(&self, path_or_url: &str) -> Result<Url, FetchError> {
        if let Ok(absolute) = Url::parse(path_or_url) {
            if absolute.has_host() {
                return Ok(absolute);
            }
        }
        // `./` keeps a colon in the first segment from reading as a scheme
        self.base_url
            .join(&format!("./{}", path_or_url.trim_start_matches('/')))
            .map_err(|source| FetchError::InvalidUrl {
                url: path_or_url.to_string(),
                source,
            })
    }

    pub async fn get(&self, path_or_url: &str) -> Result<ResponseEnvelope, FetchError> {
        self.fetch(HttpMethod::Get, path_or_url).await
    }

    /// Perform one request and capture the response as an envelope
    pub async fn fetch(
        &self,
        method: HttpMethod,
        path_or_url: &str,
    ) -> Result<ResponseEnvelope, FetchError> {
        let url = self.resolve(path_or_url)?;
        let span = fetch_span!(method = %method, url = %url);

        async move {
            let mut request = self
                .client
                .request(to_reqwest_method(method), url.clone())
                .header(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));

            if let Some(credentials) = &self.credentials {
                request = request.basic_auth(&credentials.username, credentials.password.as_ref());
            }

            let mut response = request.send().await?;
            let status = response.status().as_u16();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            if let Some(declared) = response.content_length() {
                check_declared_length(declared, self.max_response_bytes)?;
            }

            let mut body = Vec::new();
            while let Some(chunk) = response.chunk().await? {
                if body.len() + chunk.len() > self.max_response_bytes {
                    return Err(FetchError::ResponseTooLarge {
                        size: body.len() + chunk.len(),
                        max: self.max_response_bytes,
                    });
                }
                body.extend_from_slice(&chunk);
            }

            debug!(
                status,
                bytes = body.len(),
                content_type = content_type.as_deref().unwrap_or_default(),
                "Response received"
            );

            let envelope = ResponseEnvelope::new(method, url.to_string(), status).with_body(body);
            Ok(match content_type {
                Some(content_type) => envelope.with_content_type(&content_type),
                None => envelope,
            })
        }
        .instrument(span)
        .await
    }
}

fn parse_url(raw: &str) -> Result<Url, FetchError> {
    Url::parse(raw).map_err(|source| FetchError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

/// Reject a declared `Content-Length` above `max` before reading the body
fn check_declared_length(declared: u64, max: usize) -> Result<(), FetchError> {
    let size = usize::try_from(declared).unwrap_or(usize::MAX);
    if size > max {
        return Err(FetchError::ResponseTooLarge { size, max });
    }
    Ok(())
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
        HttpMethod::Patch => Method::PATCH,
    }
}
