//! Dispatcher configuration
//!
//! Every section is optional; an empty file yields the defaults. Credentials
//! are named by environment variable and resolved when they are used, never
//! stored in the loaded config.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::error::DEFAULT_MAX_DIAGNOSTIC_LEN;

/// Smallest accepted `max_diagnostic_len`
pub const MIN_DIAGNOSTIC_LEN: usize = 32;

/// Top-level configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DispatcherConfig {
    #[serde(default)]
    pub dispatcher: DispatcherSection,
    #[serde(default)]
    pub chain: ChainSection,
    #[serde(default)]
    pub fetch: FetchSection,
}

/// Dispatcher behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DispatcherSection {
    /// Label used in logs (must match [a-zA-Z0-9._-]+)
    #[serde(default = "default_name")]
    pub name: String,
    /// Upper bound on diagnostic message length, in characters
    #[serde(default = "default_max_diagnostic_len")]
    pub max_diagnostic_len: usize,
    /// Convert handler panics into failed envelopes
    #[serde(default = "default_catch_panics")]
    pub catch_panics: bool,
}

impl Default for DispatcherSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            max_diagnostic_len: default_max_diagnostic_len(),
            catch_panics: default_catch_panics(),
        }
    }
}

/// Chain assembly
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChainSection {
    /// Built-in handler names to leave out of the standard chain
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// HTTP fetch adapter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchSection {
    /// Restful Objects root; relative paths are resolved against it
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable containing username
    pub username_env: Option<String>,
    /// Environment variable containing password
    pub password_env: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username_env: None,
            password_env: None,
            timeout_secs: default_timeout_secs(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

fn default_name() -> String {
    "ro-dispatch".to_string()
}

fn default_max_diagnostic_len() -> usize {
    DEFAULT_MAX_DIAGNOSTIC_LEN
}

fn default_catch_panics() -> bool {
    true
}

fn default_base_url() -> String {
    "http://localhost:8080/restful/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_response_bytes() -> usize {
    4 * 1024 * 1024
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
    #[error("Invalid dispatcher name: {0}")]
    InvalidName(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DispatcherConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DispatcherConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_name(&self.dispatcher.name)?;

        if self.dispatcher.max_diagnostic_len < MIN_DIAGNOSTIC_LEN {
            return Err(ConfigError::InvalidConfig(format!(
                "max_diagnostic_len must be at least {MIN_DIAGNOSTIC_LEN}, got {}",
                self.dispatcher.max_diagnostic_len
            )));
        }

        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "fetch.timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.fetch.max_response_bytes == 0 {
            return Err(ConfigError::InvalidConfig(
                "fetch.max_response_bytes must be greater than zero".to_string(),
            ));
        }

        url::Url::parse(&self.fetch.base_url).map_err(|e| {
            ConfigError::InvalidConfig(format!("fetch.base_url '{}': {e}", self.fetch.base_url))
        })?;

        Ok(())
    }

    fn get_env_var_optional(env_var_name: Option<&String>) -> Option<String> {
        env_var_name.and_then(|name| std::env::var(name).ok())
    }

    fn get_env_var_required(env_var_name: &str) -> Result<String, ConfigError> {
        std::env::var(env_var_name)
            .map_err(|_| ConfigError::EnvVarNotFound(env_var_name.to_string()))
    }

    /// Get fetch username from its environment variable
    pub fn get_fetch_username(&self) -> Option<String> {
        Self::get_env_var_optional(self.fetch.username_env.as_ref())
    }

    /// Get fetch password from its environment variable
    ///
    /// Fails if a password variable is configured but unset, so a missing
    /// secret is reported instead of silently sending no credentials.
    pub fn get_fetch_password(&self) -> Result<Option<String>, ConfigError> {
        self.fetch
            .password_env
            .as_deref()
            .map(Self::get_env_var_required)
            .transpose()
    }
}

/// Validate the dispatcher label against [a-zA-Z0-9._-]+
fn validate_name(name: &str) -> Result<(), ConfigError> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-');

    if name.is_empty() || !valid_chars {
        return Err(ConfigError::InvalidName(format!(
            "Dispatcher name '{name}' must match pattern [a-zA-Z0-9._-]+"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let toml_content = r#"
[dispatcher]
name = "demo"
max_diagnostic_len = 200
catch_panics = false

[chain]
exclude = ["diagram", "icon"]

[fetch]
base_url = "https://demo.example.org/restful/"
username_env = "RO_USERNAME"
password_env = "RO_PASSWORD"
timeout_secs = 5
max_response_bytes = 1024
"#;

        let config = DispatcherConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.dispatcher.name, "demo");
        assert_eq!(config.dispatcher.max_diagnostic_len, 200);
        assert!(!config.dispatcher.catch_panics);
        assert_eq!(config.chain.exclude, vec!["diagram", "icon"]);
        assert_eq!(config.fetch.base_url, "https://demo.example.org/restful/");
        assert_eq!(config.fetch.username_env.as_deref(), Some("RO_USERNAME"));
        assert_eq!(config.fetch.timeout_secs, 5);
        assert_eq!(config.fetch.max_response_bytes, 1024);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DispatcherConfig::from_toml_str("").unwrap();
        assert_eq!(config, DispatcherConfig::default());
        assert_eq!(config.dispatcher.max_diagnostic_len, 500);
        assert!(config.dispatcher.catch_panics);
        assert!(config.chain.exclude.is_empty());
        assert_eq!(config.fetch.base_url, "http://localhost:8080/restful/");
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.fetch.max_response_bytes, 4_194_304);
    }

    #[test]
    fn test_invalid_name() {
        assert!(validate_name("invalid@name").is_err());
        assert!(validate_name("").is_err());
        assert!(validate_name("valid-name_123.test").is_ok());
    }

    #[test]
    fn test_diagnostic_len_lower_bound() {
        let result = DispatcherConfig::from_toml_str("[dispatcher]\nmax_diagnostic_len = 10\n");
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = DispatcherConfig::from_toml_str("[fetch]\nbase_url = \"not a url\"\n");
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_unset_password_env_is_an_error() {
        let mut config = DispatcherConfig::default();
        config.fetch.password_env = Some("RO_DISPATCH_TEST_UNSET_PASSWORD".to_string());
        assert!(matches!(
            config.get_fetch_password(),
            Err(ConfigError::EnvVarNotFound(_))
        ));

        config.fetch.password_env = None;
        assert!(config.get_fetch_password().unwrap().is_none());
    }
}
