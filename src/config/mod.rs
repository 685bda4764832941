//! Configuration types for the Playforge client.

use crate::errors::ConfigError;
use crate::resilience::{BackoffPolicy, DispatchMode};
use crate::{DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};
use secrecy::SecretString;
use std::collections::HashMap;
use std::time::Duration;

/// Configuration for the Playforge client.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the backend, without a trailing slash
    pub base_url: String,
    /// Per-project identifier, injected as a request header
    pub project_key: SecretString,
    /// Per-attempt request timeout
    pub request_timeout: Duration,
    /// Maximum number of retry attempts per request
    pub max_retries: u32,
    /// Backoff policy applied between retries
    pub backoff: BackoffPolicy,
    /// Headers attached to every request
    pub default_headers: HashMap<String, String>,
    /// Request dispatch strategy
    pub dispatch_mode: DispatchMode,
    /// Endpoint path template overrides, keyed by endpoint name
    pub path_overrides: HashMap<String, String>,
}

impl ClientConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// Reads `PLAYFORGE_PROJECT_KEY` (required), `PLAYFORGE_BASE_URL`,
    /// `PLAYFORGE_TIMEOUT`, and `PLAYFORGE_MAX_RETRIES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let project_key = std::env::var("PLAYFORGE_PROJECT_KEY")
            .map_err(|_| ConfigError::MissingField {
                name: "PLAYFORGE_PROJECT_KEY",
            })?;

        let mut builder = Self::builder().project_key(SecretString::new(project_key));

        if let Ok(base_url) = std::env::var("PLAYFORGE_BASE_URL") {
            builder = builder.base_url(base_url);
        }
        if let Some(timeout) = std::env::var("PLAYFORGE_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            builder = builder.request_timeout(Duration::from_secs(timeout));
        }
        if let Some(max_retries) = std::env::var("PLAYFORGE_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            builder = builder.max_retries(max_retries);
        }

        builder.build()
    }

    /// Resolves the template for an endpoint, honoring overrides.
    pub fn path_template<'a>(&'a self, endpoint: &str, default: &'a str) -> &'a str {
        self.path_overrides
            .get(endpoint)
            .map(String::as_str)
            .unwrap_or(default)
    }

    /// Joins a path onto the base URL.
    pub fn endpoint_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    project_key: Option<SecretString>,
    request_timeout: Option<Duration>,
    max_retries: Option<u32>,
    backoff: Option<BackoffPolicy>,
    default_headers: HashMap<String, String>,
    dispatch_mode: DispatchMode,
    path_overrides: HashMap<String, String>,
}

impl ClientConfigBuilder {
    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the project key.
    pub fn project_key(mut self, project_key: SecretString) -> Self {
        self.project_key = Some(project_key);
        self
    }

    /// Sets the per-attempt request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the maximum number of retries.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Sets the backoff policy.
    pub fn backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = Some(backoff);
        self
    }

    /// Adds a header sent with every request.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Sets the dispatch mode.
    pub fn dispatch_mode(mut self, mode: DispatchMode) -> Self {
        self.dispatch_mode = mode;
        self
    }

    /// Overrides the path template for an endpoint.
    pub fn path_override(
        mut self,
        endpoint: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.path_overrides.insert(endpoint.into(), template.into());
        self
    }

    /// Builds the configuration, validating the base URL.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let project_key = self.project_key.ok_or(ConfigError::MissingField {
            name: "project_key",
        })?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        url::Url::parse(&base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: base_url.clone(),
            source,
        })?;
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(ClientConfig {
            base_url,
            project_key,
            request_timeout: self
                .request_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            backoff: self.backoff.unwrap_or_default(),
            default_headers: self.default_headers,
            dispatch_mode: self.dispatch_mode,
            path_overrides: self.path_overrides,
        })
    }
}
