use std::time::Duration;

use openai_provider_core::RetrySettings;

use crate::errors::ClientError;
use crate::transport::AuthScope;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Provider-wide configuration, fixed once the provider is configured.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// Project API key used for bearer auth on regular endpoints.
    pub api_key: String,
    /// Admin key used for `/organization/...` endpoints.
    pub admin_key: Option<String>,
    /// Sent as `OpenAI-Organization` when set.
    pub organization_id: Option<String>,
    /// Base URL including the version prefix.
    ///
    /// Useful for proxies or local test servers.
    pub base_url: String,
    /// Default HTTP timeout for requests.
    pub timeout: Duration,
    /// Retry budget for eventually consistent reads.
    pub retry: RetrySettings,
}

impl ProviderConfig {
    /// Creates a config with sensible defaults and a provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            admin_key: None,
            organization_id: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
            retry: RetrySettings::default(),
        }
    }

    /// Builds a config from `OPENAI_API_KEY`, `OPENAI_ADMIN_KEY`,
    /// `OPENAI_ORGANIZATION_ID` and `OPENAI_BASE_URL`.
    pub fn from_env() -> Result<Self, ClientError> {
        let mut config = Self::new(std::env::var("OPENAI_API_KEY").unwrap_or_default());
        config.admin_key = non_empty_env("OPENAI_ADMIN_KEY");
        config.organization_id = non_empty_env("OPENAI_ORGANIZATION_ID");
        if let Some(base_url) = non_empty_env("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn admin_key(mut self, admin_key: impl Into<String>) -> Self {
        self.admin_key = Some(admin_key.into());
        self
    }

    pub fn organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// Overrides the API base URL (for proxies or test servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the default HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry(mut self, retry: RetrySettings) -> Self {
        self.retry = retry;
        self
    }

    /// Checks that at least one credential is present, the base URL is usable
    /// and the retry budget allows an attempt.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.api_key.trim().is_empty()
            && self.admin_key.as_deref().is_none_or(|k| k.trim().is_empty())
        {
            return Err(ClientError::Config(
                "missing OPENAI_API_KEY or OPENAI_ADMIN_KEY for OpenAI provider".into(),
            ));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "base_url must start with http:// or https:// (got {})",
                self.base_url
            )));
        }
        if self.retry.max_attempts < 1 {
            return Err(ClientError::Config("retry.max_attempts must be at least 1".into()));
        }
        Ok(())
    }

    /// Picks the bearer token for an endpoint's auth scope.
    ///
    /// Admin endpoints prefer the admin key and fall back to the API key.
    pub fn key_for(&self, scope: AuthScope) -> Result<&str, ClientError> {
        let api_key = Some(self.api_key.as_str()).filter(|k| !k.trim().is_empty());
        let admin_key = self.admin_key.as_deref().filter(|k| !k.trim().is_empty());
        match scope {
            AuthScope::Project => api_key.ok_or_else(|| {
                ClientError::Config("api_key is required for this endpoint".into())
            }),
            AuthScope::Admin => admin_key.or(api_key).ok_or_else(|| {
                ClientError::Config("admin_key is required for organization endpoints".into())
            }),
        }
    }

    pub(crate) fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
