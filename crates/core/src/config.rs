use std::time::Duration;

use crate::errors::CoreError;

pub const ENV_URL: &str = "FINANCE_BACKEND_URL";
pub const ENV_ANON_KEY: &str = "FINANCE_BACKEND_ANON_KEY";
pub const ENV_ACCESS_TOKEN: &str = "FINANCE_BACKEND_ACCESS_TOKEN";

/// Default request timeout for every backend call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the hosted backend (REST data API + auth API).
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    /// Project base URL, without trailing slash (e.g. `https://xyz.example.co`)
    pub url: String,

    /// Public (anonymous) API key, sent as `apikey` on every request
    pub anon_key: String,

    /// Session token of the signed-in user; `None` means signed out
    pub access_token: Option<String>,

    pub timeout: Duration,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self, CoreError> {
        let url = url.into().trim().trim_end_matches('/').to_string();
        let anon_key = anon_key.into().trim().to_string();

        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(CoreError::Config(format!(
                "Backend URL must start with http:// or https://, got '{url}'"
            )));
        }
        if anon_key.is_empty() {
            return Err(CoreError::Config("Backend API key must not be empty".into()));
        }

        Ok(Self {
            url,
            anon_key,
            access_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Read `FINANCE_BACKEND_URL`, `FINANCE_BACKEND_ANON_KEY` and the optional
    /// `FINANCE_BACKEND_ACCESS_TOKEN` from the process environment.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`BackendConfig::from_env`] with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let url = lookup(ENV_URL).ok_or_else(|| CoreError::Config(format!("{ENV_URL} is not set")))?;
        let key =
            lookup(ENV_ANON_KEY).ok_or_else(|| CoreError::Config(format!("{ENV_ANON_KEY} is not set")))?;
        let config = Self::new(url, key)?;
        Ok(match lookup(ENV_ACCESS_TOKEN).filter(|t| !t.trim().is_empty()) {
            Some(token) => config.with_access_token(token),
            None => config,
        })
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base of the REST data API.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url)
    }

    /// Base of the auth API.
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.url)
    }

    /// Value of the `Authorization` header: the user's session when signed
    /// in, otherwise the anonymous key.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token.as_deref().unwrap_or(&self.anon_key))
    }

    /// HTTP client honouring the configured timeout.
    pub(crate) fn http_client(&self) -> reqwest::Client {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(self.timeout);
        builder.build().unwrap_or_else(|_| reqwest::Client::new())
    }
}
