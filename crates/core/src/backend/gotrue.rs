use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::errors::CoreError;
use crate::models::profile::{CurrentUser, ProfilePatch};

use super::traits::IdentityProvider;

const BACKEND_NAME: &str = "GoTrue";

/// Identity service on a hosted GoTrue auth endpoint (`{url}/auth/v1`).
///
/// Only reads the session user and updates its metadata; sign-in, sign-up
/// and password reset stay with the hosted service.
pub struct GoTrueIdentity {
    client: Client,
    config: BackendConfig,
}

impl GoTrueIdentity {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: config.http_client(),
            config,
        }
    }

    /// `{auth}/user`, the session user's resource.
    pub fn user_url(&self) -> String {
        format!("{}/user", self.config.auth_url())
    }

    fn parse_error(e: reqwest::Error) -> CoreError {
        CoreError::Api {
            backend: BACKEND_NAME.into(),
            message: format!("Failed to parse user response: {e}"),
        }
    }
}

/// Body of a metadata update: `{"data": {...}}`.
#[derive(Serialize)]
pub struct MetadataUpdate<'a> {
    pub data: &'a ProfilePatch,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl IdentityProvider for GoTrueIdentity {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn current_user(&self) -> Result<Option<CurrentUser>, CoreError> {
        let token = match &self.config.access_token {
            Some(token) => token,
            None => return Ok(None),
        };

        debug!("gotrue: fetching session user");
        let response = self
            .client
            .get(self.user_url())
            .header("apikey", &self.config.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "gotrue user lookup failed");
            return Err(CoreError::Api {
                backend: BACKEND_NAME.into(),
                message: format!("user lookup failed with {status}: {body}"),
            });
        }

        response.json().await.map(Some).map_err(Self::parse_error)
    }

    async fn update_user_metadata(&self, patch: &ProfilePatch) -> Result<CurrentUser, CoreError> {
        let token = self
            .config
            .access_token
            .as_deref()
            .ok_or(CoreError::Unauthenticated)?;

        debug!("gotrue: updating user metadata");
        let response = self
            .client
            .put(self.user_url())
            .header("apikey", &self.config.anon_key)
            .bearer_auth(token)
            .json(&MetadataUpdate { data: patch })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CoreError::Unauthenticated);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "gotrue metadata update failed");
            return Err(CoreError::Api {
                backend: BACKEND_NAME.into(),
                message: format!("metadata update failed with {status}: {body}"),
            });
        }

        response.json().await.map_err(Self::parse_error)
    }
}
