use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::models::{HelixClip, HelixResponse, HelixUser, TokenResponse};
use super::{BroadcasterResolver, ClipFetcher, TokenProvider};
use crate::clip::{AccessToken, Broadcaster, Clip};
use crate::config::{HelixConfig, window_start};
use crate::error::{ApiError, AuthError, FetchError, ResolutionError};

/// Client for the Twitch Helix API using an app access token.
#[derive(Debug, Clone)]
pub struct HelixClient {
    client: Client,
    config: HelixConfig,
}

impl HelixClient {
    const TOKEN_PATH: &str = "/oauth2/token";
    const USERS_PATH: &str = "/helix/users";
    const CLIPS_PATH: &str = "/helix/clips";

    pub fn new(client: Client, config: HelixConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(base: &str, path: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), path)
    }

    fn authorized_get(&self, path: &str, token: &AccessToken) -> RequestBuilder {
        self.client
            .get(Self::endpoint(&self.config.api_base, path))
            .header("Client-Id", &self.config.client_id)
            .bearer_auth(token.as_str())
    }

    /// `started_at` for the clips request, if a lookback window is configured.
    fn started_at(&self) -> Option<String> {
        window_start(self.config.lookback?).map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        // bodies are never logged, the token response carries the bearer token
        let body = response.text().await?;
        debug!(status = %status, bytes = body.len(), "Received response");
        serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl TokenProvider for HelixClient {
    async fn acquire_token(&self) -> Result<AccessToken, AuthError> {
        let response = self
            .client
            .post(Self::endpoint(&self.config.auth_base, Self::TOKEN_PATH))
            .query(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(ApiError::from)?;

        let token: TokenResponse = Self::read_json(response).await?;
        if token.access_token.is_empty() {
            return Err(ApiError::InvalidResponse("empty access_token".to_string()).into());
        }

        info!(expires_in = ?token.expires_in, "Twitch OAuth token obtained");
        Ok(AccessToken::new(token.access_token))
    }
}

#[async_trait]
impl BroadcasterResolver for HelixClient {
    async fn resolve(
        &self,
        token: &AccessToken,
        login: &str,
    ) -> Result<Broadcaster, ResolutionError> {
        let api_error = |source: ApiError| ResolutionError::Api {
            login: login.to_string(),
            source,
        };

        let response = self
            .authorized_get(Self::USERS_PATH, token)
            .query(&[("login", login)])
            .send()
            .await
            .map_err(|e| api_error(e.into()))?;

        let users: HelixResponse<HelixUser> = Self::read_json(response).await.map_err(api_error)?;
        let user = users
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ResolutionError::NotFound(login.to_string()))?;

        debug!(login = %user.login, id = %user.id, "Resolved broadcaster");
        info!(broadcaster = %user.display_name, "Found broadcaster");

        Ok(Broadcaster {
            login: login.to_string(),
            id: user.id,
            display_name: user.display_name,
        })
    }
}

#[async_trait]
impl ClipFetcher for HelixClient {
    async fn fetch_recent(
        &self,
        token: &AccessToken,
        broadcaster: &Broadcaster,
    ) -> Result<Vec<Clip>, FetchError> {
        let fetch_error = |source: ApiError| FetchError {
            broadcaster: broadcaster.display_name.clone(),
            source,
        };

        let page_size = self.config.page_size.to_string();
        let mut query = vec![
            ("broadcaster_id", broadcaster.id.clone()),
            ("first", page_size),
        ];
        let started_at = self.started_at();
        if let Some(started_at) = &started_at {
            query.push(("started_at", started_at.clone()));
        }

        let response = self
            .authorized_get(Self::CLIPS_PATH, token)
            .query(&query)
            .send()
            .await
            .map_err(|e| fetch_error(e.into()))?;

        let page: HelixResponse<HelixClip> = Self::read_json(response).await.map_err(fetch_error)?;

        match &started_at {
            Some(since) => info!(
                broadcaster = %broadcaster.display_name,
                count = page.data.len(),
                since = %since,
                "Fetched clips created within the lookback window"
            ),
            None => info!(
                broadcaster = %broadcaster.display_name,
                count = page.data.len(),
                "Fetched most recent page of clips"
            ),
        }

        Ok(page
            .data
            .into_iter()
            .map(|clip| clip.into_clip(&broadcaster.display_name))
            .collect())
    }
}
