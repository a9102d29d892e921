//! # Twitch
//!
//! Traits for the three upstream calls the pipeline makes, and the Helix
//! implementation of all of them.

mod client;
pub mod models;

pub use client::HelixClient;

use async_trait::async_trait;

use crate::clip::{AccessToken, Broadcaster, Clip};
use crate::error::{AuthError, FetchError, ResolutionError};

/// Exchanges application credentials for a bearer token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn acquire_token(&self) -> Result<AccessToken, AuthError>;
}

/// Maps a configured login to the platform id and canonical display name.
#[async_trait]
pub trait BroadcasterResolver: Send + Sync {
    async fn resolve(
        &self,
        token: &AccessToken,
        login: &str,
    ) -> Result<Broadcaster, ResolutionError>;
}

/// Lists the most recent page of clips of a broadcaster.
#[async_trait]
pub trait ClipFetcher: Send + Sync {
    /// Returned clips carry the broadcaster's display name.
    async fn fetch_recent(
        &self,
        token: &AccessToken,
        broadcaster: &Broadcaster,
    ) -> Result<Vec<Clip>, FetchError>;
}
