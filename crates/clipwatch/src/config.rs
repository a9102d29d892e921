use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Helix base used for the users and clips endpoints.
pub const DEFAULT_API_BASE: &str = "https://api.twitch.tv";
/// Base of the OAuth token endpoint.
pub const DEFAULT_AUTH_BASE: &str = "https://id.twitch.tv";
/// Clips requested per broadcaster. Only the first page is ever read.
pub const DEFAULT_PAGE_SIZE: u8 = 20;
/// Helix rejects `first` above this value.
pub const MAX_PAGE_SIZE: u8 = 100;
/// Pause between two webhook posts.
pub const DEFAULT_PUBLISH_DELAY: Duration = Duration::from_secs(2);

/// Options for talking to the Twitch Helix API.
#[derive(Clone)]
pub struct HelixConfig {
    /// Application client id, also sent as the `Client-Id` header
    pub client_id: String,

    /// Application client secret used for the client credentials grant
    pub client_secret: String,

    pub api_base: String,

    pub auth_base: String,

    /// Number of clips requested per broadcaster
    pub page_size: u8,

    /// Only list clips created within this window. `None` means the platform's
    /// most recent page, whatever its age.
    pub lookback: Option<Duration>,
}

impl HelixConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_base: DEFAULT_API_BASE.to_owned(),
            auth_base: DEFAULT_AUTH_BASE.to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
            lookback: None,
        }
    }

    /// Point both endpoints at another host, e.g. a mock server.
    pub fn with_base_urls(
        mut self,
        api_base: impl Into<String>,
        auth_base: impl Into<String>,
    ) -> Self {
        self.api_base = api_base.into();
        self.auth_base = auth_base.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u8) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn with_lookback(mut self, lookback: Option<Duration>) -> Self {
        self.lookback = lookback;
        self
    }
}

impl fmt::Debug for HelixConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelixConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("auth_base", &self.auth_base)
            .field("page_size", &self.page_size)
            .field("lookback", &self.lookback)
            .finish()
    }
}

/// Start of a lookback window ending now, or `None` when `lookback` reaches
/// past the earliest representable time.
pub fn window_start(lookback: Duration) -> Option<DateTime<Utc>> {
    let lookback = TimeDelta::from_std(lookback).ok()?;
    Utc::now().checked_sub_signed(lookback)
}

/// Options for a single pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Broadcaster logins in the order they are checked
    pub broadcasters: Vec<String>,

    /// Pause after a successful publish when more clips are queued.
    /// `Duration::ZERO` disables pacing.
    pub publish_delay: Duration,
}

impl PipelineConfig {
    pub fn new(broadcasters: Vec<String>) -> Self {
        Self {
            broadcasters,
            publish_delay: DEFAULT_PUBLISH_DELAY,
        }
    }

    pub fn with_publish_delay(mut self, publish_delay: Duration) -> Self {
        self.publish_delay = publish_delay;
        self
    }
}
