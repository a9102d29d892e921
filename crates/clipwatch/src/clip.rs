use std::fmt;

use chrono::{DateTime, Utc};

/// A clip ready to be announced.
///
/// Built from the raw Helix record by the fetch step, which also stamps the
/// canonical display name of the broadcaster the clip belongs to.
///
/// # Fields
///
/// * `id` - Platform assigned id, stable across fetches
/// * `url` - Public link to the clip
/// * `creator_name` - Name of the viewer who made the clip
/// * `view_count` - Views at fetch time
/// * `created_at` - Creation time, used to order announcements
/// * `broadcaster_display_name` - Canonical name of the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    pub id: String,
    pub title: String,
    pub url: String,
    pub creator_name: String,
    pub view_count: u64,
    pub thumbnail_url: String,
    pub created_at: DateTime<Utc>,
    pub broadcaster_display_name: String,
}

/// A configured broadcaster after resolution against the users endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcaster {
    // login as written in the configuration
    pub login: String,
    pub id: String,
    pub display_name: String,
}

/// App access token for the Helix API.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}
