//! Discord webhook publisher.

use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use super::Publisher;
use crate::clip::Clip;
use crate::error::PublishError;

/// Twitch brand purple.
const EMBED_COLOR: u32 = 0x0091_46ff;
const FOOTER_TEXT: &str = "Twitch Clip";

pub struct DiscordWebhook {
    webhook_url: Url,
    client: reqwest::Client,
}

impl DiscordWebhook {
    pub fn new(client: reqwest::Client, webhook_url: Url) -> Self {
        Self {
            webhook_url,
            client,
        }
    }

    /// Format a clip as a webhook message with one embed.
    fn format_payload(clip: &Clip) -> DiscordPayload {
        let embed = DiscordEmbed {
            color: EMBED_COLOR,
            title: clip.title.clone(),
            url: clip.url.clone(),
            author: DiscordAuthor {
                name: format!(
                    "{} - Clipped by {}",
                    clip.broadcaster_display_name, clip.creator_name
                ),
            },
            description: format!("👁️ {} views", group_thousands(clip.view_count)),
            thumbnail: DiscordImage {
                url: clip.thumbnail_url.clone(),
            },
            timestamp: clip.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            footer: DiscordFooter {
                text: FOOTER_TEXT.to_string(),
            },
        };

        DiscordPayload {
            content: format!(
                "🎬 **New clip from {}!**\n{}",
                clip.broadcaster_display_name, clip.url
            ),
            embeds: vec![embed],
        }
    }
}

#[async_trait]
impl Publisher for DiscordWebhook {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn publish(&self, clip: &Clip) -> Result<(), PublishError> {
        let payload = Self::format_payload(clip);

        debug!(channel = "discord", clip_id = %clip.id, "Sending clip announcement");

        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            warn!(
                channel = "discord",
                status = %status,
                body = %body,
                "Discord webhook request failed"
            );

            Err(PublishError::Rejected { status, body })
        }
    }
}

// =============================================================================
// Discord webhook types
// =============================================================================

#[derive(Debug, Serialize)]
struct DiscordPayload {
    content: String,
    embeds: Vec<DiscordEmbed>,
}

#[derive(Debug, Serialize)]
struct DiscordEmbed {
    color: u32,
    title: String,
    url: String,
    author: DiscordAuthor,
    description: String,
    thumbnail: DiscordImage,
    timestamp: String,
    footer: DiscordFooter,
}

#[derive(Debug, Serialize)]
struct DiscordAuthor {
    name: String,
}

#[derive(Debug, Serialize)]
struct DiscordImage {
    url: String,
}

#[derive(Debug, Serialize)]
struct DiscordFooter {
    text: String,
}

/// Format a count with comma thousands separators, e.g. `1234567` -> `1,234,567`.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
