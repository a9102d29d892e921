use std::path::PathBuf;
use std::time::Duration;

use clipwatch::config::{HelixConfig, MAX_PAGE_SIZE, PipelineConfig, window_start};
use url::Url;

use crate::cli::Args;
use crate::error::ConfigError;

/// Validated settings for one run. Built before any network client exists.
#[derive(Debug, Clone)]
pub struct Settings {
    pub webhook_url: Url,
    pub helix: HelixConfig,
    pub pipeline: PipelineConfig,
    pub state_file: PathBuf,
    pub request_timeout: Option<Duration>,
}

impl Settings {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let webhook = required(&args.webhook_url, "DISCORD_WEBHOOK_URL")?;
        let client_id = required(&args.client_id, "TWITCH_CLIENT_ID")?;
        let client_secret = required(&args.client_secret, "TWITCH_CLIENT_SECRET")?;

        let broadcasters = match (present(&args.broadcasters), present(&args.broadcaster)) {
            (Some(list), _) => parse_broadcasters(list),
            (None, Some(single)) => parse_broadcasters(single),
            (None, None) => Vec::new(),
        };
        if broadcasters.is_empty() {
            return Err(ConfigError::Missing("TWITCH_BROADCASTER_NAMES"));
        }

        let webhook_url = Url::parse(webhook).map_err(|e| ConfigError::Invalid {
            name: "DISCORD_WEBHOOK_URL",
            reason: e.to_string(),
        })?;

        let page_size = u8::try_from(args.page_size)
            .ok()
            .filter(|size| (1..=MAX_PAGE_SIZE).contains(size))
            .ok_or_else(|| ConfigError::Invalid {
                name: "CLIPWATCH_PAGE_SIZE",
                reason: format!("must be between 1 and {MAX_PAGE_SIZE}"),
            })?;

        let lookback = match args.lookback_hours {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    name: "CLIPWATCH_LOOKBACK_HOURS",
                    reason: "must be greater than zero".to_string(),
                });
            }
            Some(hours) => {
                let lookback = hours
                    .checked_mul(60 * 60)
                    .map(Duration::from_secs)
                    .filter(|lookback| window_start(*lookback).is_some())
                    .ok_or_else(|| ConfigError::Invalid {
                        name: "CLIPWATCH_LOOKBACK_HOURS",
                        reason: format!("{hours} hours reaches too far back"),
                    })?;
                Some(lookback)
            }
            None => None,
        };

        let helix = HelixConfig::new(client_id, client_secret)
            .with_page_size(page_size)
            .with_lookback(lookback);
        let pipeline = PipelineConfig::new(broadcasters)
            .with_publish_delay(Duration::from_millis(args.publish_delay_ms));

        Ok(Self {
            webhook_url,
            helix,
            pipeline,
            state_file: args.state_file.clone(),
            request_timeout: args.request_timeout_secs.map(Duration::from_secs),
        })
    }
}

/// Blank values are treated like unset ones.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, ConfigError> {
    present(value).ok_or(ConfigError::Missing(name))
}

/// Split a comma separated list, keeping order and dropping blanks.
pub fn parse_broadcasters(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
