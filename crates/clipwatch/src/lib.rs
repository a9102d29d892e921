//! Announce new Twitch clips to a Discord webhook.
//!
//! A run polls the most recent clips of every configured broadcaster, drops
//! the ones already announced, and posts the rest oldest first. Announced clip
//! ids are kept in a [`store::DedupStore`] that survives restarts.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use clipwatch::config::{HelixConfig, PipelineConfig};
//! use clipwatch::publish::DiscordWebhook;
//! use clipwatch::store::JsonFileStore;
//! use clipwatch::twitch::HelixClient;
//! use clipwatch::{ClipPipeline, create_client};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_client(None)?;
//! let helix = Arc::new(HelixClient::new(client.clone(), HelixConfig::new("id", "secret")));
//! let webhook = Arc::new(DiscordWebhook::new(
//!     client,
//!     "https://discord.com/api/webhooks/1/token".parse()?,
//! ));
//!
//! let pipeline = ClipPipeline::new(
//!     PipelineConfig::new(vec!["somestreamer".to_string()]),
//!     helix.clone(),
//!     helix.clone(),
//!     helix,
//!     webhook,
//! );
//!
//! let mut store = JsonFileStore::load("posted_clips.json");
//! let report = pipeline.run(&mut store).await?;
//! println!("posted {} clips", report.published.len());
//! # Ok(())
//! # }
//! ```

pub mod clip;
pub mod config;
pub mod error;
mod http;
pub mod pipeline;
pub mod publish;
pub mod store;
pub mod twitch;

pub use clip::{AccessToken, Broadcaster, Clip};
pub use http::create_client;
pub use pipeline::{ClipPipeline, RunReport};
