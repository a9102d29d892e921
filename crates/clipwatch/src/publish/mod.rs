//! Clip announcement targets.

pub mod discord;

pub use discord::DiscordWebhook;

use async_trait::async_trait;

use crate::clip::Clip;
use crate::error::PublishError;

/// Delivers one clip announcement. Implementations must not retry, a failure
/// is reported to the pipeline which stops the run.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Name of the target, for logs.
    fn name(&self) -> &'static str;

    async fn publish(&self, clip: &Clip) -> Result<(), PublishError>;
}
