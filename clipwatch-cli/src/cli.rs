use clap::Parser;
use clipwatch::store::file::DEFAULT_STATE_FILE;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(
    name = "clipwatch",
    about = "Announce new Twitch clips to a Discord webhook",
    version,
    author
)]
pub struct Args {
    /// Discord webhook that receives the announcements
    #[arg(long, env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
    pub webhook_url: Option<String>,

    /// Twitch application client id
    #[arg(long, env = "TWITCH_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Twitch application client secret
    #[arg(long, env = "TWITCH_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Comma separated broadcaster logins, checked in this order
    #[arg(long, env = "TWITCH_BROADCASTER_NAMES")]
    pub broadcasters: Option<String>,

    /// A single broadcaster login, used when no list is given
    #[arg(long, env = "TWITCH_BROADCASTER_NAME")]
    pub broadcaster: Option<String>,

    /// File holding the ids of clips already posted
    #[arg(long, env = "POSTED_CLIPS_FILE", default_value = DEFAULT_STATE_FILE)]
    pub state_file: PathBuf,

    /// Pause between two posts, in milliseconds
    #[arg(long, env = "CLIPWATCH_PUBLISH_DELAY_MS", default_value = "2000")]
    pub publish_delay_ms: u64,

    /// Clips requested per broadcaster (1-100)
    #[arg(long, env = "CLIPWATCH_PAGE_SIZE", default_value = "20")]
    pub page_size: u16,

    /// Only consider clips created within this many hours
    #[arg(long, env = "CLIPWATCH_LOOKBACK_HOURS")]
    pub lookback_hours: Option<u64>,

    /// Timeout for every HTTP request, in seconds. Unset means no timeout
    #[arg(long, env = "CLIPWATCH_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
