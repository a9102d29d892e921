mod cli;
mod config;
mod error;

use std::ffi::OsString;
use std::process;
use std::sync::Arc;

use clap::Parser;
use clap::error::ErrorKind;
use clipwatch::publish::DiscordWebhook;
use clipwatch::store::JsonFileStore;
use clipwatch::twitch::HelixClient;
use clipwatch::{ClipPipeline, create_client};
use tracing::{Level, error, info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::{
    cli::Args,
    config::Settings,
    error::{CliError, ConfigError, Result},
};

#[tokio::main]
async fn main() {
    // a missing .env file is fine, everything may come from the real environment
    let _ = dotenvy::dotenv();

    let result = match parse_args(std::env::args_os()) {
        Ok(args) => run(args).await,
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        error!("Fatal error: {}", e);
        eprintln!("Error: {e}");
    }
    process::exit(exit_code(&result));
}

/// Parse the command line. Help and version output exit right away, every
/// other clap failure becomes a configuration error.
fn parse_args<I, T>(args: I) -> Result<Args>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Args::try_parse_from(args).map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
        _ => {
            let rendered = e.to_string();
            let first = rendered.lines().next().unwrap_or_default();
            CliError::from(ConfigError::Arguments(first.trim_start_matches("error: ").to_string()))
        }
    })
}

fn exit_code(result: &Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

async fn run(args: Args) -> Result<()> {
    init_logging(args.verbose, args.quiet)?;
    run_with(&args, build_pipeline).await
}

/// Validate `args`, then hand the settings to `build`. Nothing touches the
/// network before the settings are complete.
async fn run_with<F>(args: &Args, build: F) -> Result<()>
where
    F: FnOnce(Settings) -> Result<ClipPipeline>,
{
    let settings = Settings::from_args(args)?;
    let state_file = settings.state_file.clone();
    let pipeline = build(settings)?;

    let mut store = JsonFileStore::load(&state_file);
    let report = pipeline.run(&mut store).await?;

    if !report.unresolved.is_empty() {
        warn!(broadcasters = ?report.unresolved, "Some broadcasters could not be resolved");
    }
    if !report.failed_fetches.is_empty() {
        warn!(broadcasters = ?report.failed_fetches, "Some clip listings failed");
    }
    info!(
        posted = report.published.len(),
        known = store.ids().len(),
        "Run finished"
    );

    Ok(())
}

fn build_pipeline(settings: Settings) -> Result<ClipPipeline> {
    let client = create_client(settings.request_timeout)?;
    let helix = Arc::new(HelixClient::new(client.clone(), settings.helix));
    let webhook = Arc::new(DiscordWebhook::new(client, settings.webhook_url));

    Ok(ClipPipeline::new(
        settings.pipeline,
        helix.clone(),
        helix.clone(),
        helix,
        webhook,
    ))
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))
}
