//! Follower-Crawl main entry point
//!
//! Reads the run config (stdin by default), streams progress events to
//! stdout as JSON lines, and logs diagnostics to stderr.

use anyhow::Context;
use clap::Parser;
use follower_crawl::config::{load_run_config, load_settings, read_run_config, Settings};
use follower_crawl::crawler::crawl;
use follower_crawl::events::{EmitError, Event, EventSink, JsonLinesEmitter};
use follower_crawl::shutdown::cancel_on_signal;
use follower_crawl::CrawlError;
use std::io::Stdout;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Follower-Crawl: a resumable follower-graph crawler
///
/// Collects the followers of a target account, then fetches each follower's
/// profile. Send SIGINT or SIGTERM to stop at the next checkpoint; replay
/// the emitted state to resume.
#[derive(Parser, Debug)]
#[command(name = "follower-crawl")]
#[command(version = "1.0.0")]
#[command(about = "A resumable follower-graph crawler", long_about = None)]
struct Cli {
    /// Read the JSON run config from this file instead of stdin
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// TOML file with pacing and API settings
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error logging
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Registered before anything blocks, so no signal takes the default action
    let cancel = CancellationToken::new();
    cancel_on_signal(cancel.clone());

    let mut emitter = JsonLinesEmitter::new(std::io::stdout());

    match run(cli, &mut emitter, cancel).await {
        Ok(code) => code,
        Err(e) => {
            // Nobody is reading anymore; nothing left to report to
            if let Some(CrawlError::Output(EmitError::Closed)) = e.downcast_ref::<CrawlError>() {
                return ExitCode::SUCCESS;
            }

            tracing::error!("{:#}", e);
            let _ = emitter.emit(&Event::Fatal {
                message: format!("{:#}", e),
            });
            ExitCode::from(1)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries the event stream.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("follower_crawl=info,warn"),
            1 => EnvFilter::new("follower_crawl=debug,info"),
            2 => EnvFilter::new("follower_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn run(
    cli: Cli,
    emitter: &mut JsonLinesEmitter<Stdout>,
    cancel: CancellationToken,
) -> anyhow::Result<ExitCode> {
    let config_path = cli.config.clone();
    let config = tokio::task::spawn_blocking(move || match config_path {
        Some(path) => load_run_config(&path)
            .with_context(|| format!("Failed to load run config from {}", path.display())),
        None => read_run_config(std::io::stdin().lock()).context("Invalid run config on stdin"),
    })
    .await
    .context("Run config reader panicked")??;

    let settings = match &cli.settings {
        Some(path) => load_settings(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    tracing::info!(
        target_username = %config.target_username,
        phase = %config.phase,
        followers = config.followers.len(),
        start_bio_index = config.start_bio_index,
        "Configuration loaded"
    );

    if cancel.is_cancelled() {
        tracing::info!("Cancelled before the run started");
        emitter.emit(&Event::Terminated).map_err(CrawlError::from)?;
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = crawl(&config, &settings, emitter, cancel).await?;
    tracing::info!(stage = %outcome.stage(), exit_code = outcome.exit_code(), "Exiting");

    Ok(ExitCode::from(outcome.exit_code()))
}
