//! Crawler module for the follower crawl
//!
//! This module contains the core crawling logic, including:
//! - The phase state machine driving a run
//! - Randomized pacing and retry backoff
//! - The sleep seam used for all waiting

mod backoff;
mod controller;
mod sleeper;

#[cfg(test)]
mod test_support;

pub use backoff::{delay, wait_secs, Backoff};
pub use controller::{Controller, CrawlTarget, RunOutcome};
pub use sleeper::{Sleeper, TokioSleeper};

use crate::api::ApiClient;
use crate::config::{RunConfig, Settings};
use crate::events::EventSink;
use crate::session::SessionContext;
use crate::CrawlError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl against the live API
///
/// This is the main entry point for a run. It will:
/// 1. Build the session context and HTTP client
/// 2. Report the proxy in use (host only)
/// 3. Drive the controller until done, terminated or fatal
///
/// # Arguments
///
/// * `config` - The validated run config
/// * `settings` - Pacing and API settings
/// * `sink` - Destination of progress events
/// * `cancel` - Token observed at controller checkpoints
///
/// # Returns
///
/// * `Ok(RunOutcome)` - How the run ended
/// * `Err(CrawlError)` - The client could not be built or events could not be written
pub async fn crawl<E: EventSink + ?Sized>(
    config: &RunConfig,
    settings: &Settings,
    sink: &mut E,
    cancel: CancellationToken,
) -> Result<RunOutcome, CrawlError> {
    let session = SessionContext::new(
        &config.session_id,
        &config.csrf_token,
        &config.ds_user_id,
        config.proxy.as_deref(),
    );

    if let Some(proxy) = session.masked_proxy() {
        tracing::info!(proxy = %proxy, "Routing requests through proxy");
        sink.emit(&crate::events::Event::Info {
            message: format!("Using proxy: {}", proxy),
        })?;
    }

    let api = ApiClient::new(&session, &settings.api)?;

    let mut controller =
        Controller::from_config(api, sink, config, settings).with_cancellation(cancel);
    controller.run().await
}
