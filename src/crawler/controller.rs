//! Crawl controller - the phase state machine
//!
//! This module drives a run from session validation to completion:
//! - Validating the session with an identity probe
//! - Resolving the target's id (bounded retries)
//! - Paginating the follower list (unbounded retries)
//! - Enriching each follower with profile details (bounded retries, per-item skips)
//! - Honoring cooperative cancellation at checkpoints
//!
//! Requests are strictly sequential. Every failure is emitted as an event
//! before the retry or abort it triggers.

use crate::api::{
    fetch_bio, fetch_current_username, fetch_follower_page, resolve_user_id, ApiFailure,
    FollowerPage, PlatformApi,
};
use crate::config::{RunConfig, Settings};
use crate::crawler::backoff::{wait_secs, Backoff};
use crate::crawler::sleeper::{Sleeper, TokioSleeper};
use crate::events::{EmitError, Event, EventSink, PhaseMarker};
use crate::state::{CrawlState, CrawlStats, FollowerRecord, Phase, Stage};
use crate::CrawlError;
use rand::rngs::StdRng;
use rand::Rng;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const USER_LOOKUP_CONTEXT: &str = "user_lookup";
const FOLLOWERS_CONTEXT: &str = "followers";

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// All phases finished
    Completed,

    /// Stopped at a checkpoint after a cancellation request
    Terminated,

    /// Aborted on an unrecoverable error
    Fatal(String),
}

impl RunOutcome {
    /// Process exit status for this outcome
    pub fn exit_code(&self) -> u8 {
        if self.stage().is_clean_exit() {
            0
        } else {
            1
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::Completed => Stage::Done,
            Self::Terminated => Stage::Terminated,
            Self::Fatal(_) => Stage::Fatal,
        }
    }
}

/// Why a phase stopped early
#[derive(Debug)]
enum Halt {
    Terminated,
    Fatal(String),
    Output(EmitError),
}

impl From<EmitError> for Halt {
    fn from(error: EmitError) -> Self {
        Self::Output(error)
    }
}

/// Identity of the crawl target and of the authenticated account
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    pub username: String,
    pub account_id: String,
}

/// Crawl controller
///
/// Owns the [`CrawlState`] exclusively and drives the request client, the
/// backoff policy and the event sink.
pub struct Controller<A, E, S = TokioSleeper, R = StdRng> {
    api: A,
    sink: E,
    sleeper: S,
    backoff: Backoff<R>,
    state: CrawlState,
    target: CrawlTarget,
    page_size: u32,
    cancel: CancellationToken,
    stage: Stage,
    stats: CrawlStats,
}

impl<A, E> Controller<A, E>
where
    A: PlatformApi,
    E: EventSink,
{
    /// Creates a controller with real sleeps and an entropy-seeded RNG
    pub fn new(
        api: A,
        sink: E,
        state: CrawlState,
        target: CrawlTarget,
        settings: &Settings,
    ) -> Self {
        Self {
            api,
            sink,
            sleeper: TokioSleeper,
            backoff: Backoff::new(settings.pacing.clone()),
            state,
            target,
            page_size: settings.api.page_size,
            cancel: CancellationToken::new(),
            stage: Stage::Init,
            stats: CrawlStats::default(),
        }
    }

    /// Creates a controller whose state and target come from a run config
    pub fn from_config(api: A, sink: E, config: &RunConfig, settings: &Settings) -> Self {
        let target = CrawlTarget {
            username: config.target_username.clone(),
            account_id: config.ds_user_id.clone(),
        };
        Self::new(api, sink, CrawlState::from_config(config), target, settings)
    }
}

impl<A, E, S, R> Controller<A, E, S, R>
where
    A: PlatformApi,
    E: EventSink,
    S: Sleeper,
    R: Rng,
{
    /// Replaces the sleeper (tests record waits instead of spending them)
    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> Controller<A, E, S2, R> {
        Controller {
            api: self.api,
            sink: self.sink,
            sleeper,
            backoff: self.backoff,
            state: self.state,
            target: self.target,
            page_size: self.page_size,
            cancel: self.cancel,
            stage: self.stage,
            stats: self.stats,
        }
    }

    /// Replaces the backoff policy, e.g. with a seeded RNG
    pub fn with_backoff<R2: Rng>(self, backoff: Backoff<R2>) -> Controller<A, E, S, R2> {
        Controller {
            api: self.api,
            sink: self.sink,
            sleeper: self.sleeper,
            backoff,
            state: self.state,
            target: self.target,
            page_size: self.page_size,
            cancel: self.cancel,
            stage: self.stage,
            stats: self.stats,
        }
    }

    /// Uses `token` for cooperative cancellation
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    /// Runs the crawl to a terminal stage
    ///
    /// # Returns
    ///
    /// * `Ok(RunOutcome)` - The run reached `done`, `terminated` or `fatal`
    ///   and the matching event was emitted
    /// * `Err(CrawlError)` - Events could no longer be emitted
    pub async fn run(&mut self) -> Result<RunOutcome, CrawlError> {
        let outcome = match self.drive().await {
            Ok(()) => {
                self.transition(Stage::Done);
                self.emit(Event::Done)?;
                RunOutcome::Completed
            }
            Err(Halt::Terminated) => {
                self.transition(Stage::Terminated);
                self.emit(Event::Terminated)?;
                RunOutcome::Terminated
            }
            Err(Halt::Fatal(message)) => {
                self.transition(Stage::Fatal);
                tracing::error!("{}", message);
                self.emit(Event::Fatal {
                    message: message.clone(),
                })?;
                RunOutcome::Fatal(message)
            }
            Err(Halt::Output(e)) => return Err(e.into()),
        };

        tracing::info!(
            outcome = %self.stage,
            pages = self.stats.pages_fetched,
            followers = self.stats.followers_collected,
            enriched = self.stats.bios_enriched,
            skipped = self.stats.bios_skipped,
            retries = self.stats.retries,
            "Run finished"
        );

        Ok(outcome)
    }

    async fn drive(&mut self) -> Result<(), Halt> {
        self.validate_session().await?;

        if self.state.phase() == Phase::Full {
            self.emit(Event::Phase {
                phase: PhaseMarker::CollectingFollowers,
            })?;

            match self.state.resolved_target_id() {
                Some(id) => tracing::info!(user_id = id, "Target already resolved"),
                None => self.resolve_target().await?,
            }

            self.paginate_followers().await?;
        } else {
            tracing::info!(
                followers = self.state.followers().len(),
                "Follower list supplied, skipping pagination"
            );
        }

        self.fetch_bios().await
    }

    /// One identity probe; only an expired session stops the run
    async fn validate_session(&mut self) -> Result<(), Halt> {
        self.transition(Stage::ValidatingSession);

        match fetch_current_username(&self.api).await {
            Ok(username) => {
                let username =
                    username.unwrap_or_else(|| format!("uid:{}", self.target.account_id));
                tracing::info!(username = %username, "Session is valid");
                self.emit(Event::SessionValid { username })?;
            }
            Err(ApiFailure::SessionExpired(message)) => {
                return Err(Halt::Fatal(format!(
                    "Session invalid: {}. Update your session cookies.",
                    message
                )));
            }
            Err(ApiFailure::RateLimited) => {
                tracing::warn!("Session probe rate limited");
                self.emit(Event::Info {
                    message: "Session validation rate-limited, proceeding anyway".to_string(),
                })?;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session probe failed");
                self.emit(Event::Info {
                    message: format!("Session validation failed ({}), proceeding anyway", e),
                })?;
            }
        }

        Ok(())
    }

    async fn resolve_target(&mut self) -> Result<(), Halt> {
        self.transition(Stage::ResolvingTarget);

        let username = self.target.username.clone();
        let max_retries = self.backoff.pacing().max_retries;

        for attempt in 0..max_retries {
            self.checkpoint()?;

            match resolve_user_id(&self.api, &username).await {
                Ok(user_id) => {
                    tracing::info!(username = %username, user_id = %user_id, "Target resolved");
                    self.emit(Event::UserResolved {
                        user_id: user_id.clone(),
                    })?;
                    self.state.set_resolved_target_id(user_id);
                    return Ok(());
                }
                Err(ApiFailure::NotFound { .. }) => {
                    return Err(Halt::Fatal(format!("User @{} not found.", username)));
                }
                Err(ApiFailure::SessionExpired(message)) => {
                    return Err(Halt::Fatal(format!(
                        "Session expired during user lookup: {}",
                        message
                    )));
                }
                Err(ApiFailure::RateLimited) => {
                    let wait = self.backoff.rate_limited(attempt);
                    self.emit(Event::RateLimited {
                        context: USER_LOOKUP_CONTEXT.to_string(),
                        wait: wait_secs(wait),
                        attempt: Some(attempt + 1),
                    })?;
                    self.retry_after(wait).await;
                }
                Err(e) => {
                    if attempt + 1 == max_retries {
                        return Err(Halt::Fatal(format!(
                            "Could not resolve @{} after {} attempts: {}",
                            username, max_retries, e
                        )));
                    }
                    let wait = self.backoff.on_error();
                    self.emit(Event::Error {
                        message: e.to_string(),
                        context: USER_LOOKUP_CONTEXT.to_string(),
                        wait: wait_secs(wait),
                    })?;
                    self.retry_after(wait).await;
                }
            }
        }

        Err(Halt::Fatal(format!(
            "Could not resolve @{} after {} attempts",
            username, max_retries
        )))
    }

    /// Walks the follower list; failures other than session expiry retry forever
    async fn paginate_followers(&mut self) -> Result<(), Halt> {
        self.transition(Stage::PaginatingFollowers);

        let user_id = match self.state.resolved_target_id() {
            Some(id) => id.to_string(),
            None => return Err(Halt::Fatal("Target id is unknown".to_string())),
        };

        if self.state.cap_reached() {
            let dropped = self.state.truncate_to_limit();
            tracing::info!(
                followers = self.state.followers().len(),
                dropped,
                "Follower cap already reached, skipping pagination"
            );
        }

        while !self.state.cap_reached() {
            self.checkpoint()?;

            let cursor = self.state.pagination_cursor().map(str::to_string);
            let result =
                fetch_follower_page(&self.api, &user_id, cursor.as_deref(), self.page_size).await;

            match result {
                Ok(FollowerPage { users, next_cursor }) => {
                    let appended = self.state.append_page(users, next_cursor).to_vec();
                    let total = self.state.followers().len();
                    self.stats.pages_fetched += 1;
                    self.stats.followers_collected += appended.len() as u64;

                    tracing::info!(new = appended.len(), total, "Follower page collected");
                    self.emit(Event::FollowersPage {
                        new_count: appended.len(),
                        total,
                        cursor: self.state.pagination_cursor().map(str::to_string),
                        users: appended,
                    })?;

                    if self.state.pagination_cursor().is_none() || self.state.cap_reached() {
                        break;
                    }

                    let wait = self.backoff.follower_page();
                    self.pause(wait).await;
                }
                Err(ApiFailure::SessionExpired(message)) => {
                    return Err(Halt::Fatal(format!(
                        "Session expired: {}. Update your session cookies and resume.",
                        message
                    )));
                }
                Err(ApiFailure::RateLimited) => {
                    let wait = self.backoff.on_error();
                    self.emit(Event::RateLimited {
                        context: FOLLOWERS_CONTEXT.to_string(),
                        wait: wait_secs(wait),
                        attempt: None,
                    })?;
                    self.retry_after(wait).await;
                }
                Err(e) => {
                    let wait = self.backoff.on_error();
                    self.emit(Event::Error {
                        message: e.to_string(),
                        context: FOLLOWERS_CONTEXT.to_string(),
                        wait: wait_secs(wait),
                    })?;
                    self.retry_after(wait).await;
                }
            }
        }

        self.state.finish_pagination();
        self.emit(Event::FollowersDone {
            total: self.state.followers().len(),
        })?;

        Ok(())
    }

    async fn fetch_bios(&mut self) -> Result<(), Halt> {
        self.transition(Stage::FetchingBios);
        self.emit(Event::Phase {
            phase: PhaseMarker::FetchingBios,
        })?;

        let total = self.state.followers().len();
        tracing::info!(
            from = self.state.next_bio_index(),
            total,
            "Fetching profile details"
        );

        while self.state.next_bio_index() < total {
            self.checkpoint()?;

            let index = self.state.next_bio_index();
            let follower = self.state.followers()[index].clone();
            self.enrich_follower(index, &follower).await?;
            self.state.advance_bio_index();

            if index + 1 < total {
                let wait = self.backoff.bio_fetch();
                self.pause(wait).await;
            }
        }

        Ok(())
    }

    /// Emits exactly one `bio_result` or `bio_skip` for the follower, unless the run halts
    async fn enrich_follower(&mut self, index: usize, follower: &FollowerRecord) -> Result<(), Halt> {
        let context = format!("bio @{}", follower.username);
        let max_retries = self.backoff.pacing().max_retries;

        for attempt in 0..max_retries {
            if attempt > 0 {
                self.checkpoint()?;
            }

            match fetch_bio(&self.api, &follower.id).await {
                Ok(bio_data) => {
                    tracing::debug!(index, username = %follower.username, "Profile fetched");
                    self.stats.bios_enriched += 1;
                    self.emit(Event::BioResult {
                        index,
                        username: follower.username.clone(),
                        bio_data,
                    })?;
                    return Ok(());
                }
                Err(ApiFailure::SessionExpired(message)) => {
                    return Err(Halt::Fatal(format!(
                        "Session expired: {}. Update your session cookies and resume.",
                        message
                    )));
                }
                Err(ApiFailure::NotFound { .. }) => {
                    return self.skip_follower(index, follower, "User not found".to_string());
                }
                Err(ApiFailure::RateLimited) => {
                    let wait = self.backoff.rate_limited(attempt);
                    self.emit(Event::RateLimited {
                        context: context.clone(),
                        wait: wait_secs(wait),
                        attempt: Some(attempt + 1),
                    })?;
                    self.retry_after(wait).await;
                }
                Err(e) => {
                    if attempt + 1 == max_retries {
                        return self.skip_follower(index, follower, e.to_string());
                    }
                    let wait = self.backoff.on_error();
                    self.emit(Event::Error {
                        message: e.to_string(),
                        context: context.clone(),
                        wait: wait_secs(wait),
                    })?;
                    self.retry_after(wait).await;
                }
            }
        }

        self.skip_follower(
            index,
            follower,
            format!("Rate limited on all {} attempts", max_retries),
        )
    }

    fn skip_follower(
        &mut self,
        index: usize,
        follower: &FollowerRecord,
        reason: String,
    ) -> Result<(), Halt> {
        tracing::warn!(index, username = %follower.username, reason = %reason, "Skipping follower");
        self.stats.bios_skipped += 1;
        self.emit(Event::BioSkip {
            index,
            username: follower.username.clone(),
            reason,
        })?;
        Ok(())
    }

    fn checkpoint(&self) -> Result<(), Halt> {
        if self.cancel.is_cancelled() {
            tracing::info!(stage = %self.stage, "Cancellation requested, stopping");
            return Err(Halt::Terminated);
        }
        Ok(())
    }

    fn emit(&mut self, event: Event) -> Result<(), EmitError> {
        self.sink.emit(&event)
    }

    fn transition(&mut self, next: Stage) {
        tracing::debug!(from = %self.stage, to = %next, "Stage transition");
        self.stage = next;
    }

    async fn pause(&self, wait: Duration) {
        tracing::trace!(secs = wait.as_secs_f64(), "Pacing");
        self.sleeper.sleep(wait).await;
    }

    async fn retry_after(&mut self, wait: Duration) {
        self.stats.retries += 1;
        self.pause(wait).await;
    }
}
