//! Follower-Crawl: a resumable follower-graph crawler
//!
//! This crate walks the follower list of a target account through the
//! platform's private HTTP API, then enriches every follower with profile
//! details. Progress is reported as a stream of JSON-line events so an
//! external process can persist it and resume an interrupted run later.

pub mod api;
pub mod config;
pub mod crawler;
pub mod events;
pub mod session;
pub mod shutdown;
pub mod state;

use thiserror::Error;

/// Main error type for Follower-Crawl operations
///
/// Failures of individual API calls are not represented here; they are
/// [`api::ApiFailure`] values that the crawl controller turns into retries,
/// skips or a fatal event.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Event output error: {0}")]
    Output(#[from] events::EmitError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML settings: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("No config received")]
    Empty,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Follower-Crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use api::{ApiClient, ApiFailure, PlatformApi};
pub use config::{RunConfig, Settings};
pub use crawler::{Controller, RunOutcome};
pub use events::{Event, EventSink, JsonLinesEmitter};
pub use session::SessionContext;
pub use state::{BioRecord, CrawlState, FollowerRecord, Phase, Stage};
