//! Platform API access
//!
//! This module contains everything between the crawl controller and the wire:
//! - Building the authenticated HTTP client
//! - Issuing single GET calls against the private API
//! - Classifying raw HTTP outcomes into [`ApiFailure`] kinds
//! - Typed helpers for the four endpoints a crawl needs

mod classify;
mod client;
mod endpoints;

pub use classify::{classify_response, truncate_detail, DETAIL_LIMIT};
pub use client::{build_http_client, ApiClient};
pub use endpoints::{
    fetch_bio, fetch_current_username, fetch_follower_page, parse_bio, parse_current_username,
    parse_follower_page, parse_user_id, resolve_user_id, FollowerPage,
};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Classified outcome of a failed API call
///
/// The crawl controller picks its retry policy by matching on the variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiFailure {
    /// Credentials are no longer accepted; needs human re-authentication
    #[error("Session expired: {0}")]
    SessionExpired(String),

    #[error("Rate limited (429)")]
    RateLimited,

    #[error("Not found (404): {path}")]
    NotFound { path: String },

    #[error("HTTP {status}: {detail}")]
    ApiError { status: u16, detail: String },

    /// Timeouts, connection failures and unreadable bodies
    #[error("Request failed: {0}")]
    Transport(String),
}

/// One authenticated call against the platform's private API
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Issues a GET to `path` (relative to the API root) with `query`
    async fn call(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ApiFailure>;
}
