//! HTTP client for the platform's private API
//!
//! This module handles all HTTP requests of a crawl:
//! - Building a client from the session context (headers, cookies, proxy)
//! - Issuing one GET per call with a fixed timeout
//! - Handing the raw outcome to the classifier

use crate::api::{classify_response, ApiFailure, PlatformApi};
use crate::config::ApiSettings;
use crate::session::SessionContext;
use crate::CrawlError;
use async_trait::async_trait;
use reqwest::{Client, Proxy};
use serde_json::Value;
use std::time::Duration;

/// Builds an HTTP client carrying the session's identity
///
/// # Arguments
///
/// * `session` - Headers, cookies and proxy to apply to every request
/// * `timeout` - Per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client (e.g. unusable proxy URL)
pub fn build_http_client(
    session: &SessionContext,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .default_headers(session.headers().clone())
        .cookie_provider(session.cookie_jar())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = session.proxy_url() {
        builder = builder.proxy(Proxy::all(proxy)?);
    }

    builder.build()
}

/// Request client bound to one session and API root
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for `session` using the API settings
    pub fn new(session: &SessionContext, settings: &ApiSettings) -> Result<Self, CrawlError> {
        let client = build_http_client(session, Duration::from_secs(settings.timeout_secs))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl PlatformApi for ApiClient {
    async fn call(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ApiFailure> {
        let url = self.endpoint(path);
        tracing::debug!(path, "GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_failure)?;
        tracing::trace!(path, status, bytes = body.len(), "Response received");

        classify_response(status, &body, path)
    }
}

fn transport_failure(error: reqwest::Error) -> ApiFailure {
    if error.is_timeout() {
        ApiFailure::Transport("Request timeout".to_string())
    } else if error.is_connect() {
        ApiFailure::Transport(format!("Connection failed: {}", error.without_url()))
    } else {
        ApiFailure::Transport(error.without_url().to_string())
    }
}
