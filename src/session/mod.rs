//! Session context for authenticated platform access
//!
//! Holds the opaque credential tokens and everything the transport needs to
//! present itself as the platform's mobile web client: a fixed header set,
//! the three authentication cookies, and an optional outbound proxy.
//! Building a context performs no I/O and cannot fail.

use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use url::Url;

/// Domain the authentication cookies are bound to
pub const COOKIE_DOMAIN: &str = ".instagram.com";

const COOKIE_ORIGIN: &str = "https://www.instagram.com/";

const USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 12; SM-G991B) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/131.0.0.0 Mobile Safari/537.36";

const APP_ID: &str = "936619743392459";

/// Header set sent with every request, apart from the CSRF token
const STATIC_HEADERS: &[(&str, &str)] = &[
    ("user-agent", USER_AGENT),
    ("x-ig-app-id", APP_ID),
    ("x-ig-www-claim", "0"),
    ("x-requested-with", "XMLHttpRequest"),
    ("accept", "*/*"),
    ("accept-language", "en-US,en;q=0.9"),
    ("origin", "https://www.instagram.com"),
    ("referer", "https://www.instagram.com/"),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-site"),
];

/// Authenticated identity plus transport configuration
///
/// Immutable after construction; share it by reference.
#[derive(Debug, Clone)]
pub struct SessionContext {
    headers: HeaderMap,
    cookies: Arc<Jar>,
    proxy_url: Option<String>,
}

impl SessionContext {
    /// Creates a session context from externally supplied credentials
    ///
    /// # Arguments
    ///
    /// * `session_id` - Session credential token
    /// * `csrf_token` - Cross-site-request-forgery token
    /// * `account_id` - Numeric id of the authenticated account
    /// * `proxy_url` - Optional outbound proxy, applied to every request
    pub fn new(
        session_id: &str,
        csrf_token: &str,
        account_id: &str,
        proxy_url: Option<&str>,
    ) -> Self {
        let mut headers = HeaderMap::new();
        for &(name, value) in STATIC_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }

        match HeaderValue::from_str(csrf_token) {
            Ok(value) => {
                headers.insert(HeaderName::from_static("x-csrftoken"), value);
            }
            Err(_) => tracing::warn!("CSRF token is not a valid header value, omitting it"),
        }

        let cookies = Jar::default();
        if let Ok(origin) = Url::parse(COOKIE_ORIGIN) {
            for (name, value) in [
                ("sessionid", session_id),
                ("csrftoken", csrf_token),
                ("ds_user_id", account_id),
            ] {
                cookies.add_cookie_str(
                    &format!("{}={}; Domain={}; Path=/", name, value, COOKIE_DOMAIN),
                    &origin,
                );
            }
        }

        Self {
            headers,
            cookies: Arc::new(cookies),
            proxy_url: proxy_url.filter(|p| !p.is_empty()).map(str::to_string),
        }
    }

    /// Browser-identifying headers for every request
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Cookie store holding the authentication cookies
    pub fn cookie_jar(&self) -> Arc<Jar> {
        Arc::clone(&self.cookies)
    }

    /// Full proxy URL, credentials included; never log this
    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy_url.as_deref()
    }

    /// Proxy location safe for diagnostics (host and port only)
    pub fn masked_proxy(&self) -> Option<String> {
        self.proxy_url.as_deref().map(mask_proxy_url)
    }
}

/// Strips credentials (and anything but host and port) from a proxy URL
pub fn mask_proxy_url(proxy: &str) -> String {
    if let Ok(url) = Url::parse(proxy) {
        if let Some(host) = url.host_str() {
            return match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            };
        }
    }

    // Unparseable: keep only what follows the last credential separator
    proxy.rsplit('@').next().unwrap_or_default().to_string()
}
