use crate::state::{FollowerRecord, Phase};
use serde::{Deserialize, Deserializer};

/// Default root of the platform's versioned private API
pub const DEFAULT_BASE_URL: &str = "https://i.instagram.com/api/v1";

/// Input record supplied by the driving process at start
///
/// Besides credentials and the target, it carries the resume state of a
/// previous run (phase, cursor, followers collected so far, bio index).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunConfig {
    /// Session credential token (`sessionid` cookie)
    #[serde(default)]
    pub session_id: String,

    /// Username of the account whose followers are crawled
    #[serde(default)]
    pub target_username: String,

    /// Stop collecting after this many followers (0 or absent means no cap)
    #[serde(default)]
    pub max_followers: Option<usize>,

    #[serde(default)]
    pub phase: Phase,

    /// Continuation token to resume pagination from
    #[serde(default)]
    pub cursor: Option<String>,

    /// Followers collected by earlier runs
    #[serde(default)]
    pub followers: Vec<FollowerRecord>,

    /// First follower index to enrich
    #[serde(default)]
    pub start_bio_index: usize,

    /// Target id resolved by an earlier run
    #[serde(default, deserialize_with = "string_or_number")]
    pub target_user_id: Option<String>,

    /// Cross-site-request-forgery token
    #[serde(default)]
    pub csrf_token: String,

    /// Numeric id of the authenticated account
    #[serde(default, deserialize_with = "string_or_number_or_empty")]
    pub ds_user_id: String,

    /// Outbound proxy URL, possibly with embedded credentials
    #[serde(default)]
    pub proxy: Option<String>,
}

/// Tuning settings loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub pacing: PacingConfig,

    #[serde(default)]
    pub api: ApiSettings,
}

/// Delay ranges and retry cap used by the crawl controller
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Pause between two follower pages
    #[serde(rename = "follower-page", default = "PacingConfig::default_follower_page")]
    pub follower_page: DelayRange,

    /// Pause between two profile fetches
    #[serde(rename = "bio-fetch", default = "PacingConfig::default_bio_fetch")]
    pub bio_fetch: DelayRange,

    /// Base wait before retrying a failed call
    #[serde(rename = "on-error", default = "PacingConfig::default_on_error")]
    pub on_error: DelayRange,

    /// Attempt cap for target resolution and profile fetches
    #[serde(rename = "max-retries", default = "PacingConfig::default_max_retries")]
    pub max_retries: u32,
}

impl PacingConfig {
    fn default_follower_page() -> DelayRange {
        DelayRange::new(5.0, 10.0)
    }

    fn default_bio_fetch() -> DelayRange {
        DelayRange::new(20.0, 35.0)
    }

    fn default_on_error() -> DelayRange {
        DelayRange::new(60.0, 120.0)
    }

    fn default_max_retries() -> u32 {
        5
    }

    /// Pacing with every range collapsed to zero, for tests and dry runs
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            follower_page: DelayRange::new(0.0, 0.0),
            bio_fetch: DelayRange::new(0.0, 0.0),
            on_error: DelayRange::new(0.0, 0.0),
            max_retries,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            follower_page: Self::default_follower_page(),
            bio_fetch: Self::default_bio_fetch(),
            on_error: Self::default_on_error(),
            max_retries: Self::default_max_retries(),
        }
    }
}

/// A closed range of seconds a randomized delay is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DelayRange {
    pub min: f64,
    pub max: f64,
}

impl DelayRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Platform API access settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// Root URL every API path is appended to
    #[serde(rename = "base-url", default = "ApiSettings::default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "ApiSettings::default_timeout_secs")]
    pub timeout_secs: u64,

    /// Followers requested per page
    #[serde(rename = "page-size", default = "ApiSettings::default_page_size")]
    pub page_size: u32,
}

impl ApiSettings {
    fn default_base_url() -> String {
        DEFAULT_BASE_URL.to_string()
    }

    fn default_timeout_secs() -> u64 {
        30
    }

    fn default_page_size() -> u32 {
        50
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            timeout_secs: Self::default_timeout_secs(),
            page_size: Self::default_page_size(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

// Platform ids are sometimes replayed as JSON numbers
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<StringOrNumber> = Option::deserialize(deserializer)?;
    Ok(value.map(String::from))
}

fn string_or_number_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_or_number(deserializer)?.unwrap_or_default())
}
