use crate::config::types::{ApiSettings, DelayRange, PacingConfig, RunConfig, Settings};
use crate::ConfigError;
use url::Url;

/// Validates the run config handed over by the driving process
pub fn validate_run_config(config: &RunConfig) -> Result<(), ConfigError> {
    if config.session_id.trim().is_empty() {
        return Err(ConfigError::MissingField("session_id"));
    }

    if config.target_username.trim().is_empty() {
        return Err(ConfigError::MissingField("target_username"));
    }

    if config.start_bio_index > config.followers.len() {
        return Err(ConfigError::Validation(format!(
            "start_bio_index {} exceeds follower count {}",
            config.start_bio_index,
            config.followers.len()
        )));
    }

    if let Some(proxy) = &config.proxy {
        validate_proxy_url(proxy)?;
    }

    Ok(())
}

/// Validates the tuning settings
pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    validate_pacing(&settings.pacing)?;
    validate_api_settings(&settings.api)?;
    Ok(())
}

fn validate_pacing(pacing: &PacingConfig) -> Result<(), ConfigError> {
    validate_range("follower-page", &pacing.follower_page)?;
    validate_range("bio-fetch", &pacing.bio_fetch)?;
    validate_range("on-error", &pacing.on_error)?;

    if pacing.max_retries < 1 {
        return Err(ConfigError::Validation(
            "max-retries must be >= 1, got 0".to_string(),
        ));
    }

    Ok(())
}

/// Longest configurable pause, in seconds (one day)
const MAX_DELAY_SECS: f64 = 86_400.0;

fn validate_range(name: &str, range: &DelayRange) -> Result<(), ConfigError> {
    if !range.min.is_finite() || !range.max.is_finite() || range.min < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} must be a non-negative finite range, got {}..{}",
            name, range.min, range.max
        )));
    }

    if range.min > range.max {
        return Err(ConfigError::Validation(format!(
            "{} min ({}) must not exceed max ({})",
            name, range.min, range.max
        )));
    }

    if range.max > MAX_DELAY_SECS {
        return Err(ConfigError::Validation(format!(
            "{} max ({}) must not exceed {} seconds",
            name, range.max, MAX_DELAY_SECS
        )));
    }

    Ok(())
}

fn validate_api_settings(api: &ApiSettings) -> Result<(), ConfigError> {
    let url = Url::parse(&api.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::Validation(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if api.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if api.page_size < 1 || api.page_size > 200 {
        return Err(ConfigError::Validation(format!(
            "page-size must be between 1 and 200, got {}",
            api.page_size
        )));
    }

    Ok(())
}

fn validate_proxy_url(proxy: &str) -> Result<(), ConfigError> {
    let url = Url::parse(proxy).map_err(|e| {
        // the raw value may embed credentials, so it stays out of the message
        ConfigError::InvalidUrl(format!("Invalid proxy URL: {}", e))
    })?;

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(
            "Proxy URL has no host".to_string(),
        ));
    }

    Ok(())
}
