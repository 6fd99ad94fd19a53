use crate::config::types::{RunConfig, Settings};
use crate::config::validation::{validate_run_config, validate_settings};
use crate::ConfigError;
use std::io::Read;
use std::path::Path;

/// Parses and validates a JSON run config
///
/// # Returns
///
/// * `Ok(RunConfig)` - Successfully parsed and validated configuration
/// * `Err(ConfigError)` - Empty input, malformed JSON, or failed validation
pub fn parse_run_config(content: &str) -> Result<RunConfig, ConfigError> {
    if content.trim().is_empty() {
        return Err(ConfigError::Empty);
    }

    let config: RunConfig = serde_json::from_str(content)?;
    validate_run_config(&config)?;

    Ok(config)
}

/// Reads a run config to the end of `reader` (usually stdin)
pub fn read_run_config<R: Read>(mut reader: R) -> Result<RunConfig, ConfigError> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    parse_run_config(&content)
}

/// Loads a run config from a JSON file
pub fn load_run_config(path: &Path) -> Result<RunConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_run_config(&content)
}

/// Parses and validates TOML settings
pub fn parse_settings(content: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = toml::from_str(content)?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Loads settings from a TOML file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use follower_crawl::config::load_settings;
///
/// let settings = load_settings(Path::new("settings.toml")).unwrap();
/// println!("Error backoff: {:?}", settings.pacing.on_error);
/// ```
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_settings(&content)
}
