//! Configuration module for Follower-Crawl
//!
//! Two inputs configure a run:
//!
//! - the **run config**, a JSON record handed over by the driving process
//!   (credentials, target, and resume state), and
//! - optional **settings**, a TOML file tuning pacing delays and API access.
//!
//! # Example
//!
//! ```no_run
//! use follower_crawl::config::{load_settings, parse_run_config};
//! use std::path::Path;
//!
//! let run = parse_run_config(r#"{"session_id": "abc", "target_username": "someone"}"#).unwrap();
//! let settings = load_settings(Path::new("settings.toml")).unwrap();
//! println!("Crawling @{} with {} retries", run.target_username, settings.pacing.max_retries);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ApiSettings, DelayRange, PacingConfig, RunConfig, Settings};

// Re-export parser functions
pub use parser::{load_run_config, load_settings, parse_run_config, parse_settings, read_run_config};
