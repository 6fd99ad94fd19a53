//! State module for tracking crawl progress
//!
//! This module provides the data model of a crawl run.
//!
//! # Components
//!
//! - `CrawlState`: the resumable snapshot (phase, cursor, followers, bio index)
//! - `FollowerRecord` / `BioRecord`: the records produced by the two phases
//! - `Stage`: the controller's current state-machine node
//! - `CrawlStats`: per-run counters reported at completion

mod crawl_state;
mod records;
mod stage;

// Re-export main types
pub use crawl_state::{CrawlState, CrawlStats, Phase};
pub use records::{BioRecord, FollowerRecord};
pub use stage::Stage;
