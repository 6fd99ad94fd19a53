//! The resumable crawl snapshot

use crate::config::RunConfig;
use crate::state::FollowerRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level stage a run starts from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Collect the follower list, then enrich it
    #[default]
    Full,

    /// The follower list is complete; only enrich it
    Bios,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Bios => write!(f, "bios"),
        }
    }
}

/// Resumable snapshot of a crawl
///
/// Owned exclusively by the controller. The follower list only grows, in
/// platform order, and `next_bio_index` never exceeds its length.
#[derive(Debug, Clone)]
pub struct CrawlState {
    phase: Phase,
    pagination_cursor: Option<String>,
    followers: Vec<FollowerRecord>,
    next_bio_index: usize,
    resolved_target_id: Option<String>,
    limit: Option<usize>,
}

impl CrawlState {
    /// Creates an empty state for a fresh run
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            phase: Phase::Full,
            pagination_cursor: None,
            followers: Vec::new(),
            next_bio_index: 0,
            resolved_target_id: None,
            limit: limit.filter(|&n| n > 0),
        }
    }

    /// Builds the state from a validated input configuration
    ///
    /// A `max_followers` of zero means no cap. The bio index is clamped to the
    /// follower count so the index invariant holds even for unvalidated input.
    pub fn from_config(config: &RunConfig) -> Self {
        let next_bio_index = config.start_bio_index.min(config.followers.len());

        Self {
            phase: config.phase,
            pagination_cursor: config.cursor.clone().filter(|c| !c.is_empty()),
            followers: config.followers.clone(),
            next_bio_index,
            resolved_target_id: config.target_user_id.clone().filter(|id| !id.is_empty()),
            limit: config.max_followers.filter(|&n| n > 0),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pagination_cursor(&self) -> Option<&str> {
        self.pagination_cursor.as_deref()
    }

    pub fn followers(&self) -> &[FollowerRecord] {
        &self.followers
    }

    pub fn next_bio_index(&self) -> usize {
        self.next_bio_index
    }

    pub fn resolved_target_id(&self) -> Option<&str> {
        self.resolved_target_id.as_deref()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns true once the follower cap (if any) has been reached
    pub fn cap_reached(&self) -> bool {
        self.limit
            .map_or(false, |limit| self.followers.len() >= limit)
    }

    /// Drops followers beyond the cap and returns how many were dropped
    ///
    /// A replayed list may have been collected under a larger cap or none.
    pub fn truncate_to_limit(&mut self) -> usize {
        let limit = match self.limit {
            Some(limit) if self.followers.len() > limit => limit,
            _ => return 0,
        };

        let dropped = self.followers.len() - limit;
        self.followers.truncate(limit);
        self.next_bio_index = self.next_bio_index.min(limit);
        dropped
    }

    /// Records the resolved target id; an already-known id is kept
    pub fn set_resolved_target_id(&mut self, id: String) {
        if self.resolved_target_id.is_none() {
            self.resolved_target_id = Some(id);
        }
    }

    /// Appends one page of followers and moves the cursor
    ///
    /// Users beyond the remaining capacity are dropped before appending.
    /// Returns the records actually appended.
    pub fn append_page(
        &mut self,
        mut users: Vec<FollowerRecord>,
        next_cursor: Option<String>,
    ) -> &[FollowerRecord] {
        if let Some(limit) = self.limit {
            users.truncate(limit.saturating_sub(self.followers.len()));
        }

        let start = self.followers.len();
        self.followers.extend(users);
        self.pagination_cursor = next_cursor;
        &self.followers[start..]
    }

    /// Marks the follower list as complete
    pub fn finish_pagination(&mut self) {
        self.phase = Phase::Bios;
    }

    /// Moves past the follower at `next_bio_index`, whatever its outcome
    pub fn advance_bio_index(&mut self) {
        if self.next_bio_index < self.followers.len() {
            self.next_bio_index += 1;
        }
    }
}

/// Counters for a single run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub pages_fetched: u64,
    pub followers_collected: u64,
    pub bios_enriched: u64,
    pub bios_skipped: u64,
    pub retries: u64,
}

impl CrawlStats {
    /// Followers whose enrichment reached a result or a skip
    pub fn bios_processed(&self) -> u64 {
        self.bios_enriched + self.bios_skipped
    }
}
