//! Randomized pacing and retry backoff
//!
//! Every wait is drawn uniformly from a configured range; waits are never
//! fixed, so request timing has no periodic signature. Rate-limit recovery
//! scales the error-range draw by the attempt number, without a cap.

use crate::config::{DelayRange, PacingConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Draws a delay from `range`, scaled by `attempt + 1` when an attempt is given
///
/// # Arguments
///
/// * `range` - Range of seconds to draw from
/// * `attempt` - Zero-based attempt number for rate-limit recovery, `None` otherwise
/// * `rng` - Source of randomness
pub fn delay<R: Rng + ?Sized>(range: &DelayRange, attempt: Option<u32>, rng: &mut R) -> Duration {
    let secs = if range.max > range.min {
        rng.gen_range(range.min..=range.max)
    } else {
        range.min
    };
    let scale = attempt.map_or(1.0, |a| f64::from(a) + 1.0);

    // Late rate-limit attempts can scale past what a Duration holds
    Duration::try_from_secs_f64((secs * scale).max(0.0)).unwrap_or(Duration::MAX)
}

/// Backoff policy bound to a pacing configuration
#[derive(Debug)]
pub struct Backoff<R = StdRng> {
    pacing: PacingConfig,
    rng: R,
}

impl Backoff<StdRng> {
    /// Creates a policy seeded from the operating system
    pub fn new(pacing: PacingConfig) -> Self {
        Self::with_rng(pacing, StdRng::from_entropy())
    }
}

impl<R: Rng> Backoff<R> {
    pub fn with_rng(pacing: PacingConfig, rng: R) -> Self {
        Self { pacing, rng }
    }

    pub fn pacing(&self) -> &PacingConfig {
        &self.pacing
    }

    /// Pause between two follower pages
    pub fn follower_page(&mut self) -> Duration {
        delay(&self.pacing.follower_page, None, &mut self.rng)
    }

    /// Pause between two profile fetches
    pub fn bio_fetch(&mut self) -> Duration {
        delay(&self.pacing.bio_fetch, None, &mut self.rng)
    }

    /// Wait before retrying after a generic failure
    pub fn on_error(&mut self) -> Duration {
        delay(&self.pacing.on_error, None, &mut self.rng)
    }

    /// Wait before retrying after a rate limit on zero-based `attempt`
    pub fn rate_limited(&mut self, attempt: u32) -> Duration {
        delay(&self.pacing.on_error, Some(attempt), &mut self.rng)
    }
}

/// Whole seconds reported in events
pub fn wait_secs(wait: Duration) -> u64 {
    wait.as_secs_f64().round() as u64
}
