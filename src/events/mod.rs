//! Progress events
//!
//! A run reports everything it does as a sequence of self-describing events,
//! one JSON object per line, each carrying an `event` discriminator. The
//! consuming process persists them; this crate never writes durable state.

mod emitter;

pub use emitter::{CollectingSink, JsonLinesEmitter};

use crate::state::{BioRecord, FollowerRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Phase transition markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseMarker {
    CollectingFollowers,
    FetchingBios,
}

/// One progress record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Non-fatal diagnostic
    Info { message: String },

    SessionValid { username: String },

    Phase { phase: PhaseMarker },

    UserResolved { user_id: String },

    FollowersPage {
        new_count: usize,
        total: usize,
        cursor: Option<String>,
        users: Vec<FollowerRecord>,
    },

    FollowersDone { total: usize },

    BioResult {
        index: usize,
        username: String,
        bio_data: BioRecord,
    },

    BioSkip {
        index: usize,
        username: String,
        reason: String,
    },

    RateLimited {
        context: String,
        /// Seconds until the retry
        wait: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attempt: Option<u32>,
    },

    /// Recoverable failure; a retry follows after `wait` seconds
    Error {
        message: String,
        context: String,
        wait: u64,
    },

    /// Last event before a non-zero exit
    Fatal { message: String },

    Terminated,

    Done,
}

/// Errors that can occur while emitting events
#[derive(Debug, Error)]
pub enum EmitError {
    /// The consumer closed its end of the stream
    #[error("event stream closed by consumer")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination of progress events
pub trait EventSink {
    fn emit(&mut self, event: &Event) -> Result<(), EmitError>;
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn emit(&mut self, event: &Event) -> Result<(), EmitError> {
        (**self).emit(event)
    }
}
