/// Controller stage definitions for tracking crawl progress
///
/// This module defines every node of the crawl state machine.
use std::fmt;

/// Represents the current stage of the crawl controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    // ===== Active Stages =====
    /// Nothing has happened yet
    Init,

    /// Probing the session with an identity-check call
    ValidatingSession,

    /// Looking up the target's numeric identifier by username
    ResolvingTarget,

    /// Walking the follower list page by page
    PaginatingFollowers,

    /// Fetching profile details for each collected follower
    FetchingBios,

    // ===== Terminal Stages =====
    /// Run completed normally
    Done,

    /// Run stopped at a checkpoint after a cancellation request
    Terminated,

    /// Run aborted on an unrecoverable error
    Fatal,
}

impl Stage {
    /// Returns true if the run ends with a zero exit status from this stage
    pub fn is_clean_exit(&self) -> bool {
        matches!(self, Self::Done | Self::Terminated)
    }

    /// Returns the stable snake_case name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::ValidatingSession => "validating_session",
            Self::ResolvingTarget => "resolving_target",
            Self::PaginatingFollowers => "paginating_followers",
            Self::FetchingBios => "fetching_bios",
            Self::Done => "done",
            Self::Terminated => "terminated",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
