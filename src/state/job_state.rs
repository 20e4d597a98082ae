/// Job state definitions for tracking crawl outcomes
///
/// This module defines the terminal states a job can end in once a worker
/// has finished with it.
use std::fmt;

/// Terminal outcome of a processed job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    // ===== Terminal Success States =====
    /// Body was fetched and written to the mirror
    Mirrored,

    // ===== Terminal Error States =====
    /// Server answered 404 or 410
    DeadLink,

    /// Server answered any other non-2xx status (including unfollowed redirects)
    HttpError,

    /// Host could not be reached (connection refused, DNS failure, timeout)
    Unreachable,

    /// Transport failed for another reason (TLS, truncated body, ...)
    Failed,

    /// Body was fetched but could not be written to disk
    PersistFailed,
}

impl JobState {
    /// Returns true if the job produced a file in the mirror
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Mirrored)
    }

    /// Returns true if the failure happened on the network side
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::DeadLink | Self::HttpError | Self::Unreachable | Self::Failed
        )
    }

    /// Stable snake_case name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mirrored => "mirrored",
            Self::DeadLink => "dead_link",
            Self::HttpError => "http_error",
            Self::Unreachable => "unreachable",
            Self::Failed => "failed",
            Self::PersistFailed => "persist_failed",
        }
    }

    /// Returns all possible job states
    pub fn all_states() -> [Self; 6] {
        [
            Self::Mirrored,
            Self::DeadLink,
            Self::HttpError,
            Self::Unreachable,
            Self::Failed,
            Self::PersistFailed,
        ]
    }

    /// Index of this state in `all_states()`
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
