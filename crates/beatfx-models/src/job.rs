//! Job identity and lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier the service assigns to a submitted job.
///
/// Never minted locally; it only exists once the service has accepted an
/// upload, and it keys every follow-up operation (preview, download, delete).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lifecycle status of a job session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Nothing in flight; a file may or may not be selected
    #[default]
    Idle,
    /// Reachability probe running ahead of the upload
    Submitting,
    /// Upload dispatched, waiting for the service to finish rendering
    AwaitingResult,
    /// Result available remotely; preview/download/delete permitted
    Ready,
    /// Artifact fetch in flight
    Downloading,
    /// Remote delete in flight
    Deleting,
    /// Remote state removed; session identity is gone
    Deleted,
    /// Submission failed; a new process request may be issued
    Failed,
}

impl SessionStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Submitting => "submitting",
            SessionStatus::AwaitingResult => "awaiting_result",
            SessionStatus::Ready => "ready",
            SessionStatus::Downloading => "downloading",
            SessionStatus::Deleting => "deleting",
            SessionStatus::Deleted => "deleted",
            SessionStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state for the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Deleted | SessionStatus::Failed)
    }

    /// Check if a network operation is currently in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SessionStatus::Submitting
                | SessionStatus::AwaitingResult
                | SessionStatus::Downloading
                | SessionStatus::Deleting
        )
    }

    /// Whether a process request is accepted in this state.
    pub fn accepts_process(&self) -> bool {
        matches!(self, SessionStatus::Idle | SessionStatus::Failed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the service reported about a finished job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// Output file name as reported by the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_filename: Option<String>,

    /// Artifact size in bytes, learned on the first successful fetch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,

    /// Where the rendering can be streamed from
    pub preview_url: String,

    /// Where the artifact can be fetched from
    pub download_url: String,
}
