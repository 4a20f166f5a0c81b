//! One job's lifecycle state.
//!
//! A [`JobSession`] tracks a single submission from intent to deletion. All
//! transitions are driven by the orchestrator; the presentation layer only
//! ever sees the read-only [`SessionSnapshot`] projection.

use chrono::{DateTime, Utc};
use serde::Serialize;

use beatfx_models::{JobId, ResultMetadata, SessionStatus, SourceFile};

/// Mutable state of one job session.
#[derive(Debug, Clone)]
pub struct JobSession {
    status: SessionStatus,
    job_id: Option<JobId>,
    result: Option<ResultMetadata>,
    error_detail: Option<String>,
    updated_at: DateTime<Utc>,
}

impl JobSession {
    /// Create a fresh Idle session.
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            job_id: None,
            result: None,
            error_detail: None,
            updated_at: Utc::now(),
        }
    }

    /// Current lifecycle status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Server-assigned job id, present once a submission was accepted.
    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    /// Result metadata, present once the session reached Ready.
    pub fn result(&self) -> Option<&ResultMetadata> {
        self.result.as_ref()
    }

    /// Detail of the most recent failure, if any.
    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    /// When the session last changed.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Record a local failure (validation) without a status change.
    pub(crate) fn record_local_error(&mut self, detail: impl Into<String>) {
        self.error_detail = Some(detail.into());
        self.touch();
    }

    /// Enter Submitting ahead of the reachability probe.
    pub(crate) fn begin_submit(&mut self) {
        self.status = SessionStatus::Submitting;
        self.error_detail = None;
        self.result = None;
        self.touch();
    }

    /// Probe passed, upload dispatched.
    pub(crate) fn mark_awaiting(&mut self) {
        self.status = SessionStatus::AwaitingResult;
        self.touch();
    }

    /// Submission accepted: record identity and metadata, enter Ready.
    pub(crate) fn complete_submit(&mut self, job_id: JobId, result: ResultMetadata) {
        self.status = SessionStatus::Ready;
        self.job_id = Some(job_id);
        self.result = Some(result);
        self.error_detail = None;
        self.touch();
    }

    /// Submission failed: terminal until a new process request or file.
    pub(crate) fn fail_submit(&mut self, detail: impl Into<String>) {
        self.status = SessionStatus::Failed;
        self.error_detail = Some(detail.into());
        self.touch();
    }

    /// Enter Downloading.
    pub(crate) fn begin_download(&mut self) {
        self.status = SessionStatus::Downloading;
        self.error_detail = None;
        self.touch();
    }

    /// Artifact fetched and persisted; record its size and return to Ready.
    pub(crate) fn finish_download(&mut self, size_bytes: u64) {
        self.status = SessionStatus::Ready;
        if let Some(result) = self.result.as_mut() {
            result.size_bytes = Some(size_bytes);
        }
        self.touch();
    }

    /// Download failed; non-destructive, the remote artifact may still exist.
    pub(crate) fn fail_download(&mut self, detail: impl Into<String>) {
        self.status = SessionStatus::Ready;
        self.error_detail = Some(detail.into());
        self.touch();
    }

    /// Enter Deleting.
    pub(crate) fn begin_delete(&mut self) {
        self.status = SessionStatus::Deleting;
        self.error_detail = None;
        self.touch();
    }

    /// Remote state removed; the session identity is gone.
    pub(crate) fn complete_delete(&mut self) {
        self.status = SessionStatus::Deleted;
        self.job_id = None;
        self.result = None;
        self.error_detail = None;
        self.touch();
    }

    /// Delete failed; the id must stay valid for a retry.
    pub(crate) fn fail_delete(&mut self, detail: impl Into<String>) {
        self.status = SessionStatus::Ready;
        self.error_detail = Some(detail.into());
        self.touch();
    }

    /// Build the read-only projection.
    pub(crate) fn snapshot(&self, source: Option<&SourceFile>) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            job_id: self.job_id.clone(),
            result: self.result.clone(),
            error_detail: self.error_detail.clone(),
            source: source.map(|f| SelectedFile {
                name: f.name().to_string(),
                size_bytes: f.size_bytes(),
            }),
        }
    }
}

impl Default for JobSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Name and size of the currently selected file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedFile {
    pub name: String,
    pub size_bytes: u64,
}

/// Read-only projection of the session for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// Current lifecycle status
    pub status: SessionStatus,

    /// Server-assigned job id, present once a submission was accepted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,

    /// Result metadata, present once the session reached Ready
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultMetadata>,

    /// Detail of the most recent failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,

    /// Currently selected file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SelectedFile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> ResultMetadata {
        ResultMetadata {
            output_filename: Some("out.mp4".to_string()),
            size_bytes: None,
            preview_url: "http://localhost:8000/preview/abc".to_string(),
            download_url: "http://localhost:8000/download/abc".to_string(),
        }
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = JobSession::new();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.job_id().is_none());
        assert!(session.result().is_none());
        assert!(session.error_detail().is_none());
    }

    #[test]
    fn test_submit_flow_transitions() {
        let mut session = JobSession::new();

        session.begin_submit();
        assert_eq!(session.status(), SessionStatus::Submitting);

        session.mark_awaiting();
        assert_eq!(session.status(), SessionStatus::AwaitingResult);

        session.complete_submit(JobId::from("abc"), sample_result());
        assert_eq!(session.status(), SessionStatus::Ready);
        assert_eq!(session.job_id(), Some(&JobId::from("abc")));
        assert_eq!(session.result().unwrap().output_filename.as_deref(), Some("out.mp4"));
        assert!(session.error_detail().is_none());
    }

    #[test]
    fn test_fail_submit_sets_detail() {
        let mut session = JobSession::new();
        session.begin_submit();
        session.fail_submit("service unreachable: connection refused");

        assert_eq!(session.status(), SessionStatus::Failed);
        assert!(session.status().is_terminal());
        assert_eq!(
            session.error_detail(),
            Some("service unreachable: connection refused")
        );
        assert!(session.job_id().is_none());
    }

    #[test]
    fn test_begin_submit_clears_previous_failure() {
        let mut session = JobSession::new();
        session.begin_submit();
        session.fail_submit("boom");

        session.begin_submit();
        assert_eq!(session.status(), SessionStatus::Submitting);
        assert!(session.error_detail().is_none());
    }

    #[test]
    fn test_finish_download_records_size() {
        let mut session = JobSession::new();
        session.begin_submit();
        session.mark_awaiting();
        session.complete_submit(JobId::from("abc"), sample_result());

        session.begin_download();
        assert_eq!(session.status(), SessionStatus::Downloading);

        session.finish_download(2048);
        assert_eq!(session.status(), SessionStatus::Ready);
        assert_eq!(session.result().unwrap().size_bytes, Some(2048));
    }

    #[test]
    fn test_download_failure_returns_to_ready_and_keeps_id() {
        let mut session = JobSession::new();
        session.begin_submit();
        session.mark_awaiting();
        session.complete_submit(JobId::from("abc"), sample_result());

        session.begin_download();
        session.fail_download("artifact fetch returned HTTP 500");

        assert_eq!(session.status(), SessionStatus::Ready);
        assert_eq!(session.job_id(), Some(&JobId::from("abc")));
        assert!(session.error_detail().unwrap().contains("500"));
    }

    #[test]
    fn test_delete_failure_retains_id() {
        let mut session = JobSession::new();
        session.begin_submit();
        session.mark_awaiting();
        session.complete_submit(JobId::from("abc"), sample_result());

        session.begin_delete();
        assert_eq!(session.status(), SessionStatus::Deleting);

        session.fail_delete("delete returned HTTP 500");
        assert_eq!(session.status(), SessionStatus::Ready);
        assert_eq!(session.job_id(), Some(&JobId::from("abc")));
    }

    #[test]
    fn test_complete_delete_clears_identity() {
        let mut session = JobSession::new();
        session.begin_submit();
        session.mark_awaiting();
        session.complete_submit(JobId::from("abc"), sample_result());

        session.begin_delete();
        session.complete_delete();

        assert_eq!(session.status(), SessionStatus::Deleted);
        assert!(session.status().is_terminal());
        assert!(session.job_id().is_none());
        assert!(session.result().is_none());
    }

    #[test]
    fn test_local_error_keeps_status() {
        let mut session = JobSession::new();
        session.record_local_error("min_shape_size (50) must be strictly less than max_shape_size (40)");

        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.error_detail().unwrap().contains("min_shape_size"));
    }

    #[test]
    fn test_snapshot_projection() {
        let mut session = JobSession::new();
        session.begin_submit();
        session.mark_awaiting();
        session.complete_submit(JobId::from("abc"), sample_result());

        let file = SourceFile::from_bytes("input.mp4", vec![0u8; 16]);
        let snapshot = session.snapshot(Some(&file));

        assert_eq!(snapshot.status, SessionStatus::Ready);
        assert_eq!(snapshot.job_id, Some(JobId::from("abc")));
        assert_eq!(
            snapshot.source,
            Some(SelectedFile {
                name: "input.mp4".to_string(),
                size_bytes: 16,
            })
        );

        let empty = session.snapshot(None);
        assert_eq!(empty.source, None);
    }

    #[test]
    fn test_transitions_bump_updated_at() {
        let mut session = JobSession::new();
        let created = session.updated_at();
        session.begin_submit();
        assert!(session.updated_at() >= created);
    }
}
