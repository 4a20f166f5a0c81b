//! Session orchestrator: the single writer of the job session.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use beatfx_client::EffectsClient;
use beatfx_models::{ParameterSet, ResultMetadata, SessionStatus, SourceFile};

use crate::session::{JobSession, SessionSnapshot};
use crate::sink::{suggested_artifact_name, ArtifactSink, SavedArtifact};

struct SessionState {
    /// Identity of the current session incarnation; bumped whenever a fresh
    /// session is installed so late results from the old one are discarded.
    epoch: u64,
    source: Option<SourceFile>,
    session: JobSession,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot(self.source.as_ref())
    }

    fn install_fresh_session(&mut self) {
        self.epoch += 1;
        self.session = JobSession::new();
    }
}

/// Drives one job session at a time against the remote service.
///
/// Every operation is an intent: arriving in the wrong status makes it a
/// no-op that returns the current snapshot, which is what serializes
/// concurrent misuse. State lives behind a mutex that is never held across a
/// network await; each network call captures the session epoch at dispatch
/// and its result is silently dropped if a new session was installed in the
/// meantime.
pub struct SessionOrchestrator {
    client: EffectsClient,
    sink: Arc<dyn ArtifactSink>,
    state: Mutex<SessionState>,
}

impl SessionOrchestrator {
    /// Create an orchestrator with no file selected.
    pub fn new(client: EffectsClient, sink: Arc<dyn ArtifactSink>) -> Self {
        Self {
            client,
            sink,
            state: Mutex::new(SessionState {
                epoch: 0,
                source: None,
                session: JobSession::new(),
            }),
        }
    }

    /// Current read-only projection.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Replace the selected file and start a fresh session.
    ///
    /// Unconditional: anything in flight belongs to the old epoch and its
    /// result will be discarded on arrival.
    pub async fn select_file(&self, file: SourceFile) -> SessionSnapshot {
        let mut state = self.state.lock().await;
        info!(file = %file.name(), size_bytes = file.size_bytes(), "file selected, starting fresh session");
        state.source = Some(file);
        state.install_fresh_session();
        state.snapshot()
    }

    /// Validate the parameters, probe the service, and submit the file.
    ///
    /// No-op without a selected file or outside Idle/Failed. A validation
    /// failure is surfaced in `error_detail` without a status change and
    /// never reaches the network.
    pub async fn request_process(&self, params: &ParameterSet) -> SessionSnapshot {
        let (epoch, file, payload) = {
            let mut state = self.state.lock().await;

            if !state.session.status().accepts_process() {
                debug!(status = %state.session.status(), "process request ignored in current status");
                return state.snapshot();
            }
            let Some(file) = state.source.clone() else {
                debug!("process requested without a selected file");
                return state.snapshot();
            };

            if let Err(e) = params.validate() {
                debug!(error = %e, "parameter validation failed");
                state.session.record_local_error(e.to_string());
                return state.snapshot();
            }
            let payload = match params.to_json() {
                Ok(payload) => payload,
                Err(e) => {
                    state
                        .session
                        .record_local_error(format!("failed to encode parameters: {e}"));
                    return state.snapshot();
                }
            };

            state.session.begin_submit();
            (state.epoch, file, payload)
        };

        if let Err(e) = self.client.check_reachable().await {
            let mut state = self.state.lock().await;
            if state.epoch != epoch {
                debug!("discarding stale probe result");
                return state.snapshot();
            }
            warn!(error = %e, "reachability probe failed");
            state.session.fail_submit(e.to_string());
            return state.snapshot();
        }

        {
            let mut state = self.state.lock().await;
            if state.epoch != epoch {
                debug!("discarding stale probe result");
                return state.snapshot();
            }
            state.session.mark_awaiting();
        }

        let outcome = self.client.submit(&file, payload).await;

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            debug!("discarding stale submit result");
            return state.snapshot();
        }
        match outcome {
            Ok(receipt) => {
                info!(job_id = %receipt.job_id, "processing accepted");
                let result = ResultMetadata {
                    output_filename: receipt.output_filename,
                    size_bytes: None,
                    preview_url: self.client.preview_url(&receipt.job_id),
                    download_url: self.client.download_url(&receipt.job_id),
                };
                state.session.complete_submit(receipt.job_id, result);
            }
            Err(e) => {
                warn!(error = %e, "submission failed");
                state.session.fail_submit(e.to_string());
            }
        }
        state.snapshot()
    }

    /// Fetch the artifact and hand it to the sink.
    ///
    /// No-op unless Ready. The session returns to Ready whatever the
    /// outcome; a fetch or sink failure only records `error_detail`.
    pub async fn request_download(&self) -> SessionSnapshot {
        let (epoch, job_id, suggested_name) = {
            let mut state = self.state.lock().await;

            if state.session.status() != SessionStatus::Ready {
                debug!(status = %state.session.status(), "download request ignored in current status");
                return state.snapshot();
            }
            let Some(job_id) = state.session.job_id().cloned() else {
                debug!("download requested without a job id");
                return state.snapshot();
            };

            let suggested_name = suggested_artifact_name(
                state
                    .session
                    .result()
                    .and_then(|r| r.output_filename.as_deref()),
                state.source.as_ref().map(|f| f.name()),
            );
            state.session.begin_download();
            (state.epoch, job_id, suggested_name)
        };

        let fetched = match self.client.fetch_artifact(&job_id).await {
            Ok(fetched) => fetched,
            Err(e) => {
                let mut state = self.state.lock().await;
                if state.epoch != epoch {
                    debug!("discarding stale download result");
                    return state.snapshot();
                }
                warn!(job_id = %job_id, error = %e, "artifact fetch failed");
                state.session.fail_download(e.to_string());
                return state.snapshot();
            }
        };

        // A stale artifact must not reach the sink.
        {
            let state = self.state.lock().await;
            if state.epoch != epoch {
                debug!("discarding stale download result");
                return state.snapshot();
            }
        }

        let size_bytes = fetched.bytes.len() as u64;
        let saved = self
            .sink
            .save(SavedArtifact {
                suggested_name,
                content_type: fetched.content_type,
                bytes: fetched.bytes,
            })
            .await;

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            debug!("discarding stale download result");
            return state.snapshot();
        }
        match saved {
            Ok(()) => {
                info!(job_id = %job_id, size_bytes, "artifact downloaded");
                state.session.finish_download(size_bytes);
            }
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "artifact sink failed");
                state.session.fail_download(e.to_string());
            }
        }
        state.snapshot()
    }

    /// Remove the remote artifact and retire the session.
    ///
    /// No-op unless Ready. On success the old session ends in Deleted and a
    /// fresh Idle session is installed; on failure the id stays valid so the
    /// delete can be retried.
    pub async fn request_delete(&self) -> SessionSnapshot {
        let (epoch, job_id) = {
            let mut state = self.state.lock().await;

            if state.session.status() != SessionStatus::Ready {
                debug!(status = %state.session.status(), "delete request ignored in current status");
                return state.snapshot();
            }
            let Some(job_id) = state.session.job_id().cloned() else {
                debug!("delete requested without a job id");
                return state.snapshot();
            };

            state.session.begin_delete();
            (state.epoch, job_id)
        };

        let outcome = self.client.remove(&job_id).await;

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            debug!("discarding stale delete result");
            return state.snapshot();
        }
        match outcome {
            Ok(()) => {
                info!(job_id = %job_id, "remote artifact deleted");
                state.session.complete_delete();
                state.source = None;
                state.install_fresh_session();
            }
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "delete failed, artifact retained");
                state.session.fail_delete(e.to_string());
            }
        }
        state.snapshot()
    }
}
