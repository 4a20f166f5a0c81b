//! Effect service HTTP client.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{multipart, Client, StatusCode};
use tracing::debug;

use beatfx_models::{JobId, SourceFile};

use crate::error::{TransportError, TransportResult};
use crate::types::{FetchedArtifact, ProcessResponse, SubmitReceipt};

/// Default service URL (the service's own default port).
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";

/// Configuration for the effect service client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the rendering service
    pub base_url: String,
    /// Bound on the reachability probe
    pub probe_timeout: Duration,
    /// Bound on artifact fetch and delete
    pub request_timeout: Duration,
    /// Bound on submit; the service renders inside the POST
    pub submit_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVICE_URL.to_string(),
            probe_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            submit_timeout: Duration::from_secs(300), // rendering happens inside the request
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("BEATFX_SERVICE_URL")
                .unwrap_or_else(|_| DEFAULT_SERVICE_URL.to_string()),
            probe_timeout: Duration::from_secs(
                std::env::var("BEATFX_PROBE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            request_timeout: Duration::from_secs(
                std::env::var("BEATFX_REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            submit_timeout: Duration::from_secs(
                std::env::var("BEATFX_SUBMIT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
        }
    }
}

/// Client for the remote effect-rendering service.
///
/// Each operation resolves exactly once; there are no automatic retries.
/// Retrying is the caller reissuing the intent.
#[derive(Debug)]
pub struct EffectsClient {
    http: Client,
    config: ClientConfig,
}

impl EffectsClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> TransportResult<Self> {
        let http = Client::builder()
            .timeout(config.submit_timeout)
            .build()
            .map_err(TransportError::from_request)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> TransportResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// The configured base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Where a finished job can be streamed from.
    pub fn preview_url(&self, job_id: &JobId) -> String {
        format!("{}/preview/{}", self.base_url(), job_id)
    }

    /// Where a finished job's artifact can be fetched from.
    pub fn download_url(&self, job_id: &JobId) -> String {
        format!("{}/download/{}", self.base_url(), job_id)
    }

    fn delete_url(&self, job_id: &JobId) -> String {
        format!("{}/delete/{}", self.base_url(), job_id)
    }

    fn root_url(&self) -> String {
        format!("{}/", self.base_url())
    }

    /// Probe the service's liveness endpoint.
    ///
    /// Any 2xx means reachable; every other outcome (connect failure, probe
    /// timeout, non-2xx status) is `Unreachable`.
    pub async fn check_reachable(&self) -> TransportResult<()> {
        let url = self.root_url();
        debug!(url = %url, "probing service reachability");

        let response = self
            .http
            .get(&url)
            .timeout(self.config.probe_timeout)
            .send()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::Unreachable(format!(
                "liveness probe returned HTTP {status}"
            )))
        }
    }

    /// Upload a video plus its parameter payload and wait for the rendering.
    ///
    /// The service renders synchronously inside this request, so the call is
    /// bounded by the (long) submit timeout.
    pub async fn submit(
        &self,
        file: &SourceFile,
        params_json: String,
    ) -> TransportResult<SubmitReceipt> {
        let url = self.root_url();

        let file_part = multipart::Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.content_type())
            .map_err(|e| TransportError::Unknown(format!("invalid content type: {e}")))?;
        let form = multipart::Form::new()
            .part("file", file_part)
            .text("params", params_json);

        debug!(file = %file.name(), size_bytes = file.size_bytes(), "submitting video for processing");

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .timeout(self.config.submit_timeout)
            .send()
            .await
            .map_err(TransportError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::ServerRejected(format!(
                "HTTP {status}: {body}"
            )));
        }

        let body: ProcessResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Unknown(format!("malformed submit response: {e}")))?;

        if !body.success {
            return Err(TransportError::ServerRejected(
                body.message
                    .unwrap_or_else(|| "service reported failure without detail".to_string()),
            ));
        }

        let process_id = body
            .process_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                TransportError::ServerRejected("submit response is missing process_id".to_string())
            })?;

        debug!(job_id = %process_id, "submission accepted");
        Ok(SubmitReceipt {
            job_id: JobId::from(process_id),
            output_filename: body.filename,
        })
    }

    /// Fetch the processed artifact bytes.
    pub async fn fetch_artifact(&self, job_id: &JobId) -> TransportResult<FetchedArtifact> {
        let url = self.download_url(job_id);
        debug!(job_id = %job_id, "fetching processed artifact");

        let response = self
            .http
            .get(&url)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(TransportError::from_request)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound(format!("no artifact for job {job_id}")));
        }
        if !status.is_success() {
            return Err(TransportError::Unknown(format!(
                "artifact fetch returned HTTP {status}"
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = response
            .bytes()
            .await
            .map_err(TransportError::from_request)?
            .to_vec();

        debug!(job_id = %job_id, size_bytes = bytes.len(), "artifact fetched");
        Ok(FetchedArtifact { bytes, content_type })
    }

    /// Delete the job's server-side state and artifact.
    pub async fn remove(&self, job_id: &JobId) -> TransportResult<()> {
        let url = self.delete_url(job_id);
        debug!(job_id = %job_id, "deleting remote job");

        let response = self
            .http
            .delete(&url)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(TransportError::from_request)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound(format!("no job {job_id} to delete")));
        }
        if !status.is_success() {
            return Err(TransportError::Unknown(format!(
                "delete returned HTTP {status}"
            )));
        }

        Ok(())
    }
}
