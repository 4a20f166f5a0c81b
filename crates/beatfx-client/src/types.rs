//! Service request/response types.

use beatfx_models::JobId;
use serde::{Deserialize, Serialize};

/// Raw response body from the submit endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    /// Whether the service accepted and rendered the upload
    pub success: bool,

    /// Identifier keying follow-up operations, set on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_id: Option<String>,

    /// Output file name, when the service reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Human-readable detail, set on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// An accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// Server-assigned job identifier
    pub job_id: JobId,
    /// Output file name, when the service reports one
    pub output_filename: Option<String>,
}

/// Raw bytes fetched from the download endpoint.
#[derive(Debug, Clone)]
pub struct FetchedArtifact {
    /// Artifact contents
    pub bytes: Vec<u8>,
    /// Content type reported by the service
    pub content_type: Option<String>,
}
