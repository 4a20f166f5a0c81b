//! Local persistence of downloaded artifacts.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;
use tracing::info;

/// Fallback artifact name when neither the service nor the source file
/// provides one.
pub const FALLBACK_ARTIFACT_NAME: &str = "processed_video.mp4";

pub type SinkResult<T> = Result<T, SinkError>;

/// Failure while persisting a downloaded artifact.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to store artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// A downloaded artifact ready to be persisted.
#[derive(Debug, Clone)]
pub struct SavedArtifact {
    /// File name the artifact should be stored under
    pub suggested_name: String,
    /// Content type reported by the service
    pub content_type: Option<String>,
    /// Artifact contents
    pub bytes: Vec<u8>,
}

/// Destination for downloaded artifacts.
///
/// The orchestrator treats a sink failure exactly like a download failure:
/// the session returns to Ready with the error recorded and the remote
/// artifact untouched.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn save(&self, artifact: SavedArtifact) -> SinkResult<()>;
}

/// Pick the local file name for a downloaded artifact.
///
/// Prefers the service-reported output name, then `processed_<source name>`,
/// then [`FALLBACK_ARTIFACT_NAME`].
pub fn suggested_artifact_name(
    output_filename: Option<&str>,
    source_name: Option<&str>,
) -> String {
    if let Some(name) = output_filename.filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    match source_name.filter(|n| !n.is_empty()) {
        Some(name) => format!("processed_{name}"),
        None => FALLBACK_ARTIFACT_NAME.to_string(),
    }
}

/// Strip any path components a server-provided name might carry.
fn file_name_component(name: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
        .unwrap_or_else(|| FALLBACK_ARTIFACT_NAME.to_string())
}

/// Sink that writes artifacts into a target directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct FileSink {
    target_dir: PathBuf,
}

impl FileSink {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
        }
    }

    /// Where an artifact with the given suggested name would land.
    pub fn path_for(&self, suggested_name: &str) -> PathBuf {
        self.target_dir.join(file_name_component(suggested_name))
    }
}

#[async_trait]
impl ArtifactSink for FileSink {
    async fn save(&self, artifact: SavedArtifact) -> SinkResult<()> {
        fs::create_dir_all(&self.target_dir).await?;
        let path = self.path_for(&artifact.suggested_name);
        fs::write(&path, &artifact.bytes).await?;
        info!(path = %path.display(), size_bytes = artifact.bytes.len(), "artifact saved");
        Ok(())
    }
}
