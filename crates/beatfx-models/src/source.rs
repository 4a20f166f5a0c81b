//! Source video file selected for processing.

use std::io;
use std::path::Path;

/// Video containers the service is known to accept.
pub const SUPPORTED_CONTAINERS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

/// Fallback MIME type for unrecognized extensions.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Guess the MIME type of a video file from its extension.
pub fn guess_content_type(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        _ => FALLBACK_CONTENT_TYPE,
    }
}

fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// A video file held in memory, ready for upload.
///
/// Owned by the orchestrator for the lifetime of a session: replaced when a
/// new file is selected, dropped after a successful delete, and kept across
/// a failure so the same file can be resubmitted without reselection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl SourceFile {
    /// Create from raw bytes with an explicit MIME type.
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Create from raw bytes, guessing the MIME type from the name.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let content_type = guess_content_type(&name).to_string();
        Self {
            name,
            content_type,
            bytes,
        }
    }

    /// Read a file from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(String::from)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::from_bytes(name, bytes))
    }

    /// File name as presented to the service.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIME type sent with the upload.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Raw file contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// File size in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Whether the extension is one of the known-good video containers.
    ///
    /// Advisory only: the service remains the authority on what it accepts.
    pub fn is_supported_container(&self) -> bool {
        matches!(extension(&self.name).as_deref(), Some(ext) if SUPPORTED_CONTAINERS.contains(&ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type("clip.mp4"), "video/mp4");
        assert_eq!(guess_content_type("clip.MOV"), "video/quicktime");
        assert_eq!(guess_content_type("clip.avi"), "video/x-msvideo");
        assert_eq!(guess_content_type("clip.mkv"), "video/x-matroska");
        assert_eq!(guess_content_type("clip.webm"), "video/webm");
        assert_eq!(guess_content_type("notes.txt"), FALLBACK_CONTENT_TYPE);
        assert_eq!(guess_content_type("no_extension"), FALLBACK_CONTENT_TYPE);
    }

    #[test]
    fn test_from_bytes_guesses_type() {
        let file = SourceFile::from_bytes("demo.webm", vec![1, 2, 3]);
        assert_eq!(file.name(), "demo.webm");
        assert_eq!(file.content_type(), "video/webm");
        assert_eq!(file.size_bytes(), 3);
    }

    #[test]
    fn test_supported_container_gating() {
        assert!(SourceFile::from_bytes("a.mp4", vec![]).is_supported_container());
        assert!(SourceFile::from_bytes("a.MKV", vec![]).is_supported_container());
        assert!(!SourceFile::from_bytes("a.txt", vec![]).is_supported_container());
        assert!(!SourceFile::from_bytes("mp4", vec![]).is_supported_container());
    }

    #[tokio::test]
    async fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.mp4");
        tokio::fs::write(&path, b"fake video bytes").await.unwrap();

        let file = SourceFile::from_path(&path).await.unwrap();
        assert_eq!(file.name(), "input.mp4");
        assert_eq!(file.content_type(), "video/mp4");
        assert_eq!(file.bytes(), b"fake video bytes");
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let err = SourceFile::from_path("/nonexistent/input.mp4").await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
