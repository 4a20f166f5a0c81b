//! Job session state machine and orchestration for the BeatFX client.
//!
//! The [`SessionOrchestrator`] owns one [`JobSession`] at a time and is its
//! only writer: the presentation layer expresses intents (select a file,
//! process, download, delete) and reads back the [`SessionSnapshot`]
//! projection. Downloaded artifacts leave the core through the
//! [`ArtifactSink`] seam.

pub mod orchestrator;
pub mod session;
pub mod sink;

pub use orchestrator::SessionOrchestrator;
pub use session::{JobSession, SelectedFile, SessionSnapshot};
pub use sink::{
    suggested_artifact_name, ArtifactSink, FileSink, SavedArtifact, SinkError, SinkResult,
    FALLBACK_ARTIFACT_NAME,
};
