//! Shared data models for the BeatFX client.
//!
//! This crate provides Serde-serializable types for:
//! - Effect parameters, their domains, and wire serialization
//! - Source video files selected for upload
//! - Job identity and session lifecycle status

pub mod job;
pub mod params;
pub mod source;

// Re-export common types
pub use job::{JobId, ResultMetadata, SessionStatus};
pub use params::{ParameterSet, ParamsError, Tunable};
pub use source::{guess_content_type, SourceFile, SUPPORTED_CONTAINERS};
