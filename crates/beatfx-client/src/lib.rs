//! HTTP client for the remote BeatFX rendering service.
//!
//! The service exposes a tiny contract: a liveness probe, a multipart submit
//! that renders synchronously, and per-job preview/download/delete endpoints.
//! Every failure is normalized into a [`TransportError`] so callers never see
//! raw reqwest errors.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ClientConfig, EffectsClient, DEFAULT_SERVICE_URL};
pub use error::{ErrorKind, TransportError, TransportResult};
pub use types::{FetchedArtifact, ProcessResponse, SubmitReceipt};
