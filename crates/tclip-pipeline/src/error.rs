//! Pipeline error types.

use thiserror::Error;

use tclip_collector::CollectorError;
use tclip_media::MediaError;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that abort a pipeline run.
///
/// Compilation failure is deliberately absent: it downgrades the run to a
/// partial success instead of aborting it.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Nothing to fetch: the profile yielded no usable clip identifiers
    #[error("no clips collected for profile {profile}")]
    NoClipsCollected { profile: String },

    /// Nothing to compile: every fetch attempt failed
    #[error("no clips downloaded for profile {profile}")]
    NoClipsDownloaded { profile: String },

    #[error(transparent)]
    Collector(#[from] CollectorError),

    #[error(transparent)]
    Media(#[from] MediaError),
}
