//! Run report returned by the trigger surface.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Overall outcome of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// All stages completed, compilation written
    Success,
    /// Clips were collected and downloaded but the compilation failed;
    /// the per-clip artifacts remain usable
    Partial,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Partial => "partial",
        }
    }
}

/// Structured summary of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunReport {
    /// Profile the run was for
    pub profile: String,

    /// Clips requested by the caller
    pub requested_count: usize,

    /// Clip entities found on the page
    pub found_count: usize,

    /// Clips that yielded a usable identifier
    pub collected_count: usize,

    /// Fetches that produced a media file
    pub downloaded_count: usize,

    /// Overall outcome
    pub status: RunStatus,

    /// Directory holding the per-clip files and the compilation
    pub output_dir: PathBuf,

    /// Compilation output, present on `Success`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compilation_path: Option<PathBuf>,

    /// Human-readable summary line
    pub message: String,

    /// When the run finished
    pub finished_at: DateTime<Utc>,
}
