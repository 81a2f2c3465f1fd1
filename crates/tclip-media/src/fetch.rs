//! Clip fetching through the configured external tool.
//!
//! The tool is invoked once per clip, strictly in sequence order, with a
//! fixed delay between invocations. The tool and the scraped site are both
//! stateful single-session resources, so fetches never run in parallel.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{info, warn};

use tclip_models::{ClipReference, DownloadRecord};

use crate::error::{MediaError, MediaResult};

/// Environment variable naming the external fetch tool.
pub const FETCH_TOOL_ENV: &str = "CLIP_FETCH_TOOL";

/// Environment variable overriding the inter-fetch delay (seconds).
pub const FETCH_DELAY_ENV: &str = "CLIP_FETCH_DELAY_SECS";

const DEFAULT_FETCH_DELAY: Duration = Duration::from_secs(2);

/// Validated fetcher configuration.
///
/// Constructed once at startup; a missing or unresolvable tool fails fast
/// instead of surfacing on the first fetch.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Resolved path to the external fetch tool
    pub tool_path: PathBuf,
    /// Delay enforced between consecutive fetches
    pub fetch_delay: Duration,
}

impl FetcherConfig {
    /// Create a config, resolving and validating the tool path.
    ///
    /// A bare name is looked up on PATH; anything else must exist as a file.
    pub fn new(tool: impl AsRef<Path>, fetch_delay: Duration) -> MediaResult<Self> {
        let tool = tool.as_ref();

        let tool_path = if tool.components().count() > 1 {
            if !tool.is_file() {
                return Err(MediaError::FetchToolNotFound(tool.to_path_buf()));
            }
            tool.to_path_buf()
        } else {
            which::which(tool).map_err(|_| MediaError::FetchToolNotFound(tool.to_path_buf()))?
        };

        Ok(Self {
            tool_path,
            fetch_delay,
        })
    }

    /// Create config from environment variables.
    pub fn from_env() -> MediaResult<Self> {
        let tool = std::env::var(FETCH_TOOL_ENV).map_err(|_| MediaError::FetchToolUnset(FETCH_TOOL_ENV))?;

        let fetch_delay = std::env::var(FETCH_DELAY_ENV)
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_FETCH_DELAY);

        Self::new(tool, fetch_delay)
    }
}

/// Downloads clips one at a time through the external tool.
#[derive(Debug, Clone)]
pub struct ClipFetcher {
    config: FetcherConfig,
}

impl ClipFetcher {
    /// Create a new fetcher.
    pub fn new(config: FetcherConfig) -> Self {
        Self { config }
    }

    /// Fetch a single clip into `dest_dir`.
    ///
    /// A failed fetch (spawn error, non-zero exit, or missing output file) is
    /// recorded as `success=false` and logged; it never propagates.
    pub async fn fetch(&self, clip: &ClipReference, dest_dir: &Path) -> DownloadRecord {
        let local_path = dest_dir.join(clip.download_filename());

        info!(
            clip = %clip.identifier,
            sequence = clip.sequence_index,
            output = %local_path.display(),
            "Fetching clip"
        );

        let output = Command::new(&self.config.tool_path)
            .arg(&clip.canonical_url)
            .arg("-o")
            .arg(&local_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let success = match output {
            Ok(output) if output.status.success() => {
                if local_path.is_file() {
                    true
                } else {
                    warn!(
                        clip = %clip.identifier,
                        "Fetch tool exited zero but produced no output file"
                    );
                    false
                }
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!(
                    clip = %clip.identifier,
                    exit_code = ?output.status.code(),
                    error = stderr.lines().last().unwrap_or("unknown error"),
                    "Fetch tool failed"
                );
                false
            }
            Err(e) => {
                warn!(clip = %clip.identifier, "Failed to spawn fetch tool: {}", e);
                false
            }
        };

        DownloadRecord {
            clip: clip.clone(),
            local_path,
            success,
        }
    }

    /// Fetch all clips into `dest_dir`, in ascending sequence order.
    pub async fn fetch_all(&self, clips: &[ClipReference], dest_dir: &Path) -> MediaResult<Vec<DownloadRecord>> {
        tokio::fs::create_dir_all(dest_dir).await?;

        let mut ordered: Vec<&ClipReference> = clips.iter().collect();
        ordered.sort_by_key(|c| c.sequence_index);

        let mut records = Vec::with_capacity(ordered.len());
        for (i, clip) in ordered.into_iter().enumerate() {
            if i > 0 {
                // Fixed pacing between fetches, the site rate-limits.
                tokio::time::sleep(self.config.fetch_delay).await;
            }
            records.push(self.fetch(clip, dest_dir).await);
        }

        let downloaded = records.iter().filter(|r| r.success).count();
        info!(
            total = records.len(),
            downloaded = downloaded,
            "Fetch stage finished"
        );

        Ok(records)
    }
}
