//! Persisted ledger of collected clip URLs.
//!
//! One CSV-style file per profile, header `Clip URL`, one canonical URL per
//! row in sequence order. The ledger is the authoritative handoff artifact
//! between the collection and fetch stages.

use std::path::{Path, PathBuf};

use tracing::info;

use tclip_models::CollectionResult;

use crate::error::CollectorResult;

/// Header row of the ledger file.
pub const LEDGER_HEADER: &str = "Clip URL";

/// Ledger file path for a profile.
pub fn ledger_path(dir: &Path, profile: &str) -> PathBuf {
    dir.join(format!("{}_clips.csv", profile))
}

/// Write the collected URLs for a profile, replacing any previous ledger.
pub async fn write_ledger(dir: &Path, result: &CollectionResult) -> CollectorResult<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let mut contents = String::from(LEDGER_HEADER);
    contents.push('\n');
    for clip in &result.clips {
        contents.push_str(&clip.canonical_url);
        contents.push('\n');
    }

    let path = ledger_path(dir, &result.profile);
    tokio::fs::write(&path, contents).await?;

    info!(
        profile = %result.profile,
        clips = result.collected_count(),
        path = %path.display(),
        "Wrote clip ledger"
    );

    Ok(path)
}

/// Read a ledger back as raw text for the fetch stage.
pub async fn read_ledger(path: &Path) -> CollectorResult<String> {
    Ok(tokio::fs::read_to_string(path).await?)
}
