//! Clip reference and download record models.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::utils::clip_slug_from_url;

/// Base URL a clip slug resolves against.
pub const CLIP_BASE_URL: &str = "https://clips.twitch.tv/";

/// A single clip discovered on a profile's clips page.
///
/// Identifiers are unique within one collection run; `sequence_index` is
/// 1-based discovery order and determines both fetch order and final
/// compilation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ClipReference {
    /// Unique clip slug extracted from the source site
    pub identifier: String,

    /// Reconstructed canonical URL for the clip
    pub canonical_url: String,

    /// 1-based discovery order
    pub sequence_index: u32,
}

impl ClipReference {
    /// Create a reference from a slug, reconstructing the canonical URL.
    pub fn new(identifier: impl Into<String>, sequence_index: u32) -> Self {
        let identifier = identifier.into();
        let canonical_url = format!("{}{}", CLIP_BASE_URL, identifier);
        Self {
            identifier,
            canonical_url,
            sequence_index,
        }
    }

    /// Create a reference from a canonical clip URL.
    ///
    /// Returns `None` if the URL carries no slug (e.g. a bare host).
    pub fn from_url(url: &str, sequence_index: u32) -> Option<Self> {
        clip_slug_from_url(url).map(|slug| Self::new(slug, sequence_index))
    }

    /// Generate the local media filename for this clip.
    ///
    /// Format: `{sequence_index:02}_{identifier}.mp4`. The zero-padded prefix
    /// makes lexicographic order equal to sequence order.
    pub fn download_filename(&self) -> String {
        format!("{:02}_{}.mp4", self.sequence_index, self.identifier)
    }
}

/// Reason a clip entity was skipped during collection.
///
/// Per-item failures are data, not control flow: the locator records a skip
/// and moves on to the next entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClipSkip {
    /// The entity's open action failed (stale or detached node)
    OpenFailed,
    /// The detail overlay never appeared within the bounded wait
    OverlayTimeout,
    /// The overlay appeared but carried no embedded player reference
    EmbedMissing,
    /// The embed URL carried no `clip` query parameter
    SlugMissing,
}

impl ClipSkip {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipSkip::OpenFailed => "open_failed",
            ClipSkip::OverlayTimeout => "overlay_timeout",
            ClipSkip::EmbedMissing => "embed_missing",
            ClipSkip::SlugMissing => "slug_missing",
        }
    }
}

impl std::fmt::Display for ClipSkip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one fetch attempt. Created per attempt, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DownloadRecord {
    /// The clip this record belongs to
    pub clip: ClipReference,

    /// Where the media file was expected to land
    pub local_path: PathBuf,

    /// Whether the external tool exited zero and the file exists
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_canonical_url() {
        let clip = ClipReference::new("SuperEasyTrianglePJSalt-J0IgXQHTA0_ws9Lk", 1);
        assert_eq!(
            clip.canonical_url,
            "https://clips.twitch.tv/SuperEasyTrianglePJSalt-J0IgXQHTA0_ws9Lk"
        );
    }

    #[test]
    fn test_download_filename_zero_padded() {
        let clip = ClipReference::new("AbcDef", 3);
        assert_eq!(clip.download_filename(), "03_AbcDef.mp4");

        let clip = ClipReference::new("AbcDef", 12);
        assert_eq!(clip.download_filename(), "12_AbcDef.mp4");
    }

    #[test]
    fn test_from_url() {
        let clip = ClipReference::from_url("https://clips.twitch.tv/FunnyClip-abc123", 2).unwrap();
        assert_eq!(clip.identifier, "FunnyClip-abc123");
        assert_eq!(clip.sequence_index, 2);

        assert!(ClipReference::from_url("https://clips.twitch.tv/", 1).is_none());
    }
}
