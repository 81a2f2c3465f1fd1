//! Shared data models for the tclip backend.
//!
//! This crate provides Serde-serializable types for:
//! - Clip references and per-item skip reasons
//! - Collection and download records
//! - Run reports returned by the HTTP trigger surface
//! - URL parsing utilities shared across stages

pub mod clip;
pub mod collection;
pub mod report;
pub mod utils;

// Re-export common types
pub use clip::{ClipReference, ClipSkip, DownloadRecord, CLIP_BASE_URL};
pub use collection::CollectionResult;
pub use report::{RunReport, RunStatus};
pub use utils::{clip_slug_from_url, extract_clip_slug, extract_clip_urls, SlugError, SlugResult};
