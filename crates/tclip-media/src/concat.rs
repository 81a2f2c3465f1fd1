//! Lossless compilation of fetched clips.
//!
//! Builds a concat-demuxer manifest from the numbered clip files in a
//! directory and runs a single stream-copy FFmpeg pass over it. The manifest
//! is a scoped resource: it is deleted on every exit path, success or not.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Suffix of compilation output files.
pub const COMPILATION_SUFFIX: &str = "_compilation.mp4";

/// Name of the temporary concat manifest.
pub const MANIFEST_FILENAME: &str = "concat_manifest.txt";

/// Deletes the manifest when dropped, regardless of how the build exited.
struct ManifestGuard {
    path: PathBuf,
}

impl Drop for ManifestGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove concat manifest {}: {}", self.path.display(), e);
            }
        }
    }
}

/// List the fetched clip files in `dir`, in compilation order.
///
/// Matches `*.mp4`, excluding any prior compilation output and the manifest
/// itself. Lexicographic filename order equals sequence order because of the
/// zero-padded index prefix.
pub fn collect_clip_files(dir: &Path) -> MediaResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.ends_with(".mp4") && !name.ends_with(COMPILATION_SUFFIX) {
            files.push(path);
        }
    }

    files.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    Ok(files)
}

/// Quote a path for a concat-demuxer manifest line.
fn manifest_line(path: &Path) -> String {
    // The concat demuxer reads single-quoted strings; embedded quotes are
    // closed, escaped, and reopened.
    let escaped = path.to_string_lossy().replace('\'', r"'\''");
    format!("file '{}'", escaped)
}

/// Concatenates fetched clips into a single compilation file.
#[derive(Debug)]
pub struct CompilationBuilder {
    runner: FfmpegRunner,
}

impl Default for CompilationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilationBuilder {
    /// Create a builder with a generous default timeout.
    pub fn new() -> Self {
        Self {
            runner: FfmpegRunner::new().with_timeout(600),
        }
    }

    /// Override the FFmpeg timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.runner = FfmpegRunner::new().with_timeout(secs);
        self
    }

    /// Concatenate the clips in `dest_dir` into `{output_name}_compilation.mp4`.
    ///
    /// Never re-encodes; an FFmpeg failure is surfaced verbatim. Any existing
    /// compilation is excluded from the input list and overwritten.
    pub async fn build(&self, dest_dir: &Path, output_name: &str) -> MediaResult<PathBuf> {
        let files = collect_clip_files(dest_dir)?;
        if files.is_empty() {
            return Err(MediaError::EmptyCompilation(dest_dir.to_path_buf()));
        }

        let output_path = dest_dir.join(format!("{}{}", output_name, COMPILATION_SUFFIX));
        let manifest_path = dest_dir.join(MANIFEST_FILENAME);

        let mut manifest = String::new();
        for file in &files {
            let absolute = std::path::absolute(file)?;
            manifest.push_str(&manifest_line(&absolute));
            manifest.push('\n');
        }

        tokio::fs::write(&manifest_path, manifest).await?;
        let _guard = ManifestGuard {
            path: manifest_path.clone(),
        };

        debug!(
            clips = files.len(),
            manifest = %manifest_path.display(),
            "Wrote concat manifest"
        );

        let cmd = FfmpegCommand::new(&manifest_path, &output_path)
            .concat_input()
            .stream_copy();

        self.runner.run(&cmd).await?;

        info!(
            clips = files.len(),
            output = %output_path.display(),
            "Compilation written"
        );

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_empty_directory_fails_before_ffmpeg() {
        let dir = TempDir::new().unwrap();
        let builder = CompilationBuilder::new();

        let err = builder.build(dir.path(), "alice").await.unwrap_err();
        assert!(matches!(err, MediaError::EmptyCompilation(_)));
        assert!(!dir.path().join(MANIFEST_FILENAME).exists());
    }

    #[test]
    fn test_collect_orders_and_excludes_compilation() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("02_second.mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("01_first.mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("10_tenth.mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("alice_compilation.mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let files = collect_clip_files(dir.path()).unwrap();
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["01_first.mp4", "02_second.mp4", "10_tenth.mp4"]);
    }

    #[test]
    fn test_manifest_line_escapes_quotes() {
        let line = manifest_line(Path::new("/tmp/it's here/01_a.mp4"));
        assert_eq!(line, r"file '/tmp/it'\''s here/01_a.mp4'");
    }

    #[tokio::test]
    async fn test_manifest_deleted_even_when_ffmpeg_fails() {
        let dir = TempDir::new().unwrap();
        // Not real media: FFmpeg (if present) rejects these, and the build
        // errors either way. The manifest must be gone afterwards.
        std::fs::write(dir.path().join("01_a.mp4"), b"not a video").unwrap();
        std::fs::write(dir.path().join("02_b.mp4"), b"not a video").unwrap();

        let builder = CompilationBuilder::new().with_timeout(60);
        let result = builder.build(dir.path(), "alice").await;

        assert!(result.is_err());
        assert!(!dir.path().join(MANIFEST_FILENAME).exists());
    }
}
