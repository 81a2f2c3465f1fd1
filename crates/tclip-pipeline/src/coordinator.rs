//! Sequences the three stages of a collection run.
//!
//! Stages run strictly in order; each consumes the previous stage's complete
//! output. The fetch list is rebuilt from the persisted ledger rather than
//! the in-memory collection result, keeping the ledger authoritative.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use tclip_collector::{ledger, ClipLocator, RenderSession};
use tclip_media::{ClipFetcher, CompilationBuilder};
use tclip_models::{extract_clip_urls, ClipReference, RunReport, RunStatus};

use crate::error::{PipelineError, PipelineResult};

/// Coordinates locate → fetch → compile for one profile at a time.
pub struct Pipeline {
    fetcher: ClipFetcher,
    builder: CompilationBuilder,
    output_root: PathBuf,
}

impl Pipeline {
    /// Create a pipeline writing under `output_root`.
    pub fn new(fetcher: ClipFetcher, builder: CompilationBuilder, output_root: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            builder,
            output_root: output_root.into(),
        }
    }

    /// Per-profile output directory. Isolated per profile so runs for
    /// different profiles never share files.
    pub fn output_dir(&self, profile: &str) -> PathBuf {
        self.output_root.join(profile)
    }

    /// Run the full pipeline for a profile.
    pub async fn run<S: RenderSession>(
        &self,
        locator: &ClipLocator<S>,
        profile: &str,
        num_clips: usize,
    ) -> PipelineResult<RunReport> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("pipeline_run", run_id = %run_id, profile = profile);

        self.run_inner(locator, profile, num_clips).instrument(span).await
    }

    async fn run_inner<S: RenderSession>(
        &self,
        locator: &ClipLocator<S>,
        profile: &str,
        num_clips: usize,
    ) -> PipelineResult<RunReport> {
        let dest_dir = self.output_dir(profile);

        // Stage 1: locate.
        let collection = locator.locate(profile, num_clips).await?;
        let ledger_path = ledger::write_ledger(&dest_dir, &collection).await?;

        if collection.collected_count() == 0 {
            return Err(PipelineError::NoClipsCollected {
                profile: profile.to_string(),
            });
        }

        // Stage 2: fetch, driven by the persisted ledger.
        let clips = self.fetch_list_from_ledger(&ledger_path).await?;
        let records = self.fetcher.fetch_all(&clips, &dest_dir).await?;
        let downloaded_count = records.iter().filter(|r| r.success).count();

        if downloaded_count == 0 {
            return Err(PipelineError::NoClipsDownloaded {
                profile: profile.to_string(),
            });
        }

        // Stage 3: compile. Failure downgrades to partial, the downloaded
        // clips remain usable.
        let (status, compilation_path, message) = match self.builder.build(&dest_dir, profile).await {
            Ok(path) => {
                let message = format!(
                    "Compiled {} clips for {} into {}",
                    downloaded_count,
                    profile,
                    path.display()
                );
                (RunStatus::Success, Some(path), message)
            }
            Err(e) => {
                warn!("Compilation failed, keeping downloaded clips: {}", e);
                let message = format!(
                    "Downloaded {} clips for {} but compilation failed: {}",
                    downloaded_count, profile, e
                );
                (RunStatus::Partial, None, message)
            }
        };

        info!(
            found = collection.found_count,
            collected = collection.collected_count(),
            downloaded = downloaded_count,
            status = status.as_str(),
            "Pipeline run finished"
        );

        Ok(RunReport {
            profile: profile.to_string(),
            requested_count: num_clips,
            found_count: collection.found_count,
            collected_count: collection.collected_count(),
            downloaded_count,
            status,
            output_dir: dest_dir,
            compilation_path,
            message,
            finished_at: Utc::now(),
        })
    }

    /// Re-read the ledger and rebuild the ordered fetch list from it.
    async fn fetch_list_from_ledger(&self, ledger_path: &Path) -> PipelineResult<Vec<ClipReference>> {
        let contents = ledger::read_ledger(ledger_path).await?;

        let clips: Vec<ClipReference> = extract_clip_urls(&contents)
            .iter()
            .enumerate()
            .filter_map(|(i, url)| ClipReference::from_url(url, i as u32 + 1))
            .collect();

        Ok(clips)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    use tclip_collector::CollectorResult;
    use tclip_media::FetcherConfig;

    /// Fake page: every entity opens cleanly and yields the scripted slug.
    struct FakeSession {
        slugs: Vec<&'static str>,
        open: Mutex<Option<usize>>,
    }

    impl FakeSession {
        fn new(slugs: Vec<&'static str>) -> Self {
            Self {
                slugs,
                open: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl RenderSession for FakeSession {
        async fn navigate(&self, _url: &str) -> CollectorResult<()> {
            Ok(())
        }

        async fn wait_for(&self, selector: &str, timeout: Duration) -> CollectorResult<()> {
            if selector.contains("clip-entity") && self.slugs.is_empty() {
                return Err(tclip_collector::CollectorError::SelectorTimeout {
                    selector: selector.to_string(),
                    waited_ms: timeout.as_millis() as u64,
                });
            }
            Ok(())
        }

        async fn click(&self, _selector: &str) -> CollectorResult<()> {
            Ok(())
        }

        async fn click_text(&self, _text: &str) -> CollectorResult<()> {
            Ok(())
        }

        async fn count(&self, _selector: &str) -> CollectorResult<usize> {
            Ok(self.slugs.len())
        }

        async fn click_nth(&self, _selector: &str, index: usize) -> CollectorResult<()> {
            *self.open.lock().unwrap() = Some(index);
            Ok(())
        }

        async fn read_attribute(&self, _selector: &str, _attr: &str) -> CollectorResult<Option<String>> {
            let open = self.open.lock().unwrap();
            Ok(open.and_then(|i| self.slugs.get(i)).map(|slug| {
                format!("//clips.twitch.tv/embed?parent=twitchtracker.com&clip={}", slug)
            }))
        }

        async fn dismiss(&self) -> CollectorResult<()> {
            Ok(())
        }
    }

    fn write_stub_tool(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fetch-tool");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn pipeline(tool: PathBuf, output_root: &Path) -> Pipeline {
        let config = FetcherConfig::new(tool, Duration::from_millis(0)).unwrap();
        Pipeline::new(
            ClipFetcher::new(config),
            CompilationBuilder::new().with_timeout(60),
            output_root,
        )
    }

    fn locator(slugs: Vec<&'static str>) -> ClipLocator<FakeSession> {
        ClipLocator::new(FakeSession::new(slugs)).with_timeouts(
            Duration::from_millis(10),
            Duration::from_millis(10),
            Duration::from_millis(10),
        )
    }

    #[tokio::test]
    async fn test_zero_entities_aborts_before_any_fetch() {
        let dir = TempDir::new().unwrap();
        let tool = write_stub_tool(dir.path(), "touch \"$3\"");
        let pipeline = pipeline(tool, dir.path());

        let err = pipeline.run(&locator(vec![]), "ghost", 5).await.unwrap_err();
        assert!(matches!(err, PipelineError::NoClipsCollected { .. }));

        // Header-only ledger, no media files.
        let dest = dir.path().join("ghost");
        let ledger = std::fs::read_to_string(dest.join("ghost_clips.csv")).unwrap();
        assert_eq!(ledger.lines().count(), 1);
        let mp4s = std::fs::read_dir(&dest)
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .path()
                    .extension()
                    .is_some_and(|ext| ext == "mp4")
            })
            .count();
        assert_eq!(mp4s, 0);
    }

    #[tokio::test]
    async fn test_all_fetches_failing_is_fatal() {
        let dir = TempDir::new().unwrap();
        let tool = write_stub_tool(dir.path(), "exit 1");
        let pipeline = pipeline(tool, dir.path());

        let err = pipeline
            .run(&locator(vec!["Alpha-1", "Bravo-2"]), "alice", 2)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoClipsDownloaded { .. }));
    }

    #[tokio::test]
    async fn test_partial_fetch_failures_still_reach_compilation() {
        let dir = TempDir::new().unwrap();
        // Only the second clip downloads.
        let tool = write_stub_tool(
            dir.path(),
            "case \"$1\" in *Bravo*) touch \"$3\" ;; *) exit 1 ;; esac",
        );
        let pipeline = pipeline(tool, dir.path());

        let report = pipeline
            .run(&locator(vec!["Alpha-1", "Bravo-2", "Charlie-3"]), "alice", 3)
            .await
            .unwrap();

        assert_eq!(report.found_count, 3);
        assert_eq!(report.collected_count, 3);
        assert_eq!(report.downloaded_count, 1);
        // The stub writes empty files, so FFmpeg cannot concatenate them and
        // the run degrades to partial rather than failing.
        assert_eq!(report.status, RunStatus::Partial);
        assert!(report.compilation_path.is_none());
    }

    #[tokio::test]
    async fn test_full_run_counts_and_artifacts() {
        let dir = TempDir::new().unwrap();
        let tool = write_stub_tool(dir.path(), "touch \"$3\"");
        let pipeline = pipeline(tool, dir.path());

        let report = pipeline
            .run(&locator(vec!["Alpha-1", "Bravo-2", "Charlie-3"]), "alice", 3)
            .await
            .unwrap();

        assert_eq!(report.collected_count, 3);
        assert_eq!(report.downloaded_count, 3);

        let dest = dir.path().join("alice");
        assert!(dest.join("01_Alpha-1.mp4").is_file());
        assert!(dest.join("02_Bravo-2.mp4").is_file());
        assert!(dest.join("03_Charlie-3.mp4").is_file());

        let ledger = std::fs::read_to_string(dest.join("alice_clips.csv")).unwrap();
        assert_eq!(ledger.lines().count(), 4);

        // No manifest residue either way.
        assert!(!dest.join(tclip_media::MANIFEST_FILENAME).exists());
    }
}
