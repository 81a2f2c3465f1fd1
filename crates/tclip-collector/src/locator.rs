//! Page protocol for locating clips on a profile's listing page.

use std::time::Duration;

use tracing::{debug, info, warn};

use tclip_models::{extract_clip_slug, ClipSkip, CollectionResult};

use crate::error::{CollectorError, CollectorResult};
use crate::session::RenderSession;

/// Period control on the clips listing page.
const PERIOD_BUTTON: &str = "div#clips-period button.btn-success";

/// Label of the period option covering the whole channel history.
const ALL_TIME_LABEL: &str = "All time";

/// One clip entity in the rendered list.
const CLIP_ENTITY: &str = "div.clip-entity";

/// Player iframe inside the detail overlay.
const OVERLAY_IFRAME: &str = "div.lity-iframe iframe";

/// Dedicated close control of the detail overlay.
const OVERLAY_CLOSE: &str = r#"button[aria-label="Close"]"#;

/// Clips listing URL for a profile.
pub fn profile_clips_url(profile: &str) -> String {
    format!("https://www.twitchtracker.com/{}/clips", profile)
}

/// Drives a [`RenderSession`] through the clips listing protocol.
pub struct ClipLocator<S> {
    session: S,
    /// Bound on the initial page render
    page_timeout: Duration,
    /// Bound on the list re-render after period selection
    rerender_timeout: Duration,
    /// Bound on the per-entity overlay appearing
    overlay_timeout: Duration,
}

impl<S: RenderSession> ClipLocator<S> {
    /// Create a locator with the default wait bounds.
    pub fn new(session: S) -> Self {
        Self {
            session,
            page_timeout: Duration::from_secs(15),
            rerender_timeout: Duration::from_secs(5),
            overlay_timeout: Duration::from_secs(5),
        }
    }

    /// Override all wait bounds (tests use millisecond bounds).
    pub fn with_timeouts(mut self, page: Duration, rerender: Duration, overlay: Duration) -> Self {
        self.page_timeout = page;
        self.rerender_timeout = rerender;
        self.overlay_timeout = overlay;
        self
    }

    /// Give the session back once collection is done.
    pub fn into_session(self) -> S {
        self.session
    }

    /// Collect up to `num_clips` clip references for `profile`, in page order.
    ///
    /// Page-load and period-selection failures are stage-fatal; everything
    /// per-entity degrades to a recorded skip.
    pub async fn locate(&self, profile: &str, num_clips: usize) -> CollectorResult<CollectionResult> {
        let url = profile_clips_url(profile);
        info!(profile = profile, url = %url, "Opening clips listing");

        self.session.navigate(&url).await?;
        self.session.wait_for(PERIOD_BUTTON, self.page_timeout).await?;

        self.select_all_time().await?;

        let found = self.session.count(CLIP_ENTITY).await?;
        let mut result = CollectionResult::new(profile, num_clips);
        result.found_count = found;

        let target = num_clips.min(found);
        if found < num_clips {
            // Documented behavior: fewer clips than requested is not an error.
            info!(found = found, requested = num_clips, "Fewer clips available than requested");
        }
        info!(found = found, target = target, "Enumerated clip entities");

        for index in 0..target {
            match self.collect_entity(index).await {
                Ok(slug) => {
                    let clip = result.push_clip(slug);
                    info!(
                        sequence = clip.sequence_index,
                        url = %clip.canonical_url,
                        "Collected clip"
                    );
                }
                Err(skip) => {
                    warn!(index = index, reason = %skip, "Skipping clip entity");
                    result.push_skip(skip);
                }
            }

            self.close_overlay().await;
        }

        Ok(result)
    }

    /// Open the period control and pick the all-time option.
    async fn select_all_time(&self) -> CollectorResult<()> {
        let selection = async {
            self.session.click(PERIOD_BUTTON).await?;
            self.session.click_text(ALL_TIME_LABEL).await?;
            Ok::<(), CollectorError>(())
        };
        selection
            .await
            .map_err(|e| CollectorError::PeriodSelection(e.to_string()))?;

        // Bounded chance for the list to re-render; an empty list is data,
        // not an error.
        match self.session.wait_for(CLIP_ENTITY, self.rerender_timeout).await {
            Ok(()) => Ok(()),
            Err(CollectorError::SelectorTimeout { .. }) => {
                debug!("No clip entities after period re-render");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Open one entity's overlay and extract its clip slug.
    async fn collect_entity(&self, index: usize) -> Result<String, ClipSkip> {
        if let Err(e) = self.session.click_nth(CLIP_ENTITY, index).await {
            debug!(index = index, "Open action failed: {}", e);
            return Err(ClipSkip::OpenFailed);
        }

        if self
            .session
            .wait_for(OVERLAY_IFRAME, self.overlay_timeout)
            .await
            .is_err()
        {
            return Err(ClipSkip::OverlayTimeout);
        }

        let src = match self.session.read_attribute(OVERLAY_IFRAME, "src").await {
            Ok(Some(src)) => src,
            _ => return Err(ClipSkip::EmbedMissing),
        };

        extract_clip_slug(&src).map_err(|_| ClipSkip::SlugMissing)
    }

    /// Close the overlay: dedicated control first, keyboard dismiss as
    /// fallback. A failure to close never aborts the run.
    async fn close_overlay(&self) {
        if self.session.click(OVERLAY_CLOSE).await.is_ok() {
            return;
        }
        if let Err(e) = self.session.dismiss().await {
            debug!("Overlay dismiss failed: {}", e);
        }
    }
}
