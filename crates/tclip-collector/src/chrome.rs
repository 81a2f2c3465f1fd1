//! Headless-Chrome implementation of [`RenderSession`] over CDP.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{CollectorError, CollectorResult};
use crate::session::RenderSession;

/// Interval between presence polls in [`RenderSession::wait_for`].
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One headless Chromium instance plus its event handler task.
///
/// The browser is an exclusive resource: launch one per pipeline run and
/// close it before the run's result is produced.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl ChromeSession {
    /// Launch a headless browser and open a blank page.
    pub async fn launch() -> CollectorResult<Self> {
        let config = BrowserConfig::builder()
            .window_size(1440, 900)
            .build()
            .map_err(CollectorError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| CollectorError::Launch(e.to_string()))?;

        // Drive the CDP event stream for the lifetime of the browser.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        info!("Launched headless browser session");

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    /// Close the browser and stop the handler task.
    pub async fn close(mut self) -> CollectorResult<()> {
        let _ = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        debug!("Browser session closed");
        Ok(())
    }
}

#[async_trait]
impl RenderSession for ChromeSession {
    async fn navigate(&self, url: &str) -> CollectorResult<()> {
        self.page.goto(url).await.map_err(|e| CollectorError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| CollectorError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> CollectorResult<()> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(CollectorError::SelectorTimeout {
                    selector: selector.to_string(),
                    waited_ms: timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn click(&self, selector: &str) -> CollectorResult<()> {
        self.page.find_element(selector).await?.click().await?;
        Ok(())
    }

    async fn click_text(&self, text: &str) -> CollectorResult<()> {
        // Text content has no CSS selector; fall back to XPath.
        let xpath = format!("//*[normalize-space(text())='{}']", text);
        self.page.find_xpath(xpath).await?.click().await?;
        Ok(())
    }

    async fn count(&self, selector: &str) -> CollectorResult<usize> {
        Ok(self.page.find_elements(selector).await.map(|els| els.len()).unwrap_or(0))
    }

    async fn click_nth(&self, selector: &str, index: usize) -> CollectorResult<()> {
        let element = self
            .page
            .find_elements(selector)
            .await?
            .into_iter()
            .nth(index)
            .ok_or_else(|| CollectorError::Session(format!("element {} of {:?} is gone", index, selector)))?;
        element.click().await?;
        Ok(())
    }

    async fn read_attribute(&self, selector: &str, attr: &str) -> CollectorResult<Option<String>> {
        let element = self.page.find_element(selector).await?;
        Ok(element.attribute(attr).await?)
    }

    async fn dismiss(&self) -> CollectorResult<()> {
        self.page.find_element("body").await?.press_key("Escape").await?;
        Ok(())
    }
}
