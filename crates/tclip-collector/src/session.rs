//! Contract against the controllable page-rendering session.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CollectorResult;

/// A controllable page-rendering session.
///
/// One session drives one pipeline run; the resource is exclusive and
/// non-reentrant. All waits are condition-based with a bounded timeout;
/// there are no fixed sleeps in this contract.
#[async_trait]
pub trait RenderSession: Send + Sync {
    /// Navigate to a URL and wait for the navigation to commit.
    async fn navigate(&self, url: &str) -> CollectorResult<()>;

    /// Wait until `selector` is present, or fail with `SelectorTimeout`.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> CollectorResult<()>;

    /// Click the first element matching `selector`.
    async fn click(&self, selector: &str) -> CollectorResult<()>;

    /// Click the first element whose rendered text equals `text`.
    async fn click_text(&self, text: &str) -> CollectorResult<()>;

    /// Number of elements currently matching `selector`, in DOM order.
    async fn count(&self, selector: &str) -> CollectorResult<usize>;

    /// Click the `index`-th element (0-based, DOM order) matching `selector`.
    async fn click_nth(&self, selector: &str, index: usize) -> CollectorResult<()>;

    /// Read an attribute off the first element matching `selector`.
    async fn read_attribute(&self, selector: &str, attr: &str) -> CollectorResult<Option<String>>;

    /// Generic dismiss action (keyboard Escape).
    async fn dismiss(&self) -> CollectorResult<()>;
}
