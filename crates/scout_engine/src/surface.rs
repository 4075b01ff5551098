//! Browser surfaces: whatever hosts a navigable page for the scripts.
//!
//! The built-in [`HttpSurface`] has no script engine of its own. It loads the
//! page over HTTP and re-reads it on every [`BrowserSurface::refresh`], which
//! is what the polling scripts use as their DOM-change signal.

use std::sync::Arc;

use scout_logging::scout_debug;
use tokio::sync::Mutex;

use crate::decode::decode_html;
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::{LoadError, PageSnapshot};

#[async_trait::async_trait]
pub trait BrowserSurface: Send + Sync {
    /// Navigate to `url` and return the document once loading finished.
    async fn load(&self, url: &str) -> Result<PageSnapshot, LoadError>;

    /// Re-read the current document of an already loaded page.
    async fn refresh(&self, page: &PageSnapshot) -> Result<PageSnapshot, LoadError> {
        self.load(&page.url).await
    }
}

pub struct HttpSurface {
    fetcher: Arc<dyn Fetcher>,
}

impl HttpSurface {
    pub fn new(settings: FetchSettings) -> Result<Self, LoadError> {
        Ok(Self::with_fetcher(Arc::new(ReqwestFetcher::new(settings)?)))
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait::async_trait]
impl BrowserSurface for HttpSurface {
    async fn load(&self, url: &str) -> Result<PageSnapshot, LoadError> {
        let output = self.fetcher.fetch(url).await?;
        let decoded = decode_html(&output.bytes, output.metadata.content_type.as_deref());
        Ok(PageSnapshot {
            url: output.metadata.final_url,
            html: decoded.html,
        })
    }
}

/// A loaded page shared by the scripts polling it.
///
/// Each poller asks for the document as of its own attempt number; the page
/// is re-read at most once per attempt no matter how many pollers ask.
pub(crate) struct LivePage {
    surface: Arc<dyn BrowserSurface>,
    inner: Mutex<(u32, PageSnapshot)>,
}

impl LivePage {
    pub(crate) fn new(surface: Arc<dyn BrowserSurface>, snapshot: PageSnapshot) -> Self {
        Self {
            surface,
            inner: Mutex::new((1, snapshot)),
        }
    }

    pub(crate) async fn at_attempt(&self, attempt: u32) -> Option<PageSnapshot> {
        let mut guard = self.inner.lock().await;
        if attempt > guard.0 {
            match self.surface.refresh(&guard.1).await {
                Ok(fresh) => *guard = (attempt, fresh),
                Err(err) => {
                    scout_debug!("Refresh of {} failed: {}", guard.1.url, err);
                    return None;
                }
            }
        }
        Some(guard.1.clone())
    }
}
