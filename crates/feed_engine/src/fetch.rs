use std::sync::Arc;
use std::time::Duration;

use feed_logging::feed_debug;

use crate::{FailureKind, FetchError, Page, PageQuery};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub request_timeout: Duration,
    pub page_size: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            page_size: 20,
        }
    }
}

#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, query: &PageQuery) -> Result<Page, FetchError>;
}

/// Bounds every fetch of the wrapped transport by `request_timeout`.
pub struct TimedFetcher {
    inner: Arc<dyn PageFetcher>,
    timeout: Duration,
}

impl TimedFetcher {
    pub fn new(inner: Arc<dyn PageFetcher>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait::async_trait]
impl PageFetcher for TimedFetcher {
    async fn fetch_page(&self, query: &PageQuery) -> Result<Page, FetchError> {
        match tokio::time::timeout(self.timeout, self.inner.fetch_page(query)).await {
            Ok(result) => result,
            Err(_) => {
                feed_debug!(
                    "page {}/{} timed out after {:?}",
                    query.order,
                    query.category,
                    self.timeout
                );
                Err(FetchError::new(
                    FailureKind::Timeout,
                    format!("no page within {:?}", self.timeout),
                ))
            }
        }
    }
}
