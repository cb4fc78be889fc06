use serde::{Deserialize, Serialize};

use crate::fetch::PageFetcher;
use crate::{FailureKind, FetchError, Page, PageQuery, PostSummary};

const BY_FEED: &str = "by_feed";

/// Listings served without a network, e.g. for offline browsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub listings: Vec<CatalogListing>,
    #[serde(default)]
    pub feeds: Vec<CatalogFeed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogListing {
    #[serde(default)]
    pub category: String,
    pub order: String,
    pub posts: Vec<PostSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFeed {
    pub account: String,
    pub posts: Vec<PostSummary>,
}

pub struct FixtureFetcher {
    catalog: Catalog,
    page_size: usize,
}

impl FixtureFetcher {
    pub fn new(catalog: Catalog, page_size: usize) -> Self {
        Self {
            catalog,
            page_size: page_size.max(1),
        }
    }

    fn posts_for(&self, query: &PageQuery) -> Result<&[PostSummary], FetchError> {
        if query.order == BY_FEED {
            let account = query.account.as_deref().ok_or_else(|| {
                FetchError::new(FailureKind::InvalidQuery, "feed query without an account")
            })?;
            return Ok(self
                .catalog
                .feeds
                .iter()
                .find(|feed| feed.account == account)
                .map(|feed| feed.posts.as_slice())
                .unwrap_or_default());
        }
        Ok(self
            .catalog
            .listings
            .iter()
            .find(|listing| listing.category == query.category && listing.order == query.order)
            .map(|listing| listing.posts.as_slice())
            .unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl PageFetcher for FixtureFetcher {
    /// Serves the posts after the start post; unknown listings are empty.
    async fn fetch_page(&self, query: &PageQuery) -> Result<Page, FetchError> {
        let posts = self.posts_for(query)?;
        let start = if query.is_head() {
            0
        } else {
            posts
                .iter()
                .position(|post| {
                    post.author == query.start_author && post.permlink == query.start_permlink
                })
                .map(|index| index + 1)
                .ok_or_else(|| {
                    FetchError::new(
                        FailureKind::NotFound,
                        format!(
                            "start post {}/{} not in listing",
                            query.start_author, query.start_permlink
                        ),
                    )
                })?
        };
        let items = posts.iter().skip(start).take(self.page_size).cloned().collect();
        Ok(Page { items })
    }
}
