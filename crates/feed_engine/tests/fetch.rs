use std::sync::Arc;
use std::time::Duration;

use feed_engine::{
    Catalog, CatalogFeed, CatalogListing, FailureKind, FetchError, FixtureFetcher, Page,
    PageFetcher, PageQuery, PostSummary, TimedFetcher,
};
use pretty_assertions::assert_eq;

fn post(author: &str, n: u32) -> PostSummary {
    PostSummary {
        author: author.to_string(),
        permlink: format!("post-{n}"),
        title: format!("Post {n}"),
    }
}

fn catalog() -> Catalog {
    Catalog {
        listings: vec![CatalogListing {
            category: "funny".to_string(),
            order: "trending".to_string(),
            posts: (1..=5).map(|n| post("bob", n)).collect(),
        }],
        feeds: vec![CatalogFeed {
            account: "alice".to_string(),
            posts: vec![post("carol", 1), post("dan", 2)],
        }],
    }
}

fn after(category: &str, order: &str, author: &str, permlink: &str) -> PageQuery {
    PageQuery {
        start_author: author.to_string(),
        start_permlink: permlink.to_string(),
        ..PageQuery::head(category, order)
    }
}

struct SlowFetcher {
    delay: Duration,
}

#[async_trait::async_trait]
impl PageFetcher for SlowFetcher {
    async fn fetch_page(&self, _query: &PageQuery) -> Result<Page, FetchError> {
        tokio::time::sleep(self.delay).await;
        Ok(Page::default())
    }
}

#[tokio::test]
async fn fixture_serves_head_then_pages_after_anchor() {
    let fetcher = FixtureFetcher::new(catalog(), 2);

    let head = fetcher
        .fetch_page(&PageQuery::head("funny", "trending"))
        .await
        .expect("head page");
    assert_eq!(head.items, vec![post("bob", 1), post("bob", 2)]);

    let next = fetcher
        .fetch_page(&after("funny", "trending", "bob", "post-2"))
        .await
        .expect("next page");
    assert_eq!(next.items, vec![post("bob", 3), post("bob", 4)]);

    let tail = fetcher
        .fetch_page(&after("funny", "trending", "bob", "post-5"))
        .await
        .expect("tail page");
    assert!(tail.items.is_empty());
}

#[tokio::test]
async fn fixture_unknown_listing_is_empty() {
    let fetcher = FixtureFetcher::new(catalog(), 10);

    let page = fetcher
        .fetch_page(&PageQuery::head("nothing-here", "hot"))
        .await
        .expect("empty page");

    assert_eq!(page, Page::default());
}

#[tokio::test]
async fn fixture_rejects_unknown_anchor() {
    let fetcher = FixtureFetcher::new(catalog(), 10);

    let err = fetcher
        .fetch_page(&after("funny", "trending", "eve", "post-1"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::NotFound);
}

#[tokio::test]
async fn fixture_serves_account_feeds() {
    let fetcher = FixtureFetcher::new(catalog(), 10);
    let query = PageQuery {
        account: Some("alice".to_string()),
        ..PageQuery::head("", "by_feed")
    };

    let page = fetcher.fetch_page(&query).await.expect("feed page");
    assert_eq!(page.last(), Some(&post("dan", 2)));

    let err = fetcher
        .fetch_page(&PageQuery::head("", "by_feed"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidQuery);
}

#[tokio::test]
async fn timed_fetcher_reports_timeout() {
    let slow: Arc<dyn PageFetcher> = Arc::new(SlowFetcher {
        delay: Duration::from_millis(250),
    });
    let fetcher = TimedFetcher::new(slow, Duration::from_millis(50));

    let err = fetcher
        .fetch_page(&PageQuery::head("funny", "trending"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn timed_fetcher_passes_fast_results_through() {
    let fixture: Arc<dyn PageFetcher> = Arc::new(FixtureFetcher::new(catalog(), 1));
    let fetcher = TimedFetcher::new(fixture, Duration::from_secs(5));

    let page = fetcher
        .fetch_page(&PageQuery::head("funny", "trending"))
        .await
        .expect("page");

    assert_eq!(page.items, vec![post("bob", 1)]);
}
