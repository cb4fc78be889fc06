use std::sync::Arc;
use std::time::Duration;

use feed_engine::{
    Catalog, CatalogListing, EngineEvent, EngineHandle, FixtureFetcher, PageQuery, PostSummary,
};

fn catalog() -> Catalog {
    Catalog {
        listings: vec![CatalogListing {
            category: String::new(),
            order: "hot".to_string(),
            posts: vec![PostSummary {
                author: "bob".to_string(),
                permlink: "post-1".to_string(),
                title: String::new(),
            }],
        }],
        feeds: Vec::new(),
    }
}

#[test]
fn engine_reports_completed_jobs() {
    let engine = EngineHandle::new(Arc::new(FixtureFetcher::new(catalog(), 10))).expect("engine");
    let query = PageQuery::head("", "hot");

    engine.enqueue(7, query.clone());

    let event = engine
        .recv_timeout(Duration::from_secs(5))
        .expect("completion event");
    let EngineEvent::FetchCompleted {
        job_id,
        query: echoed,
        result,
    } = event;
    assert_eq!(job_id, 7);
    assert_eq!(echoed, query);
    let page = result.expect("page");
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].identity(), "bob/post-1");
}

#[test]
fn engine_is_quiet_without_jobs() {
    let engine = EngineHandle::new(Arc::new(FixtureFetcher::new(Catalog::default(), 10)))
        .expect("engine");

    assert!(engine.try_recv().is_none());
}
