use std::collections::HashMap;
use std::sync::Arc;

use feed_core::{
    Effect, FeedKey, FetchOutcome, FetchRequest, ListingSource, PostRef, RequestId,
    RequestParams, ResolvedFeed,
};
use feed_engine::{
    EngineError, EngineEvent, EngineHandle, FetchError, JobId, Page, PageFetcher, PageQuery,
};
use feed_logging::{feed_debug, feed_info, feed_warn};

/// Why a job was started.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingJob {
    /// First page of a listing, loaded by the host on navigation.
    Head { source: ListingSource },
    /// Page requested by the coordinator.
    More {
        request_id: RequestId,
        key: FeedKey,
        source: ListingSource,
    },
}

/// A finished job, mapped back to what asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Completion {
    Head {
        source: ListingSource,
        result: Result<Page, FetchError>,
    },
    More {
        request_id: RequestId,
        key: FeedKey,
        source: ListingSource,
        result: Result<Page, FetchError>,
    },
}

impl Completion {
    pub fn source(&self) -> &ListingSource {
        match self {
            Self::Head { source, .. } | Self::More { source, .. } => source,
        }
    }
}

/// Turns a page result into what the coordinator needs to settle.
pub(crate) fn outcome_of(result: &Result<Page, FetchError>) -> FetchOutcome {
    match result {
        Ok(page) => {
            let last_item = page
                .last()
                .map(|post| PostRef::new(post.author.clone(), post.permlink.clone()));
            FetchOutcome::success(last_item)
        }
        Err(err) => FetchOutcome::failure(err.to_string()),
    }
}

/// Runs effects on the fetch engine and tracks jobs until they finish.
pub(crate) struct EffectRunner {
    engine: EngineHandle,
    next_job: JobId,
    pending: HashMap<JobId, PendingJob>,
}

impl EffectRunner {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Result<Self, EngineError> {
        Ok(Self {
            engine: EngineHandle::new(fetcher)?,
            next_job: 0,
            pending: HashMap::new(),
        })
    }

    /// Starts loading the first page of `feed`. Returns false when the feed
    /// has no listing to load.
    pub fn load_head(&mut self, feed: &ResolvedFeed, params: &RequestParams) -> bool {
        let source = feed.listing_source();
        if source == ListingSource::Unknown {
            feed_warn!("no listing to load for {}", feed.key);
            return false;
        }
        let mut query = PageQuery::head(feed.key.category(), feed.key.order().as_str());
        query.account = feed.account.clone();
        query.params = params.clone();
        let job_id = self.start(query, PendingJob::Head { source });
        feed_info!("LoadHead job_id={} key={}", job_id, feed.key);
        true
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>, feed: Option<&ResolvedFeed>) {
        for effect in effects {
            match effect {
                Effect::FetchPage(request) => {
                    let source = match feed {
                        Some(feed) if feed.key == request.key => feed.listing_source(),
                        _ => source_of(&request),
                    };
                    let request_id = request.id;
                    let key = request.key.clone();
                    let query = query_for(&request);
                    let job_id = self.start(
                        query,
                        PendingJob::More {
                            request_id,
                            key,
                            source,
                        },
                    );
                    feed_info!(
                        "FetchPage job_id={} request={} key={} after={}",
                        job_id,
                        request_id.0,
                        request.key,
                        request.cursor
                    );
                }
            }
        }
    }

    /// Collects every job that finished since the last call.
    pub fn poll(&mut self) -> Vec<Completion> {
        let mut done = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            match event {
                EngineEvent::FetchCompleted { job_id, result, .. } => {
                    let Some(job) = self.pending.remove(&job_id) else {
                        feed_warn!("completion for unknown job {}", job_id);
                        continue;
                    };
                    if let Err(err) = &result {
                        feed_warn!("Job {} failed: {}", job_id, err);
                    }
                    done.push(match job {
                        PendingJob::Head { source } => Completion::Head { source, result },
                        PendingJob::More {
                            request_id,
                            key,
                            source,
                        } => Completion::More {
                            request_id,
                            key,
                            source,
                            result,
                        },
                    });
                }
            }
        }
        done
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Whether a first-page load for `source` has not finished yet.
    pub fn head_pending(&self, source: &ListingSource) -> bool {
        self.pending
            .values()
            .any(|job| matches!(job, PendingJob::Head { source: pending } if pending == source))
    }

    fn start(&mut self, query: PageQuery, job: PendingJob) -> JobId {
        self.next_job += 1;
        let job_id = self.next_job;
        feed_debug!("job {} query {:?}", job_id, query);
        self.pending.insert(job_id, job);
        self.engine.enqueue(job_id, query);
        job_id
    }
}

fn source_of(request: &FetchRequest) -> ListingSource {
    ResolvedFeed {
        key: request.key.clone(),
        account: request.account.clone(),
    }
    .listing_source()
}

fn query_for(request: &FetchRequest) -> PageQuery {
    PageQuery {
        category: request.category().to_string(),
        order: request.order().as_str().to_string(),
        account: request.account.clone(),
        start_author: request.author().to_string(),
        start_permlink: request.permlink().to_string(),
        params: request.merged_params(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feed_core::SortOrder;
    use feed_engine::{FailureKind, PostSummary};

    #[test]
    fn query_carries_cursor_and_account() {
        let request = FetchRequest {
            id: RequestId(4),
            key: FeedKey::unfiltered(SortOrder::ByFeed),
            cursor: PostRef::new("bob", "post-2"),
            account: Some("alice".to_string()),
            params: RequestParams::new(),
        };

        let query = query_for(&request);
        assert_eq!(query.order, "by_feed");
        assert_eq!(query.category, "");
        assert_eq!(query.account.as_deref(), Some("alice"));
        assert_eq!(query.start_author, "bob");
        assert_eq!(query.start_permlink, "post-2");
        assert!(!query.is_head());
        assert_eq!(source_of(&request), ListingSource::AccountFeed("alice".to_string()));
    }

    #[test]
    fn outcome_reports_last_post() {
        let page = Page {
            items: vec![
                PostSummary {
                    author: "bob".to_string(),
                    permlink: "post-1".to_string(),
                    title: String::new(),
                },
                PostSummary {
                    author: "carol".to_string(),
                    permlink: "post-9".to_string(),
                    title: String::new(),
                },
            ],
        };
        assert_eq!(
            outcome_of(&Ok(page)),
            FetchOutcome::success(Some(PostRef::new("carol", "post-9")))
        );
        assert_eq!(
            outcome_of(&Ok(Page::default())),
            FetchOutcome::success(None)
        );
        assert_eq!(
            outcome_of(&Err(FetchError::new(FailureKind::Timeout, "slow"))),
            FetchOutcome::failure("timeout: slow")
        );
    }
}
