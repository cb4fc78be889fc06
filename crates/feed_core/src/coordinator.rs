use std::collections::{BTreeMap, HashMap};

use feed_logging::{feed_debug, feed_info, feed_warn};

use crate::error::Anomaly;
use crate::status::CursorUpdate;
use crate::{
    CoordinatorConfig, FeedKey, FeedKeyResolver, FetchStatus, PostRef, RequestId, ResolvedFeed,
    SortOrder,
};

/// Extra parameters the host wants forwarded with a fetch.
pub type RequestParams = BTreeMap<String, String>;

pub const PARAM_AUTHOR: &str = "author";
pub const PARAM_PERMLINK: &str = "permlink";
pub const PARAM_CATEGORY: &str = "category";
pub const PARAM_ORDER: &str = "order";
pub const PARAM_ACCOUNT: &str = "accountname";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Nothing to paginate from.
    NoAnchor,
    /// A fetch for the key has not settled yet.
    InFlight,
    /// A fetch for the key settled inside the cooldown window.
    RecentlyUpdated,
    /// The anchor could not be read as `author/permlink`.
    InvalidAnchor,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoAnchor => "no-anchor",
            Self::InFlight => "in-flight",
            Self::RecentlyUpdated => "recently-updated",
            Self::InvalidAnchor => "invalid-anchor",
        }
    }
}

/// Parameters of a page fetch the host should perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub id: RequestId,
    pub key: FeedKey,
    pub cursor: PostRef,
    pub account: Option<String>,
    pub params: RequestParams,
}

impl FetchRequest {
    pub fn author(&self) -> &str {
        self.cursor.author()
    }

    pub fn permlink(&self) -> &str {
        self.cursor.permlink()
    }

    pub fn category(&self) -> &str {
        self.key.category()
    }

    pub fn order(&self) -> &SortOrder {
        self.key.order()
    }

    /// Caller parameters merged with the cursor and key fields; the latter win.
    pub fn merged_params(&self) -> RequestParams {
        let mut merged = self.params.clone();
        merged.insert(PARAM_AUTHOR.to_string(), self.author().to_string());
        merged.insert(PARAM_PERMLINK.to_string(), self.permlink().to_string());
        merged.insert(PARAM_CATEGORY.to_string(), self.category().to_string());
        merged.insert(PARAM_ORDER.to_string(), self.order().to_string());
        match &self.account {
            Some(account) => {
                merged.insert(PARAM_ACCOUNT.to_string(), account.clone());
            }
            None => {
                merged.remove(PARAM_ACCOUNT);
            }
        }
        merged
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Issue(FetchRequest),
    Skip(SkipReason),
}

impl Decision {
    pub fn is_issue(&self) -> bool {
        matches!(self, Self::Issue(_))
    }

    pub fn into_request(self) -> Option<FetchRequest> {
        match self {
            Self::Issue(request) => Some(request),
            Self::Skip(_) => None,
        }
    }
}

/// How a fetch ended, as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page arrived; `last_item` is its last entry, `None` for an empty page.
    Success { last_item: Option<PostRef> },
    Failure { reason: String },
}

impl FetchOutcome {
    pub fn success(last_item: Option<PostRef>) -> Self {
        Self::Success { last_item }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleReport {
    Advanced(PostRef),
    Unchanged,
    RegressionIgnored { reported: PostRef, recorded: PostRef },
    Failed { consecutive: u32 },
}

/// What the host should show for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingState {
    Fetching,
    #[default]
    Empty,
    Ready(usize),
}

/// Decides when a listing needs another page and tracks fetch status per key.
#[derive(Debug, Clone)]
pub struct FetchCoordinator {
    config: CoordinatorConfig,
    resolver: FeedKeyResolver,
    statuses: HashMap<FeedKey, FetchStatus>,
    next_request: u64,
}

impl FetchCoordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        let resolver = FeedKeyResolver::new(config.default_order.clone());
        Self {
            config,
            resolver,
            statuses: HashMap::new(),
            next_request: 0,
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn resolve(&self, raw_category: Option<&str>, raw_order: Option<&str>) -> ResolvedFeed {
        self.resolver.resolve(raw_category, raw_order)
    }

    pub fn status(&self, key: &FeedKey) -> Option<&FetchStatus> {
        self.statuses.get(key)
    }

    pub fn is_fetching(&self, key: &FeedKey) -> bool {
        self.status(key).is_some_and(FetchStatus::is_fetching)
    }

    pub fn in_flight(&self, key: &FeedKey) -> Option<RequestId> {
        self.status(key).and_then(FetchStatus::in_flight)
    }

    /// Asks for the page after `anchor` on `feed`.
    ///
    /// At most one fetch per key is in flight; a key that settled inside the
    /// cooldown window is treated as still busy.
    pub fn request_more(
        &mut self,
        feed: &ResolvedFeed,
        anchor: Option<&PostRef>,
        params: RequestParams,
    ) -> Decision {
        let key = &feed.key;
        let Some(anchor) = anchor else {
            feed_debug!("skip {}: {}", key, SkipReason::NoAnchor.as_str());
            return Decision::Skip(SkipReason::NoAnchor);
        };

        let now = self.config.now();
        let cooldown = self.config.cooldown;
        let watchdog = self.config.watchdog;
        let status = self.statuses.entry(key.clone()).or_default();

        if status.is_fetching() {
            let elapsed = status.in_flight_for(now).unwrap_or_default();
            if !watchdog.is_some_and(|limit| elapsed >= limit) {
                feed_debug!("skip {}: {}", key, SkipReason::InFlight.as_str());
                return Decision::Skip(SkipReason::InFlight);
            }
            feed_warn!(
                "{}",
                Anomaly::AbandonedFetch {
                    key: key.clone(),
                    elapsed,
                }
            );
        } else if status.settled_within(now, cooldown) {
            feed_debug!("skip {}: {}", key, SkipReason::RecentlyUpdated.as_str());
            return Decision::Skip(SkipReason::RecentlyUpdated);
        }

        self.next_request += 1;
        let id = RequestId(self.next_request);
        status.mark_requested(id, anchor.clone(), now);
        feed_info!("issue fetch #{} for {} after {}", id.0, key, anchor);

        Decision::Issue(FetchRequest {
            id,
            key: key.clone(),
            cursor: anchor.clone(),
            account: feed.account.clone(),
            params,
        })
    }

    /// View-layer entry point: resolves the route and reads the anchor text.
    pub fn request_more_raw(
        &mut self,
        raw_category: Option<&str>,
        raw_order: Option<&str>,
        anchor: Option<&str>,
        params: RequestParams,
    ) -> Decision {
        let feed = self.resolve(raw_category, raw_order);
        self.request_more_with_text(&feed, anchor, params)
    }

    /// Reads `author/permlink` anchor text once, then behaves like
    /// [`Self::request_more`]. Blank text counts as no anchor.
    pub fn request_more_with_text(
        &mut self,
        feed: &ResolvedFeed,
        anchor: Option<&str>,
        params: RequestParams,
    ) -> Decision {
        let anchor = anchor.map(str::trim).filter(|raw| !raw.is_empty());
        let Some(raw) = anchor else {
            return self.request_more(feed, None, params);
        };
        match PostRef::parse(raw) {
            Ok(post) => self.request_more(feed, Some(&post), params),
            Err(source) => {
                feed_warn!(
                    "{}",
                    Anomaly::InvalidAnchor {
                        key: feed.key.clone(),
                        source,
                    }
                );
                Decision::Skip(SkipReason::InvalidAnchor)
            }
        }
    }

    /// Records the end of the fetch for `key`.
    ///
    /// Always clears the in-flight flag. A success moves the cursor forward
    /// only; a failure leaves it alone so the next trigger retries.
    pub fn on_fetch_settled(&mut self, key: &FeedKey, outcome: FetchOutcome) -> SettleReport {
        let now = self.config.now();
        let status = self.statuses.entry(key.clone()).or_default();
        if !status.is_fetching() {
            feed_debug!("settle for {} with no fetch in flight", key);
        }
        let anchor = status.mark_settled(now);

        match outcome {
            FetchOutcome::Success { last_item } => {
                status.record_success();
                let Some(item) = last_item else {
                    feed_debug!("{} settled with an empty page", key);
                    return SettleReport::Unchanged;
                };
                match status.advance_cursor(anchor.as_ref(), item.clone()) {
                    CursorUpdate::Advanced => {
                        feed_debug!("{} cursor advanced to {}", key, item);
                        SettleReport::Advanced(item)
                    }
                    CursorUpdate::Unchanged => SettleReport::Unchanged,
                    CursorUpdate::Regressed { recorded } => {
                        feed_warn!(
                            "{}",
                            Anomaly::CursorRegression {
                                key: key.clone(),
                                reported: item.clone(),
                                recorded: recorded.clone(),
                            }
                        );
                        SettleReport::RegressionIgnored {
                            reported: item,
                            recorded,
                        }
                    }
                }
            }
            FetchOutcome::Failure { reason } => {
                let consecutive = status.record_failure();
                feed_warn!(
                    "{}",
                    Anomaly::FetchFailure {
                        key: key.clone(),
                        reason,
                        consecutive,
                    }
                );
                SettleReport::Failed { consecutive }
            }
        }
    }

    /// Like [`Self::on_fetch_settled`], but only for the fetch currently in
    /// flight. Results of abandoned fetches are dropped.
    pub fn settle_request(
        &mut self,
        id: RequestId,
        key: &FeedKey,
        outcome: FetchOutcome,
    ) -> Option<SettleReport> {
        if self.in_flight(key) != Some(id) {
            feed_info!(
                "dropping result of fetch #{} for {}: no longer in flight",
                id.0,
                key
            );
            return None;
        }
        Some(self.on_fetch_settled(key, outcome))
    }

    /// `loaded` is the number of items the host holds for the key, `None`
    /// when it has no list at all.
    pub fn listing_state(&self, key: &FeedKey, loaded: Option<usize>) -> ListingState {
        if self.is_fetching(key) {
            return ListingState::Fetching;
        }
        match loaded {
            None | Some(0) => ListingState::Empty,
            Some(count) => ListingState::Ready(count),
        }
    }

    /// Whether a content change in a viewport this tall should look for more.
    pub fn wants_viewport_fill(&self, viewport_height: u32) -> bool {
        self.config
            .fill_viewport_above
            .is_some_and(|threshold| viewport_height > threshold)
    }

    pub fn statuses(&self) -> impl Iterator<Item = (&FeedKey, &FetchStatus)> {
        self.statuses.iter()
    }
}
