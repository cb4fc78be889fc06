use crate::{FeedKey, ListingSource, ListingState, SortOrder};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedViewModel {
    pub key: Option<FeedKey>,
    pub account: Option<String>,
    pub source: Option<ListingSource>,
    pub browse_order: Option<SortOrder>,
    pub fetching: bool,
    pub listing: ListingState,
    /// The active feed is the viewer's own following list.
    pub own_feed: bool,
    pub sort_menu: Vec<SortOrder>,
    pub dirty: bool,
}
