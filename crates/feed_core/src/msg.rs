use crate::{FeedKey, FetchOutcome, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Route changed: raw category and order segments plus the logged-in viewer.
    Navigated {
        category: Option<String>,
        order: Option<String>,
        viewer: Option<String>,
    },
    /// List scrolled near its end; carries the last visible `author/permlink`.
    LoadMore { last_item: Option<String> },
    /// Host merged new content into the active list.
    ListingChanged {
        item_count: Option<usize>,
        last_item: Option<String>,
        viewport_height: u32,
    },
    /// Transport finished a fetch.
    FetchSettled {
        request_id: RequestId,
        key: FeedKey,
        outcome: FetchOutcome,
    },
    /// Host-wide loading indicator changed.
    HostLoading(bool),
    /// Render tick.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
