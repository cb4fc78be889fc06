//! Feed core: pagination policy for keyed post listings and the pure
//! state machine that drives it.
mod config;
mod coordinator;
mod effect;
mod error;
mod key;
mod msg;
mod resolver;
mod state;
mod status;
mod update;
mod view_model;

pub use config::{Clock, CoordinatorConfig, DEFAULT_FILL_VIEWPORT_ABOVE};
pub use coordinator::{
    Decision, FetchCoordinator, FetchOutcome, FetchRequest, ListingState, RequestParams,
    SettleReport, SkipReason, PARAM_ACCOUNT, PARAM_AUTHOR, PARAM_CATEGORY, PARAM_ORDER,
    PARAM_PERMLINK,
};
pub use effect::Effect;
pub use error::{AnchorError, Anomaly};
pub use key::{FeedKey, PostRef, SortOrder, DEFAULT_SORT_ORDER, POST_REF_SEPARATOR};
pub use msg::Msg;
pub use resolver::{
    resolve, sort_order_menu, FeedKeyResolver, ListingSource, ResolvedFeed, FEED_CATEGORY,
};
pub use state::AppState;
pub use status::{FetchStatus, RequestId};
pub use update::update;
pub use view_model::FeedViewModel;
