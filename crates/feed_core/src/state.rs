use crate::coordinator::RequestParams;
use crate::view_model::FeedViewModel;
use crate::{
    sort_order_menu, CoordinatorConfig, FeedKey, FetchCoordinator, ListingState, ResolvedFeed,
    SortOrder,
};

#[derive(Debug, Clone)]
pub struct AppState {
    coordinator: FetchCoordinator,
    base_params: RequestParams,
    active: Option<ResolvedFeed>,
    viewer: Option<String>,
    loaded: Option<usize>,
    host_loading: bool,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(CoordinatorConfig::default())
    }
}

impl AppState {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self::with_coordinator(FetchCoordinator::new(config))
    }

    pub fn with_coordinator(coordinator: FetchCoordinator) -> Self {
        Self {
            coordinator,
            base_params: RequestParams::new(),
            active: None,
            viewer: None,
            loaded: None,
            host_loading: false,
            dirty: false,
        }
    }

    /// Parameters sent with every fetch, e.g. a page size.
    pub fn with_base_params(mut self, params: RequestParams) -> Self {
        self.base_params = params;
        self
    }

    pub fn coordinator(&self) -> &FetchCoordinator {
        &self.coordinator
    }

    pub fn active(&self) -> Option<&ResolvedFeed> {
        self.active.as_ref()
    }

    pub fn is_active(&self, key: &FeedKey) -> bool {
        self.active.as_ref().is_some_and(|feed| &feed.key == key)
    }

    pub fn view(&self) -> FeedViewModel {
        let Some(feed) = self.active.as_ref() else {
            return FeedViewModel {
                sort_menu: sort_order_menu(&SortOrder::default(), self.viewer.is_some()),
                dirty: self.dirty,
                ..FeedViewModel::default()
            };
        };

        let own_feed = feed.is_account_feed()
            && feed.account.is_some()
            && feed.account == self.viewer;
        let current_order = if own_feed {
            SortOrder::Home
        } else {
            feed.key.order().clone()
        };

        FeedViewModel {
            key: Some(feed.key.clone()),
            account: feed.account.clone(),
            source: Some(feed.listing_source()),
            browse_order: Some(feed.browse_order()),
            fetching: self.coordinator.is_fetching(&feed.key) || self.host_loading,
            listing: if self.host_loading {
                ListingState::Fetching
            } else {
                self.coordinator.listing_state(&feed.key, self.loaded)
            },
            own_feed,
            sort_menu: sort_order_menu(&current_order, self.viewer.is_some()),
            dirty: self.dirty,
        }
    }

    /// Returns whether the view changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn coordinator_mut(&mut self) -> &mut FetchCoordinator {
        &mut self.coordinator
    }

    pub fn base_params(&self) -> &RequestParams {
        &self.base_params
    }

    pub(crate) fn navigate(&mut self, feed: ResolvedFeed, viewer: Option<String>) {
        self.active = Some(feed);
        self.viewer = viewer;
        self.loaded = None;
        self.dirty = true;
    }

    pub(crate) fn set_loaded(&mut self, loaded: Option<usize>) {
        if self.loaded != loaded {
            self.loaded = loaded;
            self.dirty = true;
        }
    }

    pub(crate) fn set_host_loading(&mut self, loading: bool) {
        if self.host_loading != loading {
            self.host_loading = loading;
            self.dirty = true;
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
