use feed_logging::feed_debug;

use crate::{AppState, Decision, Effect, Msg};

/// Applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Navigated {
            category,
            order,
            viewer,
        } => {
            let feed = state
                .coordinator()
                .resolve(category.as_deref(), order.as_deref());
            feed_debug!("navigated to {} (account {:?})", feed.key, feed.account);
            state.navigate(feed, viewer);
            Vec::new()
        }
        Msg::LoadMore { last_item } => load_more(&mut state, last_item.as_deref()),
        Msg::ListingChanged {
            item_count,
            last_item,
            viewport_height,
        } => {
            if state.active().is_none() {
                return (state, Vec::new());
            }
            state.set_loaded(item_count);
            // Tall viewports may show the whole page without ever scrolling.
            if state.coordinator().wants_viewport_fill(viewport_height) {
                load_more(&mut state, last_item.as_deref())
            } else {
                Vec::new()
            }
        }
        Msg::FetchSettled {
            request_id,
            key,
            outcome,
        } => {
            let settled = state
                .coordinator_mut()
                .settle_request(request_id, &key, outcome);
            if settled.is_some() && state.is_active(&key) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::HostLoading(loading) => {
            state.set_host_loading(loading);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn load_more(state: &mut AppState, last_item: Option<&str>) -> Vec<Effect> {
    let Some(feed) = state.active().cloned() else {
        return Vec::new();
    };
    let params = state.base_params().clone();
    match state
        .coordinator_mut()
        .request_more_with_text(&feed, last_item, params)
    {
        Decision::Issue(request) => {
            state.mark_dirty();
            vec![Effect::FetchPage(request)]
        }
        Decision::Skip(_) => Vec::new(),
    }
}
