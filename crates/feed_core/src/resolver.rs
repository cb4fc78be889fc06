use crate::{FeedKey, SortOrder};

/// Route category that aliases to a per-account following list.
pub const FEED_CATEGORY: &str = "feed";

const ACCOUNT_MARKER: char = '@';

/// Where the host should read the visible list from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListingSource {
    /// Discussion index for the key.
    Discussions(FeedKey),
    /// Following list of an account.
    AccountFeed(String),
    /// `feed` route without an account in the order token.
    Unknown,
}

/// A navigation context normalised into a feed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFeed {
    pub key: FeedKey,
    pub account: Option<String>,
}

impl ResolvedFeed {
    pub fn into_parts(self) -> (FeedKey, Option<String>) {
        (self.key, self.account)
    }

    pub fn is_account_feed(&self) -> bool {
        self.key.order() == &SortOrder::ByFeed
    }

    pub fn listing_source(&self) -> ListingSource {
        if !self.is_account_feed() {
            return ListingSource::Discussions(self.key.clone());
        }
        match &self.account {
            Some(account) => ListingSource::AccountFeed(account.clone()),
            None => ListingSource::Unknown,
        }
    }

    /// Order used for topic browsing next to this listing.
    pub fn browse_order(&self) -> SortOrder {
        if self.is_account_feed() {
            SortOrder::Trending
        } else {
            self.key.order().clone()
        }
    }
}

/// Maps raw route segments to a [`ResolvedFeed`] using a configured default sort.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedKeyResolver {
    default_order: SortOrder,
}

impl FeedKeyResolver {
    pub fn new(default_order: SortOrder) -> Self {
        Self { default_order }
    }

    pub fn resolve(&self, raw_category: Option<&str>, raw_order: Option<&str>) -> ResolvedFeed {
        resolve(raw_category, raw_order, &self.default_order)
    }
}

/// Normalises `(category, order token)` into a feed key.
///
/// For the `feed` category the order token names the account (`@alice`) and
/// the key becomes `{"", by_feed}`. Otherwise the token wins over
/// `default_order` when present. Never fails.
pub fn resolve(
    raw_category: Option<&str>,
    raw_order: Option<&str>,
    default_order: &SortOrder,
) -> ResolvedFeed {
    if raw_category == Some(FEED_CATEGORY) {
        let account = raw_order
            .map(|token| token.strip_prefix(ACCOUNT_MARKER).unwrap_or(token))
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        return ResolvedFeed {
            key: FeedKey::unfiltered(SortOrder::ByFeed),
            account,
        };
    }

    let order = raw_order
        .map(SortOrder::parse)
        .unwrap_or_else(|| default_order.clone());
    ResolvedFeed {
        key: FeedKey::new(raw_category.unwrap_or_default(), order),
        account: None,
    }
}

const MENU_ORDERS: [SortOrder; 4] = [
    SortOrder::Trending,
    SortOrder::Created,
    SortOrder::Hot,
    SortOrder::Promoted,
];

/// Sort orders a viewer can switch to from `current`.
///
/// `home` is only offered to logged-in viewers.
pub fn sort_order_menu(current: &SortOrder, logged_in: bool) -> Vec<SortOrder> {
    let home = logged_in.then_some(SortOrder::Home);
    home.into_iter()
        .chain(MENU_ORDERS)
        .filter(|order| order != current)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_without_marker_keeps_whole_token() {
        let resolved = resolve(Some("feed"), Some("alice"), &SortOrder::Trending);
        assert_eq!(resolved.account.as_deref(), Some("alice"));
    }

    #[test]
    fn feed_without_order_token_has_no_account() {
        let resolved = resolve(Some("feed"), None, &SortOrder::Trending);
        assert_eq!(resolved.key, FeedKey::unfiltered(SortOrder::ByFeed));
        assert_eq!(resolved.account, None);
        assert_eq!(resolved.listing_source(), ListingSource::Unknown);
    }

    #[test]
    fn bare_marker_is_not_an_account() {
        let resolved = resolve(Some("feed"), Some("@"), &SortOrder::Trending);
        assert_eq!(resolved.account, None);
    }

    #[test]
    fn menu_excludes_current_and_gates_home() {
        assert_eq!(
            sort_order_menu(&SortOrder::Trending, false),
            vec![SortOrder::Created, SortOrder::Hot, SortOrder::Promoted]
        );
        assert_eq!(
            sort_order_menu(&SortOrder::Hot, true),
            vec![
                SortOrder::Home,
                SortOrder::Trending,
                SortOrder::Created,
                SortOrder::Promoted
            ]
        );
    }
}
