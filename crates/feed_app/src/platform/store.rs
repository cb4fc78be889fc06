use std::collections::{HashMap, HashSet};

use feed_core::ListingSource;
use feed_engine::PostSummary;

/// Posts the host has loaded, per listing.
#[derive(Debug, Default)]
pub(crate) struct ListingStore {
    lists: HashMap<ListingSource, Vec<PostSummary>>,
}

impl ListingStore {
    /// Replaces a listing with its head page.
    pub fn replace(&mut self, source: ListingSource, posts: Vec<PostSummary>) {
        self.lists.insert(source, posts);
    }

    /// Appends a page, skipping posts already present. Returns how many were new.
    pub fn append(&mut self, source: ListingSource, posts: Vec<PostSummary>) -> usize {
        let list = self.lists.entry(source).or_default();
        let mut known: HashSet<String> = list.iter().map(PostSummary::identity).collect();
        let before = list.len();
        list.extend(
            posts
                .into_iter()
                .filter(|post| known.insert(post.identity())),
        );
        list.len() - before
    }

    pub fn len(&self, source: &ListingSource) -> Option<usize> {
        self.lists.get(source).map(Vec::len)
    }

    pub fn last(&self, source: &ListingSource) -> Option<&PostSummary> {
        self.lists.get(source).and_then(|list| list.last())
    }

    pub fn posts(&self, source: &ListingSource) -> &[PostSummary] {
        self.lists
            .get(source)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
