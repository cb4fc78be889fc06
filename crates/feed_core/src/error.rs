use std::time::Duration;

use thiserror::Error;

use crate::{FeedKey, PostRef};

/// Failure to read an `author/permlink` anchor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnchorError {
    #[error("anchor {0:?} has no author/permlink separator")]
    MissingSeparator(String),
    #[error("anchor {0:?} has an empty author")]
    EmptyAuthor(String),
    #[error("anchor {0:?} has an empty permlink")]
    EmptyPermlink(String),
    #[error("anchor {0:?} has more than two segments")]
    ExtraSegments(String),
}

/// Conditions that are logged and absorbed; none of them stops the feed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Anomaly {
    #[error("invalid anchor for {key}: {source}")]
    InvalidAnchor {
        key: FeedKey,
        #[source]
        source: AnchorError,
    },
    #[error("cursor regression for {key}: settled at {reported}, already past it at {recorded}")]
    CursorRegression {
        key: FeedKey,
        reported: PostRef,
        recorded: PostRef,
    },
    #[error("fetch failed for {key} ({consecutive} in a row): {reason}")]
    FetchFailure {
        key: FeedKey,
        reason: String,
        consecutive: u32,
    },
    #[error("abandoning fetch for {key} after {elapsed:?} without a result")]
    AbandonedFetch { key: FeedKey, elapsed: Duration },
}
