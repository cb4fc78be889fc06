use std::fmt;

use crate::error::AnchorError;

/// Sort order token of a listing route.
///
/// Unrecognised tokens are kept verbatim in [`SortOrder::Other`]; validating
/// them is up to the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Home,
    Trending,
    Created,
    Hot,
    Promoted,
    /// Synthetic order used for per-account following lists.
    ByFeed,
    Other(String),
}

/// The recognised default sort.
pub const DEFAULT_SORT_ORDER: SortOrder = SortOrder::Trending;

impl SortOrder {
    pub fn parse(token: &str) -> Self {
        match token {
            "home" => Self::Home,
            "trending" => Self::Trending,
            "created" => Self::Created,
            "hot" => Self::Hot,
            "promoted" => Self::Promoted,
            "by_feed" => Self::ByFeed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Home => "home",
            Self::Trending => "trending",
            Self::Created => "created",
            Self::Hot => "hot",
            Self::Promoted => "promoted",
            Self::ByFeed => "by_feed",
            Self::Other(token) => token,
        }
    }

    pub fn is_recognised(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        DEFAULT_SORT_ORDER
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical identity of a listing: tag filter plus sort order.
///
/// An empty category means "no tag filter".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedKey {
    category: String,
    order: SortOrder,
}

impl FeedKey {
    pub fn new(category: impl Into<String>, order: SortOrder) -> Self {
        Self {
            category: category.into(),
            order,
        }
    }

    pub fn unfiltered(order: SortOrder) -> Self {
        Self::new(String::new(), order)
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn order(&self) -> &SortOrder {
        &self.order
    }

    pub fn is_unfiltered(&self) -> bool {
        self.category.is_empty()
    }
}

impl fmt::Display for FeedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unfiltered() {
            write!(f, "{}/*", self.order)
        } else {
            write!(f, "{}/{}", self.order, self.category)
        }
    }
}

/// Identity of a post: `(author, permlink)`.
///
/// Hosts pass the combined `author/permlink` form; it is split once here and
/// carried structurally afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostRef {
    author: String,
    permlink: String,
}

pub const POST_REF_SEPARATOR: char = '/';

impl PostRef {
    pub fn new(author: impl Into<String>, permlink: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            permlink: permlink.into(),
        }
    }

    /// Parses the combined `author/permlink` form.
    pub fn parse(raw: &str) -> Result<Self, AnchorError> {
        let trimmed = raw.trim();
        let (author, permlink) = trimmed
            .split_once(POST_REF_SEPARATOR)
            .ok_or_else(|| AnchorError::MissingSeparator(trimmed.to_string()))?;
        if author.is_empty() {
            return Err(AnchorError::EmptyAuthor(trimmed.to_string()));
        }
        if permlink.is_empty() {
            return Err(AnchorError::EmptyPermlink(trimmed.to_string()));
        }
        if permlink.contains(POST_REF_SEPARATOR) {
            return Err(AnchorError::ExtraSegments(trimmed.to_string()));
        }
        Ok(Self::new(author, permlink))
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn permlink(&self) -> &str {
        &self.permlink
    }
}

impl fmt::Display for PostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.author, POST_REF_SEPARATOR, self.permlink)
    }
}
