use std::collections::BTreeMap;
use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type JobId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostSummary {
    pub author: String,
    pub permlink: String,
    #[serde(default)]
    pub title: String,
}

impl PostSummary {
    pub fn identity(&self) -> String {
        format!("{}/{}", self.author, self.permlink)
    }
}

/// One page request as the transport sees it.
///
/// An empty `start_author` asks for the head of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageQuery {
    pub category: String,
    pub order: String,
    pub account: Option<String>,
    pub start_author: String,
    pub start_permlink: String,
    pub params: BTreeMap<String, String>,
}

impl PageQuery {
    pub fn head(category: impl Into<String>, order: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            order: order.into(),
            ..Self::default()
        }
    }

    pub fn is_head(&self) -> bool {
        self.start_author.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    pub items: Vec<PostSummary>,
}

impl Page {
    pub fn last(&self) -> Option<&PostSummary> {
        self.items.last()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    FetchCompleted {
        job_id: JobId,
        query: PageQuery,
        result: Result<Page, FetchError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidQuery,
    NotFound,
    Timeout,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidQuery => write!(f, "invalid query"),
            FailureKind::NotFound => write!(f, "not found"),
            FailureKind::Timeout => write!(f, "timeout"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start fetch runtime: {0}")]
    Runtime(#[from] io::Error),
}
