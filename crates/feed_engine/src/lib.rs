//! Feed engine: executes page fetches off the host loop.
mod engine;
mod fetch;
mod fixture;
mod types;

pub use engine::EngineHandle;
pub use fetch::{FetchSettings, PageFetcher, TimedFetcher};
pub use fixture::{Catalog, CatalogFeed, CatalogListing, FixtureFetcher};
pub use types::{
    EngineError, EngineEvent, FailureKind, FetchError, JobId, Page, PageQuery, PostSummary,
};
