//! Host side of the feed: configuration, effect execution, the listing store
//! and the stdin command loop.
mod app;
mod commands;
mod config;
mod effects;
mod store;

pub use app::run_app;
