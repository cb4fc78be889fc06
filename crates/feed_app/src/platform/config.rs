use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use feed_core::{CoordinatorConfig, RequestParams, SortOrder, DEFAULT_FILL_VIEWPORT_ABOVE};
use feed_engine::{Catalog, FetchSettings};
use feed_logging::{feed_info, feed_warn, LogDestination};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_CONFIG_FILE: &str = "./feed.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub default_order: String,
    /// Milliseconds after a settle during which the same listing is left alone.
    pub cooldown_ms: u64,
    pub watchdog_ms: Option<u64>,
    pub fill_viewport_above: Option<u32>,
    pub request_timeout_ms: u64,
    pub page_size: usize,
    pub log: String,
    pub log_level: String,
    pub fixture: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            default_order: SortOrder::default().to_string(),
            cooldown_ms: 0,
            watchdog_ms: None,
            fill_viewport_above: Some(DEFAULT_FILL_VIEWPORT_ABOVE),
            request_timeout_ms: fetch.request_timeout.as_millis() as u64,
            page_size: fetch.page_size,
            log: "terminal".to_string(),
            log_level: "info".to_string(),
            fixture: None,
        }
    }
}

impl AppConfig {
    pub fn coordinator(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            default_order: SortOrder::parse(self.default_order.trim()),
            cooldown: Duration::from_millis(self.cooldown_ms),
            watchdog: self.watchdog_ms.map(Duration::from_millis),
            fill_viewport_above: self.fill_viewport_above,
            clock: Arc::new(Instant::now),
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            page_size: self.page_size,
        }
    }

    pub fn base_params(&self) -> RequestParams {
        let mut params = RequestParams::new();
        params.insert("limit".to_string(), self.page_size.to_string());
        params
    }

    pub fn log_destination(&self) -> LogDestination {
        LogDestination::from_name(&self.log).unwrap_or_default()
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.trim().parse().unwrap_or(LevelFilter::Info)
    }
}

/// Reads the config file; a missing file yields defaults.
pub(crate) fn load_config(path: &Path) -> Result<AppConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(AppConfig::default());
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to read config file at {}", path.display()));
        }
    };
    ron::from_str(&content)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))
}

/// Loads the offline listing catalog; problems are logged and yield an empty catalog.
pub(crate) fn load_catalog(path: &Path) -> Catalog {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            feed_warn!("Failed to read catalog from {:?}: {}", path, err);
            return Catalog::default();
        }
    };

    match ron::from_str::<Catalog>(&content) {
        Ok(catalog) => {
            feed_info!(
                "Loaded catalog from {:?} ({} listings, {} feeds)",
                path,
                catalog.listings.len(),
                catalog.feeds.len()
            );
            catalog
        }
        Err(err) => {
            feed_warn!("Failed to parse catalog from {:?}: {}", path, err);
            Catalog::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let cfg = load_config(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.coordinator().default_order, SortOrder::Trending);
        assert_eq!(cfg.coordinator().cooldown, Duration::ZERO);
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feed.ron");
        fs::write(
            &path,
            "(default_order: \"hot\", cooldown_ms: 750, watchdog_ms: Some(20000), log: \"both\")",
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        let coordinator = cfg.coordinator();
        assert_eq!(coordinator.default_order, SortOrder::Hot);
        assert_eq!(coordinator.cooldown, Duration::from_millis(750));
        assert_eq!(coordinator.watchdog, Some(Duration::from_secs(20)));
        assert_eq!(cfg.log_destination(), LogDestination::Both);
        assert_eq!(cfg.page_size, FetchSettings::default().page_size);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feed.ron");
        fs::write(&path, "(cooldown_ms: \"soon\")").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn catalog_parses_listings_and_feeds() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.ron");
        fs::write(
            &path,
            r#"(
                listings: [
                    (category: "funny", order: "trending", posts: [
                        (author: "bob", permlink: "post-1"),
                    ]),
                ],
                feeds: [
                    (account: "alice", posts: []),
                ],
            )"#,
        )
        .unwrap();

        let catalog = load_catalog(&path);
        assert_eq!(catalog.listings.len(), 1);
        assert_eq!(catalog.listings[0].posts[0].permlink, "post-1");
        assert_eq!(catalog.feeds[0].account, "alice");
    }

    #[test]
    fn unreadable_catalog_is_empty() {
        let dir = tempdir().unwrap();
        let catalog = load_catalog(&dir.path().join("absent.ron"));
        assert_eq!(catalog, Catalog::default());
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let cfg = AppConfig {
            log_level: "chatty".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(cfg.level_filter(), LevelFilter::Info);
        let cfg = AppConfig {
            log_level: "debug".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(cfg.level_filter(), LevelFilter::Debug);
    }
}
