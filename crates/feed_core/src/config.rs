use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::SortOrder;

/// Source of "now" for status timestamps.
pub type Clock = Arc<dyn Fn() -> Instant + Send + Sync>;

/// Viewport height (px) above which a content change re-checks for more data.
pub const DEFAULT_FILL_VIEWPORT_ABOVE: u32 = 3000;

#[derive(Clone)]
pub struct CoordinatorConfig {
    /// Sort used when a route carries no order token.
    pub default_order: SortOrder,
    /// How long after a settle the same key still counts as busy.
    /// Zero disables the check.
    pub cooldown: Duration,
    /// Abandon an in-flight fetch that has not settled within this window.
    /// `None` waits forever.
    pub watchdog: Option<Duration>,
    pub fill_viewport_above: Option<u32>,
    pub clock: Clock,
}

impl CoordinatorConfig {
    pub fn now(&self) -> Instant {
        (self.clock)()
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            default_order: SortOrder::default(),
            cooldown: Duration::ZERO,
            watchdog: None,
            fill_viewport_above: Some(DEFAULT_FILL_VIEWPORT_ABOVE),
            clock: Arc::new(Instant::now),
        }
    }
}

impl fmt::Debug for CoordinatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinatorConfig")
            .field("default_order", &self.default_order)
            .field("cooldown", &self.cooldown)
            .field("watchdog", &self.watchdog)
            .field("fill_viewport_above", &self.fill_viewport_above)
            .finish_non_exhaustive()
    }
}
