use std::time::{Duration, Instant};

use crate::PostRef;

/// Identifier handed out with every issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

/// Per-key fetch bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchStatus {
    in_flight: Option<RequestId>,
    in_flight_anchor: Option<PostRef>,
    last_requested_at: Option<Instant>,
    last_settled_at: Option<Instant>,
    last_cursor: Option<PostRef>,
    consecutive_failures: u32,
    // Cursors in the order they were recorded; the last entry is `last_cursor`.
    history: Vec<PostRef>,
}

/// Effect of a successful settle on the recorded cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CursorUpdate {
    Advanced,
    Unchanged,
    Regressed { recorded: PostRef },
}

impl FetchStatus {
    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    pub fn last_requested_at(&self) -> Option<Instant> {
        self.last_requested_at
    }

    pub fn last_settled_at(&self) -> Option<Instant> {
        self.last_settled_at
    }

    pub fn last_cursor(&self) -> Option<&PostRef> {
        self.last_cursor.as_ref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub(crate) fn settled_within(&self, now: Instant, window: Duration) -> bool {
        match self.last_settled_at {
            Some(at) => now.saturating_duration_since(at) < window,
            None => false,
        }
    }

    /// Time the current fetch has been outstanding, if any.
    pub(crate) fn in_flight_for(&self, now: Instant) -> Option<Duration> {
        self.in_flight?;
        self.last_requested_at
            .map(|at| now.saturating_duration_since(at))
    }

    pub(crate) fn mark_requested(&mut self, id: RequestId, anchor: PostRef, now: Instant) {
        self.in_flight = Some(id);
        self.in_flight_anchor = Some(anchor);
        self.last_requested_at = Some(now);
    }

    /// Clears the in-flight fetch and returns the anchor it was issued from.
    pub(crate) fn mark_settled(&mut self, now: Instant) -> Option<PostRef> {
        self.in_flight = None;
        self.last_settled_at = Some(now);
        self.in_flight_anchor.take()
    }

    pub(crate) fn record_failure(&mut self) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_failures
    }

    pub(crate) fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// `anchor` is the item the settled fetch started after. A page fetched
    /// from a cursor older than the current one cannot move it.
    pub(crate) fn advance_cursor(
        &mut self,
        anchor: Option<&PostRef>,
        item: PostRef,
    ) -> CursorUpdate {
        let Some(current) = self.last_cursor.clone() else {
            self.history.push(item.clone());
            self.last_cursor = Some(item);
            return CursorUpdate::Advanced;
        };
        if current == item {
            return CursorUpdate::Unchanged;
        }
        let stale_anchor =
            anchor.is_some_and(|anchor| *anchor != current && self.history.contains(anchor));
        if stale_anchor || self.history.contains(&item) {
            return CursorUpdate::Regressed { recorded: current };
        }
        self.history.push(item.clone());
        self.last_cursor = Some(item);
        CursorUpdate::Advanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(n: u32) -> PostRef {
        PostRef::new("carol", format!("post-{n}"))
    }

    #[test]
    fn cursor_only_moves_forward() {
        let mut status = FetchStatus::default();
        assert_eq!(status.advance_cursor(None, post(1)), CursorUpdate::Advanced);
        assert_eq!(status.advance_cursor(Some(&post(1)), post(2)), CursorUpdate::Advanced);
        assert_eq!(status.advance_cursor(Some(&post(2)), post(2)), CursorUpdate::Unchanged);
        assert_eq!(
            status.advance_cursor(None, post(1)),
            CursorUpdate::Regressed { recorded: post(2) }
        );
        assert_eq!(status.last_cursor(), Some(&post(2)));
    }

    #[test]
    fn page_from_an_older_cursor_cannot_move_it() {
        let mut status = FetchStatus::default();
        status.advance_cursor(None, post(1));
        status.advance_cursor(Some(&post(1)), post(3));

        assert_eq!(
            status.advance_cursor(Some(&post(1)), post(2)),
            CursorUpdate::Regressed { recorded: post(3) }
        );
        assert_eq!(status.last_cursor(), Some(&post(3)));
        assert_eq!(status.advance_cursor(Some(&post(3)), post(4)), CursorUpdate::Advanced);
    }

    #[test]
    fn settle_hands_back_the_request_anchor() {
        let now = Instant::now();
        let mut status = FetchStatus::default();
        status.mark_requested(RequestId(1), post(7), now);
        assert_eq!(status.mark_settled(now), Some(post(7)));
        assert_eq!(status.mark_settled(now), None);
    }

    #[test]
    fn settle_window_is_exclusive() {
        let start = Instant::now();
        let mut status = FetchStatus::default();
        status.mark_requested(RequestId(1), post(0), start);
        status.mark_settled(start);

        let window = Duration::from_millis(100);
        assert!(status.settled_within(start + Duration::from_millis(99), window));
        assert!(!status.settled_within(start + window, window));
        assert!(!status.settled_within(start, Duration::ZERO));
    }

    #[test]
    fn failures_reset_on_success() {
        let mut status = FetchStatus::default();
        assert_eq!(status.record_failure(), 1);
        assert_eq!(status.record_failure(), 2);
        status.record_success();
        assert_eq!(status.consecutive_failures(), 0);
    }
}
