//! Refresh schedule.
//!
//! The schedule is expressed as wall-clock times in the exchange zone: one
//! daily-reload time plus one or more intraday refresh times. `next_fire`
//! is a pure function over "now", so the async driver in [`crate::daemon`]
//! is a trivial sleep loop and everything interesting is unit-testable.

use time::{Time, UtcOffset};
use tickwatch_core::UtcDateTime;

/// Exchange-local zone the schedule is written in (TWSE, UTC+8).
pub const EXCHANGE_OFFSET: UtcOffset = tickwatch_core::alert::EXCHANGE_OFFSET;

/// What a scheduled trigger asks the orchestrator to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    /// Rebuild the bar series from a fresh historical fetch.
    DailyReload,
    /// Fold the latest intraday quote into the series and alert.
    IntradayRefresh,
}

/// Per-instrument trigger times, exchange-local.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    reload: Time,
    refreshes: Vec<Time>,
}

impl Schedule {
    pub fn new(reload: Time, mut refreshes: Vec<Time>) -> Self {
        refreshes.sort();
        refreshes.dedup();
        Self { reload, refreshes }
    }

    pub fn reload_time(&self) -> Time {
        self.reload
    }

    pub fn refresh_times(&self) -> &[Time] {
        &self.refreshes
    }

    /// The next trigger strictly after `now`.
    ///
    /// When a reload and a refresh share a wall-clock time the reload wins,
    /// so the refresh that follows works on a fresh series.
    pub fn next_fire(&self, now: UtcDateTime) -> (UtcDateTime, TickKind) {
        let local = now.into_inner().to_offset(EXCHANGE_OFFSET);
        let today = local.date();

        let fire_at = |at: Time| {
            let fire_date = if at > local.time() {
                today
            } else {
                today.next_day().unwrap_or(today)
            };
            fire_date.with_time(at).assume_offset(EXCHANGE_OFFSET)
        };

        // Seeding with the reload makes it win any shared wall-clock time.
        let mut best = (fire_at(self.reload), TickKind::DailyReload);
        for &at in &self.refreshes {
            let fire = fire_at(at);
            if fire < best.0 {
                best = (fire, TickKind::IntradayRefresh);
            }
        }

        (UtcDateTime::from_instant(best.0), best.1)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::time;

    use super::*;

    fn schedule() -> Schedule {
        // 08:00 reload, 13:25 refresh, exchange-local.
        Schedule::new(time!(08:00), vec![time!(13:25)])
    }

    fn utc(input: &str) -> UtcDateTime {
        UtcDateTime::parse(input).expect("valid timestamp")
    }

    #[test]
    fn morning_tick_is_the_reload() {
        // 06:00 local (22:00 UTC previous day).
        let (at, kind) = schedule().next_fire(utc("2024-01-01T22:00:00Z"));
        assert_eq!(kind, TickKind::DailyReload);
        assert_eq!(at, utc("2024-01-02T00:00:00Z")); // 08:00 local
    }

    #[test]
    fn after_reload_comes_the_refresh() {
        // 09:00 local.
        let (at, kind) = schedule().next_fire(utc("2024-01-02T01:00:00Z"));
        assert_eq!(kind, TickKind::IntradayRefresh);
        assert_eq!(at, utc("2024-01-02T05:25:00Z")); // 13:25 local
    }

    #[test]
    fn after_last_refresh_wraps_to_tomorrow_reload() {
        // 14:00 local.
        let (at, kind) = schedule().next_fire(utc("2024-01-02T06:00:00Z"));
        assert_eq!(kind, TickKind::DailyReload);
        assert_eq!(at, utc("2024-01-03T00:00:00Z"));
    }

    #[test]
    fn fire_time_is_strictly_after_now() {
        // Exactly 13:25 local: that instant has passed, wrap to tomorrow's reload.
        let (at, kind) = schedule().next_fire(utc("2024-01-02T05:25:00Z"));
        assert_eq!(kind, TickKind::DailyReload);
        assert_eq!(at, utc("2024-01-03T00:00:00Z"));
    }

    #[test]
    fn reload_wins_a_shared_wall_clock_time() {
        let schedule = Schedule::new(time!(08:00), vec![time!(08:00), time!(13:25)]);
        let (_, kind) = schedule.next_fire(utc("2024-01-01T22:00:00Z"));
        assert_eq!(kind, TickKind::DailyReload);
    }

    #[test]
    fn refresh_times_are_sorted_and_deduped() {
        let schedule = Schedule::new(time!(08:00), vec![time!(13:25), time!(10:00), time!(13:25)]);
        assert_eq!(schedule.refresh_times(), &[time!(10:00), time!(13:25)]);
    }
}
