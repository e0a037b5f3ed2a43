//! Poll bookkeeping: fetch modes, busy flags, and the repeating poll timer.

use std::fmt::Display;
use std::future;
use std::time::Duration;

use chrono::{DateTime, TimeZone};
use tokio::time::{Instant, Interval, MissedTickBehavior};

pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const REPOLL_DELAY: Duration = Duration::from_secs(1);

/// Who asked for a fetch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchMode {
    /// Operator-triggered refresh (or the initial load); drives the refresh indicator
    Manual,
    /// Background poll from the timer
    Auto,
}

/// Busy flags derived from fetch start/finish pairs
#[derive(Clone, Debug)]
pub struct PollStatus {
    loading: bool,
    manual_in_flight: usize,
}

impl PollStatus {
    pub fn new() -> Self {
        Self {
            loading: true,
            manual_in_flight: 0,
        }
    }

    pub fn begin(&mut self, mode: FetchMode) {
        if mode == FetchMode::Manual {
            self.manual_in_flight += 1;
        }
    }

    /// Record a resolved fetch, successful or not.
    pub fn finish(&mut self, mode: FetchMode) {
        self.loading = false;
        if mode == FetchMode::Manual {
            self.manual_in_flight = self.manual_in_flight.saturating_sub(1);
        }
    }

    /// True until the first fetch resolves
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// True while any manual fetch is outstanding
    pub fn is_refreshing(&self) -> bool {
        self.manual_in_flight > 0
    }
}

impl Default for PollStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a wall-clock time as `HH:MM:SS` (24-hour, zero padded)
pub fn format_clock<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format("%H:%M:%S").to_string()
}

/// Repeating poll timer that can be disarmed and re-armed.
///
/// While disarmed, [`PollTimer::tick`] never resolves, so it can sit in a
/// `select!` loop unconditionally.
#[derive(Debug)]
pub struct PollTimer {
    period: Duration,
    interval: Option<Interval>,
}

impl PollTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    /// Arm the timer; the first tick fires one full period from now.
    ///
    /// Returns false if it was already armed.
    pub fn arm(&mut self) -> bool {
        if self.interval.is_some() {
            return false;
        }
        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
        true
    }

    /// Disarm the timer; returns false if it was not armed.
    pub fn disarm(&mut self) -> bool {
        self.interval.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    pub async fn tick(&mut self) -> Instant {
        match self.interval.as_mut() {
            Some(interval) => interval.tick().await,
            None => future::pending().await,
        }
    }
}
