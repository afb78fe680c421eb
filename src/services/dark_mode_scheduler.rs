//! Dark-Mode Scheduler.
//!
//! Re-evaluates the theme on a fixed interval from local wall-clock time.
//! Time is injected through [`Clock`] so ticks can be simulated.

use std::time::Duration;

use chrono::{Local, NaiveTime};

use crate::types::settings::{DarkModeScheduleSettings, ThemeMode};

/// Source of local wall-clock time.
pub trait Clock {
    fn local_time(&self) -> NaiveTime;
}

/// Reads the system's local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn local_time(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// A clock stuck at one time of day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl Clock for FixedClock {
    fn local_time(&self) -> NaiveTime {
        self.0
    }
}

/// Shortest allowed check interval. A zero interval would fire on every tick.
pub const MIN_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Longest allowed check interval. Longer settings are treated as one day.
pub const MAX_CHECK_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// The dark window and how often it is checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DarkModeSchedule {
    pub dark_start: NaiveTime,
    pub light_start: NaiveTime,
    pub interval: Duration,
}

impl DarkModeSchedule {
    /// Theme for a given time of day. The dark window is `[dark_start, light_start)`
    /// and wraps past midnight when `dark_start` is later than `light_start`.
    pub fn theme_for(&self, time: NaiveTime) -> ThemeMode {
        let dark = if self.dark_start > self.light_start {
            time >= self.dark_start || time < self.light_start
        } else {
            time >= self.dark_start && time < self.light_start
        };
        if dark {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        }
    }
}

impl Default for DarkModeSchedule {
    fn default() -> Self {
        Self::from(&DarkModeScheduleSettings::default())
    }
}

impl From<&DarkModeScheduleSettings> for DarkModeSchedule {
    fn from(s: &DarkModeScheduleSettings) -> Self {
        Self {
            dark_start: s.dark_start,
            light_start: s.light_start,
            interval: Duration::from_secs(s.check_interval_secs)
                .clamp(MIN_CHECK_INTERVAL, MAX_CHECK_INTERVAL),
        }
    }
}

/// Accumulates elapsed time and evaluates the schedule each time a full
/// interval has passed.
pub struct DarkModeScheduler {
    schedule: DarkModeSchedule,
    enabled: bool,
    since_last_check: Duration,
}

impl DarkModeScheduler {
    /// The schedule's interval is clamped to
    /// [`MIN_CHECK_INTERVAL`]..=[`MAX_CHECK_INTERVAL`].
    pub fn new(mut schedule: DarkModeSchedule, enabled: bool) -> Self {
        schedule.interval = schedule.interval.clamp(MIN_CHECK_INTERVAL, MAX_CHECK_INTERVAL);
        Self {
            schedule,
            enabled,
            since_last_check: Duration::ZERO,
        }
    }

    pub fn schedule(&self) -> &DarkModeSchedule {
        &self.schedule
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.since_last_check = Duration::ZERO;
    }

    /// Time left until the next evaluation.
    pub fn time_until_next_check(&self) -> Duration {
        self.schedule.interval.saturating_sub(self.since_last_check)
    }

    /// Advances the scheduler by `elapsed`. Returns the theme to apply when an
    /// interval boundary was crossed; several missed intervals collapse into
    /// one evaluation.
    pub fn advance(&mut self, elapsed: Duration, clock: &dyn Clock) -> Option<ThemeMode> {
        if !self.enabled {
            return None;
        }
        self.since_last_check = self.since_last_check.saturating_add(elapsed);
        if self.since_last_check < self.schedule.interval {
            return None;
        }
        // Below the interval, so at most one day of nanoseconds
        let remainder = self.since_last_check.as_nanos() % self.schedule.interval.as_nanos();
        self.since_last_check = u64::try_from(remainder)
            .map(Duration::from_nanos)
            .unwrap_or(Duration::ZERO);

        let now = clock.local_time();
        let mode = self.schedule.theme_for(now);
        log::debug!("dark-mode schedule at {}: {:?}", now.format("%H:%M"), mode);
        Some(mode)
    }
}
