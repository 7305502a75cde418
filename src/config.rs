//! Operating configuration.
//!
//! [`Settings`] is the single persisted record: it is owned by the core
//! loop, mutated only through the command protocol, and written to flash
//! as one fixed-size blob by [`crate::store`].  [`TimingConfig`] holds the
//! build-time constants of the trigger hardware and the control loop.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Lower bound on the automatic picture interval (seconds).
pub const MIN_PICTURE_INTERVAL_S: u16 = 30;

/// Interval used until a controller configures one (10 minutes).
pub const DEFAULT_PICTURE_INTERVAL_S: u16 = 600;

/// Inbound frames longer than this are truncated, not rejected.
pub const MAX_FRAME_LEN: usize = 23;

/// Depth of the inbound frame queue between the BLE callback and the core loop.
pub const FRAME_QUEUE_DEPTH: usize = 8;

/// Maximum length of one outbound reply unit.
pub const MAX_REPLY_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Active window
// ---------------------------------------------------------------------------

/// Time-of-day window during which automatic pictures are taken.
///
/// Both bounds are inclusive to the minute.  A window whose start hour is
/// after its end hour is never active: midnight wraparound is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveWindow {
    pub start_hour: u8,
    pub start_minute: u8,
    pub end_hour: u8,
    pub end_minute: u8,
    /// Open the window for the whole day regardless of the bounds above.
    /// Never inferred from `start == end`.
    pub always_active: bool,
}

impl ActiveWindow {
    pub const fn new(start_hour: u8, start_minute: u8, end_hour: u8, end_minute: u8) -> Self {
        Self {
            start_hour,
            start_minute,
            end_hour,
            end_minute,
            always_active: false,
        }
    }

    /// Whether `hour:minute` lies inside the window.
    pub fn contains(&self, hour: u8, minute: u8) -> bool {
        if self.always_active {
            return true;
        }
        if hour < self.start_hour || hour > self.end_hour {
            return false;
        }
        if hour == self.start_hour && minute < self.start_minute {
            return false;
        }
        if hour == self.end_hour && minute > self.end_minute {
            return false;
        }
        true
    }
}

impl Default for ActiveWindow {
    fn default() -> Self {
        Self::new(8, 0, 17, 59)
    }
}

// ---------------------------------------------------------------------------
// Weekday presence map
// ---------------------------------------------------------------------------

/// Seven-entry presence map, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdaySet(pub [bool; 7]);

impl WeekdaySet {
    pub const fn all() -> Self {
        Self([true; 7])
    }

    pub const fn none() -> Self {
        Self([false; 7])
    }

    /// Monday through Friday.
    pub const fn working_days() -> Self {
        Self([true, true, true, true, true, false, false])
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0[day.num_days_from_monday() as usize]
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0[day.num_days_from_monday() as usize] = true;
    }

    pub fn remove(&mut self, day: Weekday) {
        self.0[day.num_days_from_monday() as usize] = false;
    }
}

impl Default for WeekdaySet {
    fn default() -> Self {
        Self::all()
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// The persisted operating configuration.
///
/// Integers are encoded fixed-width so every record has the same size on
/// flash.  `picture_interval_s >= MIN_PICTURE_INTERVAL_S` is enforced by the
/// command protocol before a value reaches this struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Minimum spacing between automatic pictures inside the window.
    #[serde(with = "postcard::fixint::le")]
    pub picture_interval_s: u16,
    /// Spacing outside the window; 0 disables pictures there.
    #[serde(with = "postcard::fixint::le")]
    pub downtime_picture_interval_s: u16,
    pub active_window: ActiveWindow,
    pub active_weekdays: WeekdaySet,
    /// Wall-clock time of the last successful save (Unix seconds, 0 = never).
    #[serde(with = "postcard::fixint::le")]
    pub last_updated_at: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            picture_interval_s: DEFAULT_PICTURE_INTERVAL_S,
            downtime_picture_interval_s: 0,
            active_window: ActiveWindow::default(),
            active_weekdays: WeekdaySet::all(),
            last_updated_at: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Build-time timing of the control loop and the trigger pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Sleep between core loop iterations (milliseconds).
    pub loop_interval_ms: u32,
    /// Focus line held alone before the shutter engages (milliseconds).
    pub focus_settle_ms: u32,
    /// Shutter line held before both lines release (milliseconds).
    pub shutter_hold_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            loop_interval_ms: 100,
            focus_settle_ms: 700,
            shutter_hold_ms: 100,
        }
    }
}
