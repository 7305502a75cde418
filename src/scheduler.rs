//! Automatic trigger scheduler.
//!
//! Evaluated once per core loop tick against the wall clock and the
//! current [`Settings`]:
//!
//! ```text
//!              time authoritative?
//!                 │no          │yes
//!                 ▼            ▼
//!          interval only   weekday ∈ set  AND  hh:mm ∈ window ?
//!                 │            │yes                  │no
//!                 │            ▼                     ▼
//!                 │     picture interval     downtime interval > 0 ?
//!                 │            │                 │yes        │no
//!                 ▼            ▼                 ▼           ▼
//!          now - last ≥ interval  ──────▶  TriggerRequest   idle
//! ```
//!
//! Gate fields come from the calendar, not from elapsed ticks, so a clock
//! set changes the decision on the very next tick.  Windows never wrap
//! past midnight: `start_hour > end_hour` is permanently closed.

use chrono::{Datelike, NaiveDateTime, Timelike};
use log::{debug, info};

use crate::app::events::TriggerSource;
use crate::config::Settings;
use crate::sequencer::TriggerRequest;

// ═══════════════════════════════════════════════════════════════
//  Gate
// ═══════════════════════════════════════════════════════════════

/// Whether `now` falls on an active weekday inside the active window.
pub fn gate_passes(settings: &Settings, now: NaiveDateTime) -> bool {
    settings.active_weekdays.contains(now.weekday())
        && settings
            .active_window
            .contains(now.hour() as u8, now.minute() as u8)
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Interval/window state machine.
///
/// Holds no copy of the settings; they are passed in on every tick.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    /// Wall clock was set by a controller rather than defaulted at boot.
    time_authoritative: bool,
    /// Time of the last automatic trigger.  `None` until the first one,
    /// so the first eligible tick fires immediately.
    last_trigger: Option<NaiveDateTime>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time_authoritative(&self) -> bool {
        self.time_authoritative
    }

    /// Called after a controller sets the clock.  Enables the gate.
    pub fn mark_time_authoritative(&mut self) {
        if !self.time_authoritative {
            info!("Scheduler: clock authoritative, weekday/window gate enabled");
        }
        self.time_authoritative = true;
    }

    pub fn last_trigger(&self) -> Option<NaiveDateTime> {
        self.last_trigger
    }

    /// Evaluate one tick.
    pub fn tick(&mut self, settings: &Settings, now: NaiveDateTime) -> Option<TriggerRequest> {
        let (interval_s, source) = if !self.time_authoritative || gate_passes(settings, now) {
            (settings.picture_interval_s, TriggerSource::Schedule)
        } else if settings.downtime_picture_interval_s > 0 {
            (settings.downtime_picture_interval_s, TriggerSource::Downtime)
        } else {
            return None;
        };

        if let Some(last) = self.last_trigger {
            let elapsed = (now - last).num_seconds();
            if elapsed < 0 {
                debug!("Scheduler: clock moved back {}s, rebasing", -elapsed);
                self.last_trigger = Some(now);
                return None;
            }
            if elapsed < i64::from(interval_s) {
                return None;
            }
        }

        self.last_trigger = Some(now);
        Some(TriggerRequest(source))
    }
}
