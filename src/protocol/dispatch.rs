//! [`Command`] → effects.
//!
//! `dispatch` reads the current settings and clock and returns an
//! [`Outcome`] describing what should happen.  Mutations come back as a
//! complete new [`Settings`] value; the caller decides whether it is
//! committed.

use core::fmt::{self, Write};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::app::commands::Command;
use crate::app::events::TriggerSource;
use crate::config::{MAX_REPLY_LEN, MIN_PICTURE_INTERVAL_S, Settings};
use crate::sequencer::TriggerRequest;

/// One outbound reply unit.
pub type Reply = heapless::String<MAX_REPLY_LEN>;

/// Upper bound on replies per command (`gs` sends four).
pub const MAX_REPLIES: usize = 4;

/// C `asctime` layout without the trailing newline.
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// In-memory picture counters.  Not persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub since_reset: u32,
    pub since_last_command: u32,
}

impl Counters {
    /// One pulse completed.
    pub fn record_picture(&mut self) {
        self.since_reset = self.since_reset.wrapping_add(1);
        self.since_last_command = self.since_last_command.wrapping_add(1);
    }
}

/// Everything a single command asks the core loop to do.
#[derive(Debug, Default, PartialEq)]
pub struct Outcome {
    pub replies: heapless::Vec<Reply, MAX_REPLIES>,
    /// Replacement settings record, if the command changed anything.
    pub settings: Option<Settings>,
    /// New wall-clock time; also marks the clock authoritative.
    pub set_clock: Option<NaiveDateTime>,
    pub trigger: Option<TriggerRequest>,
}

impl Outcome {
    fn reply(&mut self, args: fmt::Arguments<'_>) {
        let mut line = Reply::new();
        // Overlong text is cut at the reply bound.
        let _ = line.write_fmt(args);
        let _ = self.replies.push(line);
    }
}

/// Resolve an `st` payload to a calendar time.
///
/// `month` is zero-based and `year` counts from 2000.  Out-of-range
/// fields carry into the next larger unit, so day 0 is the last day of
/// the previous month and February 30th is early March.
pub fn resolve_set_time(
    year: u8,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
) -> NaiveDateTime {
    let year = 2000 + i32::from(year) + i32::from(month / 12);
    // Always a real date: month is 1..=12 and year is 2000..=2107.
    let first = NaiveDate::from_ymd_opt(year, u32::from(month % 12) + 1, 1).unwrap_or_default();

    first.and_time(NaiveTime::MIN)
        + TimeDelta::days(i64::from(day) - 1)
        + TimeDelta::hours(i64::from(hour))
        + TimeDelta::minutes(i64::from(minute))
        + TimeDelta::seconds(i64::from(second))
}

fn valid_time_of_day(hour: u8, minute: u8) -> bool {
    hour <= 23 && minute <= 59
}

/// Interpret one command against the current state.
pub fn dispatch(
    cmd: &Command,
    settings: &Settings,
    now: NaiveDateTime,
    counters: &Counters,
) -> Outcome {
    let mut out = Outcome::default();

    match *cmd {
        Command::SetTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
        } => {
            let at = resolve_set_time(year, month, day, hour, minute, second);
            out.set_clock = Some(at);
            out.reply(format_args!("Time set over NUS: {}", at.format(ASCTIME)));
        }

        Command::SetInterval { seconds } => {
            let seconds = seconds.max(MIN_PICTURE_INTERVAL_S);
            out.settings = Some(Settings {
                picture_interval_s: seconds,
                ..*settings
            });
            out.reply(format_args!("Picture interval set to {}", seconds));
        }

        Command::SetWindowStart { hour, minute } => {
            if valid_time_of_day(hour, minute) {
                let mut next = *settings;
                next.active_window.start_hour = hour;
                next.active_window.start_minute = minute;
                out.settings = Some(next);
                out.reply(format_args!("Picture start time at {}:{:02}", hour, minute));
            } else {
                out.reply(format_args!("Invalid time of day"));
            }
        }

        Command::SetWindowEnd { hour, minute } => {
            if valid_time_of_day(hour, minute) {
                let mut next = *settings;
                next.active_window.end_hour = hour;
                next.active_window.end_minute = minute;
                out.settings = Some(next);
                out.reply(format_args!("Picture end time at {}:{:02}", hour, minute));
            } else {
                out.reply(format_args!("Invalid time of day"));
            }
        }

        Command::GetTime => {
            out.reply(format_args!("Current time: {}", now.format(ASCTIME)));
        }

        Command::GetStatus => {
            let w = &settings.active_window;
            out.reply(format_args!("Start time {}:{:02}", w.start_hour, w.start_minute));
            out.reply(format_args!("End time {}:{:02}", w.end_hour, w.end_minute));
            out.reply(format_args!("Interval {} s", settings.picture_interval_s));
            out.reply(format_args!(
                "Pictures {} total, {} since last command",
                counters.since_reset, counters.since_last_command
            ));
        }

        Command::TriggerNow => {
            out.trigger = Some(TriggerRequest(TriggerSource::Remote));
            out.reply(format_args!("Picture request received"));
        }

        Command::Unknown => out.reply(format_args!("Unknown command")),
    }

    out
}
