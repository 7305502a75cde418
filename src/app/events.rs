//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them; the shipped one writes them to the
//! serial log.

use chrono::NaiveDateTime;

use crate::app::ports::StoreError;
use crate::config::Settings;
use crate::error::ProtocolError;

/// What asked for a picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    /// Automatic, inside the active window.
    Schedule,
    /// Automatic, outside the window on the downtime interval.
    Downtime,
    /// `tp` command from the remote controller.
    Remote,
    /// Local push button.
    Button,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Boot finished; carries the settings the loop starts with.
    Started(Settings),

    /// The stored record was missing or unusable and defaults were written back.
    StoreHealed(StoreError),

    /// A settings change was persisted.
    SettingsSaved(Settings),

    /// A settings change could not be persisted; the in-memory copy is kept.
    SaveFailed(StoreError),

    /// The wall clock was set by a controller.
    ClockSet(NaiveDateTime),

    /// One full focus/shutter pulse completed.
    PictureTaken { source: TriggerSource, total: u32 },

    /// A trigger arrived while a pulse was already running and was merged into it.
    Coalesced(TriggerSource),

    /// An inbound frame did not decode to a known command.
    UnknownCommand(ProtocolError),
}
