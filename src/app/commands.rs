//! Inbound commands to the application service.
//!
//! One [`Command`] is decoded per frame received on the command channel
//! (see [`crate::protocol`]).  Commands carry only the integers lifted
//! from the frame; they never borrow from the settings record.

/// Commands a remote controller can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `st`: set the wall clock.  `month` is zero-based, `year` is years since 2000.
    SetTime {
        year: u8,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    },

    /// `si`: set the automatic picture interval (floored on dispatch).
    SetInterval { seconds: u16 },

    /// `cs`: set the active-window start.
    SetWindowStart { hour: u8, minute: u8 },

    /// `ce`: set the active-window end.
    SetWindowEnd { hour: u8, minute: u8 },

    /// `gt`: report the wall clock.
    GetTime,

    /// `gs`: report window, interval and counters.
    GetStatus,

    /// `tp`: take a picture now.
    TriggerNow,

    /// Anything that does not match the opcode table.
    Unknown,
}
