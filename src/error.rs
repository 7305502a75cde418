//! Error types for the LapseCam firmware.
//!
//! All variants are `Copy` so they can be logged and passed around
//! without allocation.  None of them is fatal: the core loop keeps running
//! on its in-memory settings.  Storage errors live next to their ports in
//! [`crate::app::ports`].

use core::fmt;

// ---------------------------------------------------------------------------
// Protocol errors
// ---------------------------------------------------------------------------

/// Why a frame decoded to `Command::Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Fewer than two bytes, so no opcode.
    TooShort,
    /// The two-byte opcode is not in the command table.
    UnknownOpcode([u8; 2]),
    /// Opcode known but the frame length does not match its field widths.
    LengthMismatch { expected: usize, actual: usize },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort => write!(f, "frame shorter than an opcode"),
            Self::UnknownOpcode([a, b]) => {
                write!(f, "unknown opcode 0x{:02x}{:02x}", a, b)
            }
            Self::LengthMismatch { expected, actual } => {
                write!(f, "frame length {actual}, opcode needs {expected}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// The focus output pin rejected a level change.
    FocusLine,
    /// The shutter output pin rejected a level change.
    ShutterLine,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FocusLine => write!(f, "focus line write failed"),
            Self::ShutterLine => write!(f, "shutter line write failed"),
        }
    }
}
