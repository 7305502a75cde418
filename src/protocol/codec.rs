//! Frame → [`Command`] decoder.
//!
//! A frame is a 2-byte ASCII opcode followed by fixed-width decimal
//! fields.  The frame length must equal `2 + Σ(field widths)` exactly;
//! anything else decodes to [`Command::Unknown`].

use log::debug;

use crate::app::commands::Command;
use crate::config::MAX_FRAME_LEN;
use crate::error::ProtocolError;

/// One inbound frame as retained by the command channel.
pub type Frame = heapless::Vec<u8, MAX_FRAME_LEN>;

const OPCODE_LEN: usize = 2;

/// Copy `data` into a [`Frame`], dropping bytes past [`MAX_FRAME_LEN`].
pub fn frame_from_bytes(data: &[u8]) -> Frame {
    let len = data.len().min(MAX_FRAME_LEN);
    let mut frame = Frame::new();
    // Cannot fail: `len` is bounded by the capacity.
    let _ = frame.extend_from_slice(&data[..len]);
    frame
}

/// Parse an ASCII decimal field.
///
/// Any non-digit byte makes the whole field `0`.  Existing controllers
/// depend on this, so out-of-grammar input is never rejected here.
pub fn parse_digits(field: &[u8]) -> u16 {
    let mut value: u32 = 0;
    for &b in field {
        if !b.is_ascii_digit() {
            return 0;
        }
        value = value * 10 + u32::from(b - b'0');
        if value > u32::from(u16::MAX) {
            return 0;
        }
    }
    value as u16
}

fn two(frame: &[u8], at: usize) -> u8 {
    parse_digits(&frame[at..at + 2]) as u8
}

/// Required total frame length for a known opcode.
fn expected_len(opcode: [u8; 2]) -> Option<usize> {
    match &opcode {
        b"st" => Some(OPCODE_LEN + 6 * 2),
        b"si" => Some(OPCODE_LEN + 4),
        b"cs" | b"ce" => Some(OPCODE_LEN + 2 * 2),
        b"gt" | b"gs" | b"tp" => Some(OPCODE_LEN),
        _ => None,
    }
}

/// Decode one frame, reporting why it was not understood.
pub fn try_decode(frame: &[u8]) -> Result<Command, ProtocolError> {
    if frame.len() < OPCODE_LEN {
        return Err(ProtocolError::TooShort);
    }
    let opcode = [frame[0], frame[1]];

    let expected = expected_len(opcode).ok_or(ProtocolError::UnknownOpcode(opcode))?;
    if frame.len() != expected {
        return Err(ProtocolError::LengthMismatch {
            expected,
            actual: frame.len(),
        });
    }

    let cmd = match &opcode {
        b"st" => Command::SetTime {
            year: two(frame, 2),
            month: two(frame, 4),
            day: two(frame, 6),
            hour: two(frame, 8),
            minute: two(frame, 10),
            second: two(frame, 12),
        },
        b"si" => Command::SetInterval {
            seconds: parse_digits(&frame[2..6]),
        },
        b"cs" => Command::SetWindowStart {
            hour: two(frame, 2),
            minute: two(frame, 4),
        },
        b"ce" => Command::SetWindowEnd {
            hour: two(frame, 2),
            minute: two(frame, 4),
        },
        b"gt" => Command::GetTime,
        b"gs" => Command::GetStatus,
        _ => Command::TriggerNow,
    };
    Ok(cmd)
}

/// Decode one frame; malformed input becomes [`Command::Unknown`].
pub fn decode(frame: &[u8]) -> Command {
    try_decode(frame).unwrap_or_else(|e| {
        debug!("Protocol: {}", e);
        Command::Unknown
    })
}
