//! Cross-context hand-off between interrupt/callback producers and the
//! core loop.
//!
//! Two primitives, both safe to use from any execution context:
//!
//! - [`FrameQueue`]: bounded FIFO of inbound command frames.  Producers
//!   never block; a full queue drops the newest frame.
//! - [`TriggerFlag`]: single boolean "take a picture now", raised by an
//!   ISR and read-and-cleared by the consumer.
//!
//! ```text
//! ┌─────────────┐  push   ┌──────────────┐  pop (≤1/tick)  ┌──────────────┐
//! │ BLE write   │────────▶│  FrameQueue  │────────────────▶│              │
//! │ callback    │         │  (depth 8)   │                 │  Core loop   │
//! └─────────────┘         └──────────────┘                 │  (consumer)  │
//! ┌─────────────┐  raise  ┌──────────────┐  take           │              │
//! │ Button ISR  │────────▶│ TriggerFlag  │────────────────▶│              │
//! └─────────────┘         └──────────────┘                 └──────────────┘
//! ```
//!
//! Neither producer ever sees `Settings` or the store.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::config::FRAME_QUEUE_DEPTH;
use crate::protocol::{Frame, frame_from_bytes};

// ── Inbound frame queue ───────────────────────────────────────

/// Bounded FIFO of raw command frames.
pub struct FrameQueue {
    channel: Channel<CriticalSectionRawMutex, Frame, FRAME_QUEUE_DEPTH>,
    dropped: AtomicU32,
}

impl FrameQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Enqueue a frame, truncating it to the frame bound.
    ///
    /// Returns `false` if the queue was full and the frame was dropped.
    pub fn push(&self, data: &[u8]) -> bool {
        match self.channel.try_send(frame_from_bytes(data)) {
            Ok(()) => true,
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Dequeue the oldest frame, if any.
    pub fn pop(&self) -> Option<Frame> {
        self.channel.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    /// Frames dropped on overflow since boot.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ── Manual trigger flag ───────────────────────────────────────

/// Single-writer, single-reader "fire now" flag.
pub struct TriggerFlag(AtomicBool);

impl TriggerFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Set the flag.  ISR-safe.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Read and clear in one step.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for TriggerFlag {
    fn default() -> Self {
        Self::new()
    }
}
