//! ISR-debounced "take picture now" button.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up.  The GPIO interrupt fires on
//! the falling edge; the handler runs in ISR context and does nothing but
//! debounce and raise [`MANUAL_TRIGGER`].  The core loop reads and clears
//! the flag once per iteration.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::events::TriggerFlag;

/// Edges closer together than this are contact bounce.
pub const DEBOUNCE_MS: u32 = 50;

/// Raised by the button ISR, taken by the core loop.
pub static MANUAL_TRIGGER: TriggerFlag = TriggerFlag::new();

/// Debounce state shared with the ISR.
pub struct ButtonDebounce {
    /// Millisecond timestamp of the last accepted edge, plus one
    /// (0 = no edge yet).
    last_edge: AtomicU32,
}

impl ButtonDebounce {
    pub const fn new() -> Self {
        Self {
            last_edge: AtomicU32::new(0),
        }
    }

    /// Feed one falling edge at `now_ms`.  Raises `flag` and returns
    /// `true` if the edge is a real press.
    pub fn on_edge(&self, now_ms: u32, flag: &TriggerFlag) -> bool {
        let stamp = now_ms.wrapping_add(1);
        let last = self.last_edge.load(Ordering::Acquire);
        if last != 0 && stamp.wrapping_sub(last) < DEBOUNCE_MS {
            return false;
        }
        self.last_edge.store(stamp, Ordering::Release);
        flag.raise();
        true
    }
}

impl Default for ButtonDebounce {
    fn default() -> Self {
        Self::new()
    }
}

static DEBOUNCE: ButtonDebounce = ButtonDebounce::new();

/// GPIO ISR handler.  Register with the GPIO driver's interrupt subscription.
///
/// ISR-safe: no heap, no locks, no logging.
#[cfg(target_os = "espidf")]
pub fn button_isr_handler() {
    let now_ms = (unsafe { esp_idf_svc::sys::esp_timer_get_time() } / 1000) as u32;
    DEBOUNCE.on_edge(now_ms, &MANUAL_TRIGGER);
}

/// Host stand-in for the ISR, driven by a simulated timestamp.
#[cfg(not(target_os = "espidf"))]
pub fn button_isr_handler_at(now_ms: u32) {
    DEBOUNCE.on_edge(now_ms, &MANUAL_TRIGGER);
}
