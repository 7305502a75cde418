//! Focus → shutter → release pulse.
//!
//! ```text
//!  focus   ‾‾‾|______________________________|‾‾‾   (active-low shown)
//!  shutter ‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾|__________|‾‾‾
//!             ◀──── focus settle ───▶◀ hold ▶
//! ```
//!
//! The pulse blocks the caller for its full duration and always runs to
//! completion.  A request that arrives while a pulse is in flight is
//! coalesced into it (dropped), never queued.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::app::events::TriggerSource;
use crate::app::ports::ActuatorPort;
use crate::config::TimingConfig;

/// "Fire now", tagged with who asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerRequest(pub TriggerSource);

/// Result of a [`TriggerSequencer::fire`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseOutcome {
    /// A full pulse was driven.
    Completed,
    /// Another pulse was already running; this request was absorbed.
    Coalesced,
}

/// Drives the actuator through the fixed pulse sequence.
pub struct TriggerSequencer {
    timing: TimingConfig,
    busy: AtomicBool,
}

impl TriggerSequencer {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            timing,
            busy: AtomicBool::new(false),
        }
    }

    /// Whether a pulse is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run one pulse, or coalesce if one is already running.
    pub fn fire<H>(&self, hw: &mut H) -> PulseOutcome
    where
        H: ActuatorPort + DelayNs,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Sequencer: pulse in flight, request coalesced");
            return PulseOutcome::Coalesced;
        }

        hw.engage_focus();
        hw.delay_ms(self.timing.focus_settle_ms);
        hw.engage_shutter();
        hw.delay_ms(self.timing.shutter_hold_ms);
        hw.release_all();

        self.busy.store(false, Ordering::Release);
        PulseOutcome::Completed
    }
}
