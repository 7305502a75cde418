//! Hardware adapter. Bridges real peripherals to domain port traits.
//!
//! Owns the shutter driver, the wall clock and a blocking delay, and
//! exposes them as one value satisfying [`ClockPort`], [`ActuatorPort`]
//! and [`DelayNs`].  The core loop takes that single `&mut` instead of
//! three overlapping borrows.

use chrono::NaiveDateTime;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::app::ports::{ActuatorPort, ClockPort};
use crate::drivers::shutter::ShutterDriver;

use super::time::SystemClock;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<F: OutputPin, S: OutputPin, D: DelayNs> {
    shutter: ShutterDriver<F, S>,
    clock: SystemClock,
    delay: D,
}

impl<F: OutputPin, S: OutputPin, D: DelayNs> HardwareAdapter<F, S, D> {
    pub fn new(shutter: ShutterDriver<F, S>, clock: SystemClock, delay: D) -> Self {
        Self {
            shutter,
            clock,
            delay,
        }
    }

    pub fn shutter(&self) -> &ShutterDriver<F, S> {
        &self.shutter
    }
}

// ── ClockPort implementation ──────────────────────────────────

impl<F: OutputPin, S: OutputPin, D: DelayNs> ClockPort for HardwareAdapter<F, S, D> {
    fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    fn set(&mut self, at: NaiveDateTime) {
        self.clock.set(at);
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<F: OutputPin, S: OutputPin, D: DelayNs> ActuatorPort for HardwareAdapter<F, S, D> {
    fn engage_focus(&mut self) {
        self.shutter.engage_focus();
    }

    fn disengage_focus(&mut self) {
        self.shutter.disengage_focus();
    }

    fn engage_shutter(&mut self) {
        self.shutter.engage_shutter();
    }

    fn disengage_shutter(&mut self) {
        self.shutter.disengage_shutter();
    }
}

// ── DelayNs implementation ────────────────────────────────────

impl<F: OutputPin, S: OutputPin, D: DelayNs> DelayNs for HardwareAdapter<F, S, D> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
