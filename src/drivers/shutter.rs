//! Camera remote-port driver.
//!
//! ## Hardware
//!
//! Two open-drain GPIOs wired to the camera's 2.5 mm remote jack:
//! focus (half-press) and shutter (full press).  Pulling a line to
//! ground engages it, so the reference board is [`Polarity::ActiveLow`].
//!
//! The driver owns the pins and translates engage/idle into levels.  It
//! knows nothing about pulse timing.

use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::app::ports::ActuatorPort;
use crate::error::ActuatorError;

/// Electrical level that engages a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveLow,
    ActiveHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line {
    Focus,
    Shutter,
}

impl Line {
    fn error(self) -> ActuatorError {
        match self {
            Self::Focus => ActuatorError::FocusLine,
            Self::Shutter => ActuatorError::ShutterLine,
        }
    }
}

pub struct ShutterDriver<F: OutputPin, S: OutputPin> {
    focus: F,
    shutter: S,
    polarity: Polarity,
    focus_engaged: bool,
    shutter_engaged: bool,
    /// Pin writes that failed since boot.
    write_faults: u32,
}

impl<F: OutputPin, S: OutputPin> ShutterDriver<F, S> {
    /// Take ownership of both lines and drive them idle.
    pub fn new(focus: F, shutter: S, polarity: Polarity) -> Self {
        let mut drv = Self {
            focus,
            shutter,
            polarity,
            focus_engaged: false,
            shutter_engaged: false,
            write_faults: 0,
        };
        drv.release_all();
        info!("ShutterDriver: ready ({:?})", polarity);
        drv
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn is_focus_engaged(&self) -> bool {
        self.focus_engaged
    }

    pub fn is_shutter_engaged(&self) -> bool {
        self.shutter_engaged
    }

    pub fn write_faults(&self) -> u32 {
        self.write_faults
    }

    /// Give the pins back (e.g. for inspection in tests).
    pub fn release(self) -> (F, S) {
        (self.focus, self.shutter)
    }

    fn drive(&mut self, line: Line, engaged: bool) -> Result<(), ActuatorError> {
        let high = match self.polarity {
            Polarity::ActiveHigh => engaged,
            Polarity::ActiveLow => !engaged,
        };
        let ok = match line {
            Line::Focus => {
                if high {
                    self.focus.set_high().is_ok()
                } else {
                    self.focus.set_low().is_ok()
                }
            }
            Line::Shutter => {
                if high {
                    self.shutter.set_high().is_ok()
                } else {
                    self.shutter.set_low().is_ok()
                }
            }
        };
        if !ok {
            return Err(line.error());
        }
        match line {
            Line::Focus => self.focus_engaged = engaged,
            Line::Shutter => self.shutter_engaged = engaged,
        }
        Ok(())
    }

    /// Edges have no return path to the core; failures are logged and counted.
    fn edge(&mut self, line: Line, engaged: bool) {
        if let Err(e) = self.drive(line, engaged) {
            self.write_faults = self.write_faults.saturating_add(1);
            warn!("ShutterDriver: {}", e);
        }
    }
}

impl<F: OutputPin, S: OutputPin> ActuatorPort for ShutterDriver<F, S> {
    fn engage_focus(&mut self) {
        self.edge(Line::Focus, true);
    }

    fn disengage_focus(&mut self) {
        self.edge(Line::Focus, false);
    }

    fn engage_shutter(&mut self) {
        self.edge(Line::Shutter, true);
    }

    fn disengage_shutter(&mut self) {
        self.edge(Line::Shutter, false);
    }
}
