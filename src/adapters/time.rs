//! Wall-clock and delay adapters.
//!
//! - **`target_os = "espidf"`**: [`SystemClock`] wraps `gettimeofday()` /
//!   `settimeofday()`.  Delays come from `esp_idf_hal::delay::FreeRtos`.
//! - **`not(target_os = "espidf")`**: a settable base time advanced by
//!   `std::time::Instant`, and [`StdDelay`] over `std::thread::sleep`.
//!
//! Time is kept as naive local time: the device has no timezone database
//! and controllers send local wall-clock fields.

use chrono::{NaiveDate, NaiveDateTime};
use log::info;

use crate::app::ports::ClockPort;

/// Wall-clock value the device assumes until a controller sets the time.
pub fn default_boot_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 1, 24)
        .and_then(|d| d.and_hms_opt(8, 12, 12))
        .unwrap_or_default()
}

/// Clock adapter for the trigger controller.
pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    base: NaiveDateTime,
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// Before 2020-01-01 the RTC has never been set.
    #[cfg(target_os = "espidf")]
    const EPOCH_2020: i64 = 1_577_836_800;

    /// Initialise the clock, seeding it with [`default_boot_time`] if the
    /// RTC holds nothing plausible.
    pub fn new() -> Self {
        #[cfg(target_os = "espidf")]
        {
            let mut clock = Self {};
            if clock.now().and_utc().timestamp() < Self::EPOCH_2020 {
                clock.set(default_boot_time());
                info!("SystemClock: RTC unset, seeded with {}", default_boot_time());
            }
            clock
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("SystemClock: simulation backend");
            Self {
                base: default_boot_time(),
                start: std::time::Instant::now(),
            }
        }
    }
}

#[cfg(target_os = "espidf")]
impl ClockPort for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return NaiveDateTime::default();
        }
        chrono::DateTime::from_timestamp(tv.tv_sec as i64, 0)
            .map(|dt| dt.naive_utc())
            .unwrap_or_default()
    }

    fn set(&mut self, at: NaiveDateTime) {
        let tv = esp_idf_svc::sys::timeval {
            tv_sec: at.and_utc().timestamp() as esp_idf_svc::sys::time_t,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::settimeofday(&tv, core::ptr::null()) } != 0 {
            log::warn!("SystemClock: settimeofday failed");
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl ClockPort for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let elapsed = chrono::TimeDelta::from_std(self.start.elapsed()).unwrap_or_default();
        self.base + elapsed
    }

    fn set(&mut self, at: NaiveDateTime) {
        self.base = at;
        self.start = std::time::Instant::now();
    }
}

/// Blocking delay over `std::thread::sleep` for host simulation.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

#[cfg(not(target_os = "espidf"))]
impl embedded_hal::delay::DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }
}
