//! LapseCam Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        LogEventSink   SettingsStore<Nvs>      │
//! │  (Clock+Actuator+Delay) (EventSink)    (SettingsPort)          │
//! │  BleCommandChannel      Button ISR                             │
//! │  (FrameQueue+ReplyPort) (TriggerFlag)                          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Protocol · Scheduler · Sequencer                      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pins (ESP32-S3 reference board):
//!
//! | GPIO | Function                                 |
//! |------|------------------------------------------|
//! | 4    | Focus line, open drain, active low       |
//! | 5    | Shutter line, open drain, active low     |
//! | 0    | Manual trigger button (BOOT), pull-up    |
#![deny(unused_must_use)]

use std::io::BufRead;

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{InterruptType, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use log::{info, warn};

use lapsecam::adapters::ble::BleCommandChannel;
use lapsecam::adapters::hardware::HardwareAdapter;
use lapsecam::adapters::log_sink::LogEventSink;
use lapsecam::adapters::nvs::NvsAdapter;
use lapsecam::adapters::time::SystemClock;
use lapsecam::app::service::AppService;
use lapsecam::config::TimingConfig;
use lapsecam::drivers::button::{MANUAL_TRIGGER, button_isr_handler};
use lapsecam::drivers::shutter::{Polarity, ShutterDriver};
use lapsecam::store::SettingsStore;

/// Command channel shared by the transport task and the core loop.
static NUS: BleCommandChannel = BleCommandChannel::new();

/// Feed newline-terminated commands typed on the serial console into the
/// command channel, so the device can be driven without a BLE central.
fn spawn_console_bridge() -> Result<()> {
    std::thread::Builder::new()
        .name("console".into())
        .stack_size(4096)
        .spawn(|| {
            NUS.on_connected();
            NUS.on_subscribe(true);
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => NUS.on_write(line.trim_end().as_bytes()),
                    Err(e) => {
                        warn!("Console: read failed: {}", e);
                        break;
                    }
                }
            }
        })?;
    Ok(())
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  LapseCam v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;

    // ── 2. Camera remote lines ────────────────────────────────
    let focus = PinDriver::output_od(peripherals.pins.gpio4)?;
    let shutter = PinDriver::output_od(peripherals.pins.gpio5)?;
    let shutter = ShutterDriver::new(focus, shutter, Polarity::ActiveLow);
    let mut hw = HardwareAdapter::new(shutter, SystemClock::new(), FreeRtos);

    // ── 3. Manual trigger button ──────────────────────────────
    let mut button = PinDriver::input(peripherals.pins.gpio0)?;
    button.set_pull(Pull::Up)?;
    button.set_interrupt_type(InterruptType::NegEdge)?;
    // SAFETY: the handler only touches atomics; no heap, no locks.
    unsafe {
        button.subscribe(button_isr_handler)?;
    }
    button.enable_interrupt()?;

    // ── 4. Settings store ─────────────────────────────────────
    // Without flash the loop still runs, on defaults that do not persist.
    let nvs = NvsAdapter::new().unwrap_or_else(|e| {
        warn!("NVS init failed: {}", e);
        NvsAdapter::offline()
    });
    let mut store = SettingsStore::new(nvs);
    let mut sink = LogEventSink::new();

    // ── 5. App service ────────────────────────────────────────
    let timing = TimingConfig::default();
    let mut app = AppService::new(timing);
    app.start(&mut store, &mut sink);

    NUS.on_advertising();
    spawn_console_bridge()?;

    info!("System ready. Entering core loop.");

    // ── 6. Core loop ──────────────────────────────────────────
    let mut replies = &NUS;
    loop {
        app.poll_once(
            NUS.inbox(),
            &MANUAL_TRIGGER,
            &mut hw,
            &mut store,
            &mut replies,
            &mut sink,
        );

        while let Some(reply) = NUS.next_notification() {
            println!("{}", reply);
        }

        // GPIO interrupts disarm after firing.
        if let Err(e) = button.enable_interrupt() {
            warn!("Button: re-arm failed: {}", e);
        }

        FreeRtos::delay_ms(timing.loop_interval_ms);
    }
}
