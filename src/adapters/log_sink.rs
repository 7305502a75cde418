//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC in production, stderr on the host).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(s) => {
                let w = &s.active_window;
                info!(
                    "START | interval={}s downtime={}s | window {}:{:02}-{}:{:02}{} | days={:?}",
                    s.picture_interval_s,
                    s.downtime_picture_interval_s,
                    w.start_hour,
                    w.start_minute,
                    w.end_hour,
                    w.end_minute,
                    if w.always_active { " (always)" } else { "" },
                    s.active_weekdays.0,
                );
            }
            AppEvent::StoreHealed(cause) => {
                warn!("STORE | {}, defaults written back", cause);
            }
            AppEvent::SettingsSaved(s) => {
                info!("STORE | saved at {}", s.last_updated_at);
            }
            AppEvent::SaveFailed(e) => {
                warn!("STORE | save failed: {}", e);
            }
            AppEvent::ClockSet(at) => {
                info!("CLOCK | set to {}", at);
            }
            AppEvent::PictureTaken { source, total } => {
                info!("PHOTO | {:?} | #{}", source, total);
            }
            AppEvent::Coalesced(source) => {
                info!("PHOTO | {:?} request merged into running pulse", source);
            }
            AppEvent::UnknownCommand(e) => {
                info!("CMD   | unknown ({})", e);
            }
        }
    }
}
