//! Application service, the hexagonal core.
//!
//! [`AppService`] is the single consumer: it owns the live [`Settings`],
//! the picture counters, the scheduler and the trigger sequencer.  All
//! I/O flows through port traits injected at call sites, making the
//! entire loop testable with mock adapters.
//!
//! ```text
//!  FrameQueue ──▶ ┌────────────────────────────┐ ──▶ ReplyPort
//!  TriggerFlag ─▶ │         AppService         │ ──▶ EventSink
//!   ClockPort ◀──▶│ Protocol · Scheduler · Seq │ ──▶ ActuatorPort
//!                 └────────────────────────────┘ ◀─▶ SettingsPort
//! ```

use chrono::NaiveDateTime;
use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::config::{Settings, TimingConfig};
use crate::events::{FrameQueue, TriggerFlag};
use crate::protocol::{Counters, dispatch, try_decode};
use crate::scheduler::Scheduler;
use crate::sequencer::{PulseOutcome, TriggerRequest, TriggerSequencer};

use super::commands::Command;
use super::events::{AppEvent, TriggerSource};
use super::ports::{ActuatorPort, ClockPort, EventSink, ReplyPort, SettingsPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    settings: Settings,
    counters: Counters,
    scheduler: Scheduler,
    sequencer: TriggerSequencer,
}

impl AppService {
    /// Construct the service on factory defaults.
    ///
    /// Does **not** read the store; call [`start`](Self::start) next.
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            settings: Settings::default(),
            counters: Counters::default(),
            scheduler: Scheduler::new(),
            sequencer: TriggerSequencer::new(timing),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Load persisted settings, healing the store if it is unusable.
    ///
    /// A missing, corrupt or unreadable record all fall back to defaults,
    /// followed by exactly one `save()`.
    pub fn start(&mut self, store: &mut impl SettingsPort, sink: &mut impl EventSink) {
        match store.load() {
            Ok(settings) => {
                info!("AppService: settings loaded");
                self.settings = settings;
            }
            Err(e) => {
                warn!("AppService: {}, falling back to defaults", e);
                self.settings = Settings::default();
                match store.save(&self.settings) {
                    Ok(()) => sink.emit(&AppEvent::StoreHealed(e)),
                    Err(save_err) => {
                        warn!("AppService: heal write failed: {}", save_err);
                        sink.emit(&AppEvent::SaveFailed(save_err));
                    }
                }
            }
        }
        sink.emit(&AppEvent::Started(self.settings));
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one core loop iteration.
    ///
    /// Order: manual flag → at most one frame → scheduler → at most one
    /// pulse.  Every trigger source seen in this iteration is merged
    /// into a single pulse.
    pub fn poll_once<H>(
        &mut self,
        frames: &FrameQueue,
        manual: &TriggerFlag,
        hw: &mut H,
        store: &mut impl SettingsPort,
        replies: &mut impl ReplyPort,
        sink: &mut impl EventSink,
    ) where
        H: ClockPort + ActuatorPort + DelayNs,
    {
        let mut pending: Option<TriggerRequest> = None;

        // 1. Physical button
        if manual.take() {
            Self::merge(&mut pending, TriggerRequest(TriggerSource::Button), sink);
        }

        // 2. One inbound command
        if let Some(frame) = frames.pop() {
            if let Some(req) = self.handle_frame(&frame, hw, store, replies, sink) {
                Self::merge(&mut pending, req, sink);
            }
        }

        // 3. Scheduler, against the clock as it stands after any `st`
        if let Some(req) = self.scheduler.tick(&self.settings, hw.now()) {
            Self::merge(&mut pending, req, sink);
        }

        // 4. Pulse
        if let Some(TriggerRequest(source)) = pending {
            self.take_picture(source, hw, manual, sink);
        }
    }

    /// Decode, dispatch and apply one frame.  Returns its trigger request, if any.
    pub fn handle_frame(
        &mut self,
        frame: &[u8],
        clock: &mut impl ClockPort,
        store: &mut impl SettingsPort,
        replies: &mut impl ReplyPort,
        sink: &mut impl EventSink,
    ) -> Option<TriggerRequest> {
        let cmd = try_decode(frame).unwrap_or_else(|e| {
            debug!("AppService: {}", e);
            sink.emit(&AppEvent::UnknownCommand(e));
            Command::Unknown
        });

        let outcome = dispatch(&cmd, &self.settings, clock.now(), &self.counters);

        if let Some(at) = outcome.set_clock {
            clock.set(at);
            self.scheduler.mark_time_authoritative();
            sink.emit(&AppEvent::ClockSet(at));
        }

        if let Some(next) = outcome.settings {
            self.commit(next, clock.now(), store, sink);
        }

        if replies.is_subscribed() {
            for reply in &outcome.replies {
                replies.send(reply);
            }
        } else {
            debug!(
                "AppService: no subscriber, {} reply line(s) dropped",
                outcome.replies.len()
            );
        }

        self.counters.since_last_command = 0;
        outcome.trigger
    }

    // ── Queries ───────────────────────────────────────────────

    /// Live settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn time_authoritative(&self) -> bool {
        self.scheduler.time_authoritative()
    }

    pub fn sequencer(&self) -> &TriggerSequencer {
        &self.sequencer
    }

    // ── Internal ──────────────────────────────────────────────

    fn merge(pending: &mut Option<TriggerRequest>, req: TriggerRequest, sink: &mut impl EventSink) {
        if pending.is_some() {
            sink.emit(&AppEvent::Coalesced(req.0));
        } else {
            *pending = Some(req);
        }
    }

    /// Replace the in-memory record and persist it.  A failed save is
    /// logged; the new settings stay in effect regardless, but
    /// `last_updated_at` only moves once a save succeeds.
    fn commit(
        &mut self,
        next: Settings,
        now: NaiveDateTime,
        store: &mut impl SettingsPort,
        sink: &mut impl EventSink,
    ) {
        let stamped = Settings {
            last_updated_at: now.and_utc().timestamp(),
            ..next
        };
        match store.save(&stamped) {
            Ok(()) => {
                self.settings = stamped;
                sink.emit(&AppEvent::SettingsSaved(stamped));
            }
            Err(e) => {
                warn!("AppService: settings save failed: {}", e);
                self.settings = Settings {
                    last_updated_at: self.settings.last_updated_at,
                    ..next
                };
                sink.emit(&AppEvent::SaveFailed(e));
            }
        }
    }

    fn take_picture<H>(
        &mut self,
        source: TriggerSource,
        hw: &mut H,
        manual: &TriggerFlag,
        sink: &mut impl EventSink,
    ) where
        H: ActuatorPort + DelayNs,
    {
        match self.sequencer.fire(hw) {
            PulseOutcome::Completed => {
                self.counters.record_picture();
                sink.emit(&AppEvent::PictureTaken {
                    source,
                    total: self.counters.since_reset,
                });
            }
            PulseOutcome::Coalesced => sink.emit(&AppEvent::Coalesced(source)),
        }

        // Presses during the pulse belong to it.
        if manual.take() {
            sink.emit(&AppEvent::Coalesced(TriggerSource::Button));
        }
    }
}
