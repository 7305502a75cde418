//! Integration tests for the core loop: boot recovery, command handling,
//! scheduling and pulse coalescing, all through `AppService::poll_once`
//! against mock adapters.

use std::sync::Arc;

use crate::mock_hw::{CountingStore, MockHardware, MockNvs, MockReplies, RecordingSink, monday};

use lapsecam::app::events::{AppEvent, TriggerSource};
use lapsecam::app::ports::{CorruptKind, SettingsPort, StoreError};
use lapsecam::app::service::AppService;
use lapsecam::config::{ActiveWindow, Settings, TimingConfig, WeekdaySet};
use lapsecam::error::ProtocolError;
use lapsecam::events::{FrameQueue, TriggerFlag};
use lapsecam::store::{KEY, NAMESPACE, SettingsStore};

struct Rig {
    app: AppService,
    hw: MockHardware,
    store: CountingStore,
    replies: MockReplies,
    sink: RecordingSink,
    frames: Arc<FrameQueue>,
    manual: Arc<TriggerFlag>,
}

impl Rig {
    fn boot(nvs: MockNvs) -> Self {
        let mut rig = Self {
            app: AppService::new(TimingConfig::default()),
            hw: MockHardware::new(monday(8, 12)),
            store: CountingStore::new(nvs),
            replies: MockReplies::subscribed(),
            sink: RecordingSink::new(),
            frames: Arc::new(FrameQueue::new()),
            manual: Arc::new(TriggerFlag::new()),
        };
        rig.app.start(&mut rig.store, &mut rig.sink);
        rig
    }

    /// Booted on an empty store, with the immediate first scheduled
    /// picture already taken and all records cleared.
    fn primed() -> Self {
        let mut rig = Self::boot(MockNvs::new());
        rig.poll();
        assert_eq!(rig.hw.pulses(), 1);
        rig.hw.calls.clear();
        rig.hw.shots.clear();
        rig.hw.slept_ms = 0;
        rig.sink.events.clear();
        rig.replies.sent.clear();
        rig.store.saves = 0;
        rig
    }

    fn poll(&mut self) {
        self.app.poll_once(
            &self.frames,
            &self.manual,
            &mut self.hw,
            &mut self.store,
            &mut self.replies,
            &mut self.sink,
        );
    }

    fn send(&mut self, frame: &[u8]) {
        assert!(self.frames.push(frame));
        self.poll();
    }
}

fn custom() -> Settings {
    Settings {
        picture_interval_s: 90,
        downtime_picture_interval_s: 0,
        active_window: ActiveWindow::new(7, 45, 19, 15),
        active_weekdays: WeekdaySet::working_days(),
        last_updated_at: 1_643_011_932,
    }
}

fn nvs_with(settings: &Settings) -> MockNvs {
    let mut store = SettingsStore::new(MockNvs::new());
    store.save(settings).unwrap();
    store.into_inner()
}

// ── Boot recovery ─────────────────────────────────────────────

#[test]
fn empty_store_heals_with_defaults_and_one_save() {
    let mut rig = Rig::boot(MockNvs::new());

    assert_eq!(*rig.app.settings(), Settings::default());
    assert_eq!(rig.store.saves, 1);
    assert_eq!(
        rig.sink.events,
        [
            AppEvent::StoreHealed(StoreError::NotFound),
            AppEvent::Started(Settings::default()),
        ]
    );
    assert_eq!(rig.store.load(), Ok(Settings::default()));
    assert!(rig.store.nvs().raw(NAMESPACE, KEY).is_some());
}

#[test]
fn flipped_format_tag_falls_back_and_heals() {
    let mut nvs = nvs_with(&custom());
    nvs.raw_mut(NAMESPACE, KEY).unwrap()[0] ^= 0xFF;

    let rig = Rig::boot(nvs);

    assert_eq!(*rig.app.settings(), Settings::default());
    assert_eq!(rig.store.saves, 1);
    assert_eq!(
        rig.sink.events[0],
        AppEvent::StoreHealed(StoreError::Corrupt(CorruptKind::FormatTag))
    );
    assert_eq!(rig.store.load(), Ok(Settings::default()));
}

#[test]
fn restart_restores_saved_settings_without_writing() {
    let rig = Rig::boot(nvs_with(&custom()));
    assert_eq!(*rig.app.settings(), custom());
    assert_eq!(rig.store.saves, 0);
    assert_eq!(rig.sink.events, [AppEvent::Started(custom())]);
}

#[test]
fn heal_write_failure_is_not_fatal() {
    let mut nvs = MockNvs::new();
    nvs.fail_writes = 2;
    let mut rig = Rig::boot(nvs);

    assert_eq!(*rig.app.settings(), Settings::default());
    assert_eq!(rig.sink.events[0], AppEvent::SaveFailed(StoreError::Io));
    assert_eq!(rig.store.nvs().write_attempts, 2);

    rig.poll();
    assert_eq!(rig.hw.pulses(), 1);
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn set_interval_commits_persists_and_replies() {
    let mut rig = Rig::primed();
    rig.send(b"si0045");

    assert_eq!(rig.app.settings().picture_interval_s, 45);
    assert_eq!(rig.store.saves, 1);
    let stored = rig.store.load().unwrap();
    assert_eq!(stored.picture_interval_s, 45);
    assert_eq!(stored.last_updated_at, rig.app.settings().last_updated_at);
    assert!(stored.last_updated_at > 0);
    assert_eq!(rig.replies.sent, ["Picture interval set to 45"]);
}

#[test]
fn interval_below_floor_is_raised() {
    let mut rig = Rig::primed();
    rig.send(b"si0001");
    assert_eq!(rig.app.settings().picture_interval_s, 30);
    assert_eq!(rig.replies.sent, ["Picture interval set to 30"]);
}

#[test]
fn replies_dropped_without_subscriber_but_state_changes() {
    let mut rig = Rig::primed();
    rig.replies.subscribed = false;
    rig.send(b"cs0615");

    assert!(rig.replies.sent.is_empty());
    assert_eq!(rig.app.settings().active_window.start_hour, 6);
    assert_eq!(rig.app.settings().active_window.start_minute, 15);
}

#[test]
fn queries_never_mutate_settings() {
    let mut rig = Rig::primed();
    let before = *rig.app.settings();

    rig.send(b"gt");
    rig.send(b"gs");

    assert_eq!(*rig.app.settings(), before);
    assert_eq!(rig.store.saves, 0);
    assert_eq!(rig.replies.sent.len(), 5);
    assert!(rig.replies.sent[0].starts_with("Current time: Mon Jan 24 08:12:"));
    assert_eq!(rig.replies.sent[1], "Start time 8:00");
    assert_eq!(rig.replies.sent[2], "End time 17:59");
    assert_eq!(rig.replies.sent[3], "Interval 600 s");
}

#[test]
fn malformed_frame_is_unknown_and_harmless() {
    let mut rig = Rig::primed();
    let before = *rig.app.settings();

    rig.send(b"si045");

    assert_eq!(*rig.app.settings(), before);
    assert_eq!(rig.store.saves, 0);
    assert_eq!(rig.replies.sent, ["Unknown command"]);
    assert!(rig.sink.events.contains(&AppEvent::UnknownCommand(
        ProtocolError::LengthMismatch {
            expected: 6,
            actual: 5
        }
    )));
}

#[test]
fn save_failure_keeps_in_memory_settings() {
    let mut rig = Rig::primed();
    rig.store.nvs().fail_writes = 2;

    rig.send(b"si0120");

    assert_eq!(rig.app.settings().picture_interval_s, 120);
    // Only a successful save moves the timestamp.
    assert_eq!(rig.app.settings().last_updated_at, 0);
    assert!(rig.sink.events.contains(&AppEvent::SaveFailed(StoreError::Io)));
    assert_eq!(rig.store.nvs().write_attempts, 3, "heal + first try + one retry");
    // Stored record is still the boot default.
    assert_eq!(rig.store.load().unwrap().picture_interval_s, 600);
}

#[test]
fn set_time_enables_gate_from_next_tick() {
    let mut rig = Rig::primed();
    assert!(!rig.app.time_authoritative());

    // Monday 20:00, outside the default 08:00–17:59 window.
    rig.send(b"st220024200000");
    assert!(rig.app.time_authoritative());
    assert_eq!(rig.replies.sent, ["Time set over NUS: Mon Jan 24 20:00:00 2022"]);
    assert_eq!(rig.hw.pulses(), 0);

    rig.hw.advance(3600);
    rig.poll();
    assert_eq!(rig.hw.pulses(), 0);

    // Tuesday 09:00: inside the window, interval long elapsed.
    rig.send(b"st220025090000");
    assert_eq!(rig.hw.pulses(), 1);
}

#[test]
fn set_time_normalises_day_zero() {
    let mut rig = Rig::primed();

    // February, day 00: the last day of January.
    rig.send(b"st220100120000");

    assert!(rig.app.time_authoritative());
    assert_eq!(rig.replies.sent, ["Time set over NUS: Mon Jan 31 12:00:00 2022"]);
    assert!(rig.sink.events.contains(&AppEvent::ClockSet(
        chrono::NaiveDate::from_ymd_opt(2022, 1, 31)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    )));
    // Monday noon is inside the window and the interval has long elapsed.
    assert_eq!(rig.hw.pulses(), 1);
}

#[test]
fn trigger_now_fires_and_status_reports_previous_counts() {
    let mut rig = Rig::primed();
    rig.send(b"tp");

    assert_eq!(rig.hw.pulses(), 1);
    assert_eq!(rig.app.counters().since_reset, 2);
    assert_eq!(rig.app.counters().since_last_command, 1);
    assert!(rig.sink.events.contains(&AppEvent::PictureTaken {
        source: TriggerSource::Remote,
        total: 2
    }));

    rig.replies.sent.clear();
    rig.send(b"gs");
    assert_eq!(rig.replies.sent[3], "Pictures 2 total, 1 since last command");
    assert_eq!(rig.app.counters().since_last_command, 0);
}

// ── Queue ─────────────────────────────────────────────────────

#[test]
fn overflow_keeps_oldest_frames_in_order() {
    let mut rig = Rig::primed();
    for minute in 1..=10u8 {
        let frame = format!("cs08{:02}", minute);
        rig.frames.push(frame.as_bytes());
    }
    assert_eq!(rig.frames.dropped(), 2);

    // One frame per iteration.
    rig.poll();
    assert_eq!(rig.frames.len(), 7);

    for _ in 0..7 {
        rig.poll();
    }
    assert!(rig.frames.is_empty());

    let expected: Vec<String> = (1..=8)
        .map(|m| format!("Picture start time at 8:{:02}", m))
        .collect();
    assert_eq!(rig.replies.sent, expected);
    assert_eq!(rig.app.settings().active_window.start_minute, 8);
}

// ── Scheduling and pulses ─────────────────────────────────────

#[test]
fn scheduler_throttles_to_interval() {
    let mut rig = Rig::primed();
    rig.send(b"si0060");
    assert_eq!(rig.hw.pulses(), 0);

    // Ten minutes of one-second ticks.  Each pulse also moves the clock
    // 0.8 s, so pictures land every 60.8 s after the one taken at boot.
    for _ in 0..600 {
        rig.hw.advance(1);
        rig.poll();
    }
    assert_eq!(rig.hw.pulses(), 10);
    for pair in rig.hw.shots.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= chrono::Duration::seconds(60), "gap {gap}");
    }
}

#[test]
fn sources_in_one_iteration_merge_into_one_pulse() {
    let mut rig = Rig::boot(MockNvs::new());
    rig.manual.raise();
    rig.frames.push(b"tp");

    rig.poll();

    assert_eq!(rig.hw.pulses(), 1);
    assert_eq!(rig.app.counters().since_reset, 1);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::PictureTaken { .. })),
        1
    );
    assert!(rig.sink.events.contains(&AppEvent::PictureTaken {
        source: TriggerSource::Button,
        total: 1
    }));
    assert!(rig.sink.events.contains(&AppEvent::Coalesced(TriggerSource::Remote)));
    assert!(rig.sink.events.contains(&AppEvent::Coalesced(TriggerSource::Schedule)));
}

#[test]
fn presses_during_pulse_are_coalesced() {
    let mut rig = Rig::primed();
    let flag = Arc::clone(&rig.manual);
    rig.hw.on_delay = Some(Box::new(move || flag.raise()));

    rig.send(b"tp");
    assert_eq!(rig.hw.pulses(), 1);
    assert!(!rig.manual.is_raised());
    assert!(rig.sink.events.contains(&AppEvent::Coalesced(TriggerSource::Button)));

    rig.hw.on_delay = None;
    rig.poll();
    assert_eq!(rig.hw.pulses(), 1);
}

#[test]
fn pulse_drives_focus_then_shutter_then_release() {
    use crate::mock_hw::ActuatorCall::*;

    let mut rig = Rig::primed();
    rig.manual.raise();
    rig.poll();

    assert_eq!(rig.hw.calls, [FocusOn, ShutterOn, FocusOff, ShutterOff]);
    assert_eq!(rig.hw.slept_ms, 800);
}
