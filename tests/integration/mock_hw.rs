//! Mock adapters for integration tests.
//!
//! Records every actuator edge, runs a simulated wall clock that the
//! pulse delays advance, and offers a storage backend with injectable
//! write failures.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use embedded_hal::delay::DelayNs;
use lapsecam::app::events::AppEvent;
use lapsecam::app::ports::{
    ActuatorPort, ClockPort, EventSink, ReplyPort, SettingsPort, StorageError, StoragePort,
    StoreError,
};
use lapsecam::config::Settings;
use lapsecam::store::SettingsStore;
use std::collections::HashMap;

/// Monday 2022-01-24 at `hh:mm:00`.
#[allow(dead_code)]
pub fn monday(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 1, 24)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    FocusOn,
    FocusOff,
    ShutterOn,
    ShutterOff,
}

// ── MockHardware ──────────────────────────────────────────────

/// Clock + actuator + delay in one value, like the real `HardwareAdapter`.
pub struct MockHardware {
    pub now: NaiveDateTime,
    pub calls: Vec<ActuatorCall>,
    /// Clock reading at every shutter engagement.
    pub shots: Vec<NaiveDateTime>,
    pub slept_ms: u64,
    /// Runs on every delay, i.e. while a pulse is in flight.
    pub on_delay: Option<Box<dyn FnMut()>>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now,
            calls: Vec::new(),
            shots: Vec::new(),
            slept_ms: 0,
            on_delay: None,
        }
    }

    /// Completed pulses, counted by shutter engagements.
    pub fn pulses(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == ActuatorCall::ShutterOn)
            .count()
    }

    pub fn advance(&mut self, secs: i64) {
        self.now += Duration::seconds(secs);
    }
}

impl ClockPort for MockHardware {
    fn now(&self) -> NaiveDateTime {
        self.now
    }

    fn set(&mut self, at: NaiveDateTime) {
        self.now = at;
    }
}

impl ActuatorPort for MockHardware {
    fn engage_focus(&mut self) {
        self.calls.push(ActuatorCall::FocusOn);
    }

    fn disengage_focus(&mut self) {
        self.calls.push(ActuatorCall::FocusOff);
    }

    fn engage_shutter(&mut self) {
        self.calls.push(ActuatorCall::ShutterOn);
        self.shots.push(self.now);
    }

    fn disengage_shutter(&mut self) {
        self.calls.push(ActuatorCall::ShutterOff);
    }
}

impl DelayNs for MockHardware {
    fn delay_ns(&mut self, ns: u32) {
        let ms = u64::from(ns / 1_000_000);
        self.slept_ms += ms;
        self.now += Duration::milliseconds(ms as i64);
        if let Some(hook) = self.on_delay.as_mut() {
            hook();
        }
    }
}

// ── MockNvs ───────────────────────────────────────────────────

/// In-memory key-value store that counts writes and can fail them.
pub struct MockNvs {
    store: HashMap<String, Vec<u8>>,
    pub write_attempts: usize,
    /// The next N writes fail with `IoError`.
    pub fail_writes: usize,
}

#[allow(dead_code)]
impl MockNvs {
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
            write_attempts: 0,
            fail_writes: 0,
        }
    }

    pub fn raw(&self, namespace: &str, key: &str) -> Option<&Vec<u8>> {
        self.store.get(&format!("{}::{}", namespace, key))
    }

    pub fn raw_mut(&mut self, namespace: &str, key: &str) -> Option<&mut Vec<u8>> {
        self.store.get_mut(&format!("{}::{}", namespace, key))
    }
}

impl Default for MockNvs {
    fn default() -> Self {
        Self::new()
    }
}

impl StoragePort for MockNvs {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.store.get(&format!("{}::{}", namespace, key)) {
            Some(v) => {
                let n = v.len().min(buf.len());
                buf[..n].copy_from_slice(&v[..n]);
                Ok(n)
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.write_attempts += 1;
        if self.fail_writes > 0 {
            self.fail_writes -= 1;
            return Err(StorageError::IoError);
        }
        self.store
            .insert(format!("{}::{}", namespace, key), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.remove(&format!("{}::{}", namespace, key));
        Ok(())
    }
}

// ── CountingStore ─────────────────────────────────────────────

/// Real `SettingsStore` over `MockNvs`, counting `save()` calls.
pub struct CountingStore {
    pub inner: SettingsStore<MockNvs>,
    pub saves: usize,
}

#[allow(dead_code)]
impl CountingStore {
    pub fn new(nvs: MockNvs) -> Self {
        Self {
            inner: SettingsStore::new(nvs),
            saves: 0,
        }
    }

    pub fn nvs(&mut self) -> &mut MockNvs {
        self.inner.storage_mut()
    }
}

impl SettingsPort for CountingStore {
    fn load(&self) -> Result<Settings, StoreError> {
        self.inner.load()
    }

    fn save(&mut self, settings: &Settings) -> Result<(), StoreError> {
        self.saves += 1;
        self.inner.save(settings)
    }

    fn erase(&mut self) -> Result<(), StoreError> {
        self.inner.erase()
    }
}

// ── MockReplies ───────────────────────────────────────────────

pub struct MockReplies {
    pub subscribed: bool,
    pub sent: Vec<String>,
}

#[allow(dead_code)]
impl MockReplies {
    pub fn subscribed() -> Self {
        Self {
            subscribed: true,
            sent: Vec::new(),
        }
    }
}

impl ReplyPort for MockReplies {
    fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    fn send(&mut self, reply: &str) {
        self.sent.push(reply.to_string());
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
