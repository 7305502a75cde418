//! BLE command channel adapter.
//!
//! The edge between the wireless transport and the core loop.  The GATT
//! server (Nordic UART Service layout, so existing controllers connect
//! unchanged) calls the `on_*` hooks from its own task; the core loop
//! sees only the [`FrameQueue`] and the [`ReplyPort`].
//!
//! ## GATT Service Layout
//!
//! | Characteristic | UUID                                   | Perms        |
//! |----------------|----------------------------------------|--------------|
//! | RX (commands)  | `6e400002-b5a3-f393-e0a9-e50e24dcca9e` | Write        |
//! | TX (replies)   | `6e400003-b5a3-f393-e0a9-e50e24dcca9e` | Notify       |
//!
//! Every hook takes `&self` and touches only atomics and lock-free
//! channels, so one `static` instance is shared by both contexts.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, info, warn};

use crate::app::ports::ReplyPort;
use crate::events::FrameQueue;
use crate::protocol::Reply;

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

pub const SERVICE_UUID: u128 = 0x6e400001_b5a3_f393_e0a9_e50e24dcca9e;
pub const CHAR_RX: u128 = 0x6e400002_b5a3_f393_e0a9_e50e24dcca9e;
pub const CHAR_TX: u128 = 0x6e400003_b5a3_f393_e0a9_e50e24dcca9e;

/// Replies buffered for the transport between notifications.
const REPLY_DEPTH: usize = 8;

// ───────────────────────────────────────────────────────────────
// BLE state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BleState {
    Idle = 0,
    Advertising = 1,
    Connected = 2,
}

impl BleState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Advertising,
            2 => Self::Connected,
            _ => Self::Idle,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Command channel
// ───────────────────────────────────────────────────────────────

pub struct BleCommandChannel {
    inbox: FrameQueue,
    outbox: Channel<CriticalSectionRawMutex, Reply, REPLY_DEPTH>,
    subscribed: AtomicBool,
    state: AtomicU8,
}

impl BleCommandChannel {
    pub const fn new() -> Self {
        Self {
            inbox: FrameQueue::new(),
            outbox: Channel::new(),
            subscribed: AtomicBool::new(false),
            state: AtomicU8::new(BleState::Idle as u8),
        }
    }

    /// Inbound frames for the core loop.
    pub fn inbox(&self) -> &FrameQueue {
        &self.inbox
    }

    pub fn state(&self) -> BleState {
        BleState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed.load(Ordering::Acquire)
    }

    // ── Transport-side hooks ──────────────────────────────────

    pub fn on_advertising(&self) {
        self.state.store(BleState::Advertising as u8, Ordering::Release);
        info!("BLE: advertising");
    }

    pub fn on_connected(&self) {
        self.state.store(BleState::Connected as u8, Ordering::Release);
        info!("BLE: central connected");
    }

    /// Link dropped: notifications stop and undelivered replies are discarded.
    /// Frames already queued are still processed.
    pub fn on_disconnected(&self) {
        self.subscribed.store(false, Ordering::Release);
        self.outbox.clear();
        self.state.store(BleState::Advertising as u8, Ordering::Release);
        info!("BLE: central disconnected");
    }

    /// CCCD write on the TX characteristic.
    pub fn on_subscribe(&self, enabled: bool) {
        self.subscribed.store(enabled, Ordering::Release);
        debug!("BLE: notifications {}", if enabled { "on" } else { "off" });
    }

    /// Write on the RX characteristic.  Never blocks.
    pub fn on_write(&self, data: &[u8]) {
        if !self.inbox.push(data) {
            warn!(
                "BLE: frame queue full, frame dropped ({} total)",
                self.inbox.dropped()
            );
        }
    }

    /// Next reply to notify on TX, if any.
    pub fn next_notification(&self) -> Option<Reply> {
        self.outbox.try_receive().ok()
    }

    fn enqueue_reply(&self, reply: &str) {
        let mut unit = Reply::new();
        if unit.push_str(reply).is_err() {
            warn!("BLE: reply longer than {} bytes dropped", unit.capacity());
            return;
        }
        if self.outbox.try_send(unit).is_err() {
            warn!("BLE: reply queue full, reply dropped");
        }
    }
}

impl Default for BleCommandChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// The core loop holds a shared reference; sending never needs exclusivity.
impl ReplyPort for &BleCommandChannel {
    fn is_subscribed(&self) -> bool {
        BleCommandChannel::is_subscribed(self)
    }

    fn send(&mut self, reply: &str) {
        self.enqueue_reply(reply);
    }
}
