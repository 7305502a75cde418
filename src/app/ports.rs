//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (clock, actuator, storage, reply channel, event sink)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and every path runs on the host under test.

use chrono::NaiveDateTime;

use crate::config::Settings;

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: RTC ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Wall-clock source.
///
/// `now()` is decomposed into weekday/hour/minute by the scheduler, so a
/// `set()` changes gate evaluation from the very next tick.
pub trait ClockPort {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    /// Set the wall clock.  Affects only future `now()` calls.
    fn set(&mut self, at: NaiveDateTime);
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → camera remote lines)
// ───────────────────────────────────────────────────────────────

/// Two output lines wired to the camera's remote port.
///
/// Each call is a single level edge.  Polarity is the adapter's concern;
/// the pulse timing between edges belongs to the
/// [`TriggerSequencer`](crate::sequencer::TriggerSequencer).
pub trait ActuatorPort {
    fn engage_focus(&mut self);
    fn disengage_focus(&mut self);
    fn engage_shutter(&mut self);
    fn disengage_shutter(&mut self);

    /// Drive both lines idle.
    fn release_all(&mut self) {
        self.disengage_focus();
        self.disengage_shutter();
    }
}

// ───────────────────────────────────────────────────────────────
// Reply port (driven adapter: domain → command channel)
// ───────────────────────────────────────────────────────────────

/// Outbound half of the command channel.
pub trait ReplyPort {
    /// Whether a remote client has enabled notifications.
    fn is_subscribed(&self) -> bool;

    /// Send one reply unit.  Only called while subscribed.
    fn send(&mut self, reply: &str);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Settings port (driven adapter: domain ↔ persisted record)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the [`Settings`] record as one unit.
///
/// Implementations never return a partially decoded record: anything that
/// fails the size, format-tag, version or checksum checks is
/// [`StoreError::Corrupt`].
pub trait SettingsPort {
    /// Last successfully saved settings.
    fn load(&self) -> Result<Settings, StoreError>;

    /// Write the complete record.  Safe to repeat with identical content.
    fn save(&mut self, settings: &Settings) -> Result<(), StoreError>;

    /// Remove the record; the next `load()` returns [`StoreError::NotFound`].
    fn erase(&mut self) -> Result<(), StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value blob storage.
///
/// Write operations MUST be atomic, with no partial writes on power loss.
/// The ESP-IDF NVS API guarantees this natively; the in-memory
/// simulation achieves it trivially.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`SettingsPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// No record has ever been written (or it was erased).
    NotFound,
    /// A record exists but cannot be trusted.
    Corrupt(CorruptKind),
    /// The underlying medium failed.
    Io,
}

/// Which integrity check a stored record failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptKind {
    /// Stored blob is not exactly one record long.
    Size(usize),
    /// Format sentinel does not match.
    FormatTag,
    /// Layout version this firmware does not understand.
    Version(u16),
    /// CRC32 over header and payload does not match.
    Checksum,
    /// Payload passed the checksum but does not decode.
    Payload,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "no settings record"),
            Self::Corrupt(kind) => write!(f, "settings record corrupt ({})", kind),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for CorruptKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Size(len) => write!(f, "size {}", len),
            Self::FormatTag => write!(f, "format tag"),
            Self::Version(v) => write!(f, "version {}", v),
            Self::Checksum => write!(f, "checksum"),
            Self::Payload => write!(f, "payload"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
