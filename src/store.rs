//! Persisted settings record.
//!
//! [`SettingsStore`] layers a fixed-size, self-checking record on top of
//! any [`StoragePort`]:
//!
//! ```text
//!  offset  size  field
//!  ──────  ────  ─────────────────────────────────────────────
//!       0     4  format tag   0xA1A2A3A4 (LE)
//!       4     2  version      1 (LE)
//!       6     2  payload len  24 (LE)
//!       8    24  payload      postcard(Settings), fixed-width ints
//!      32     4  CRC32        ISO-HDLC over bytes 0..32 (LE)
//! ```
//!
//! A blob that fails any check is reported as
//! [`StoreError::Corrupt`]; the caller falls back to defaults and heals
//! the record with one write.

use crc::{CRC_32_ISO_HDLC, Crc};
use log::{debug, warn};

use crate::app::ports::{CorruptKind, SettingsPort, StorageError, StoragePort, StoreError};
use crate::config::Settings;

/// Storage namespace holding the settings record.
pub const NAMESPACE: &str = "lapsecam";
/// Key of the settings record inside [`NAMESPACE`].
pub const KEY: &str = "settings";

/// Format sentinel at the start of every record.
pub const FORMAT_TAG: u32 = 0xA1A2_A3A4;
/// Record layout version written by this firmware.
pub const FORMAT_VERSION: u16 = 1;

const HEADER_LEN: usize = 8;
const CRC_LEN: usize = 4;
/// Encoded size of [`Settings`].
pub const PAYLOAD_LEN: usize = 24;
/// Total size of one stored record.
pub const RECORD_LEN: usize = HEADER_LEN + PAYLOAD_LEN + CRC_LEN;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

// ═══════════════════════════════════════════════════════════════
//  Record codec
// ═══════════════════════════════════════════════════════════════

/// Serialise `settings` into one complete record.
pub fn encode_record(settings: &Settings) -> Result<[u8; RECORD_LEN], StoreError> {
    let mut record = [0u8; RECORD_LEN];

    let payload_len = postcard::to_slice(settings, &mut record[HEADER_LEN..HEADER_LEN + PAYLOAD_LEN])
        .map_err(|_| StoreError::Corrupt(CorruptKind::Payload))?
        .len();
    if payload_len != PAYLOAD_LEN {
        return Err(StoreError::Corrupt(CorruptKind::Payload));
    }

    record[0..4].copy_from_slice(&FORMAT_TAG.to_le_bytes());
    record[4..6].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
    record[6..8].copy_from_slice(&(PAYLOAD_LEN as u16).to_le_bytes());

    let crc = CRC32.checksum(&record[..HEADER_LEN + PAYLOAD_LEN]);
    record[HEADER_LEN + PAYLOAD_LEN..].copy_from_slice(&crc.to_le_bytes());
    Ok(record)
}

/// Validate and decode one stored record.
///
/// Checks run in order: size, format tag, version, payload length,
/// checksum, payload decode.  The first failure wins.
pub fn decode_record(bytes: &[u8]) -> Result<Settings, StoreError> {
    if bytes.len() != RECORD_LEN {
        return Err(StoreError::Corrupt(CorruptKind::Size(bytes.len())));
    }

    let tag = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if tag != FORMAT_TAG {
        return Err(StoreError::Corrupt(CorruptKind::FormatTag));
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != FORMAT_VERSION {
        return Err(StoreError::Corrupt(CorruptKind::Version(version)));
    }

    let payload_len = u16::from_le_bytes([bytes[6], bytes[7]]) as usize;
    if payload_len != PAYLOAD_LEN {
        return Err(StoreError::Corrupt(CorruptKind::Size(payload_len)));
    }

    let body = &bytes[..HEADER_LEN + PAYLOAD_LEN];
    let stored_crc = u32::from_le_bytes([bytes[32], bytes[33], bytes[34], bytes[35]]);
    if CRC32.checksum(body) != stored_crc {
        return Err(StoreError::Corrupt(CorruptKind::Checksum));
    }

    postcard::from_bytes(&bytes[HEADER_LEN..HEADER_LEN + PAYLOAD_LEN])
        .map_err(|_| StoreError::Corrupt(CorruptKind::Payload))
}

// ═══════════════════════════════════════════════════════════════
//  Store
// ═══════════════════════════════════════════════════════════════

/// [`SettingsPort`] implementation over a key-value [`StoragePort`].
pub struct SettingsStore<S: StoragePort> {
    storage: S,
}

impl<S: StoragePort> SettingsStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Raw stored blob, truncated one byte past a full record so an
    /// oversized blob is still detectable.
    fn read_raw(&self, buf: &mut [u8; RECORD_LEN + 1]) -> Result<usize, StoreError> {
        self.storage
            .read(NAMESPACE, KEY, buf)
            .map_err(|e| match e {
                StorageError::NotFound => StoreError::NotFound,
                StorageError::Full | StorageError::IoError => StoreError::Io,
            })
    }
}

impl<S: StoragePort> SettingsPort for SettingsStore<S> {
    fn load(&self) -> Result<Settings, StoreError> {
        let mut buf = [0u8; RECORD_LEN + 1];
        let len = self.read_raw(&mut buf)?;
        decode_record(&buf[..len])
    }

    fn save(&mut self, settings: &Settings) -> Result<(), StoreError> {
        let record = encode_record(settings)?;

        // Identical content already on flash: spare the write cycle.
        let mut current = [0u8; RECORD_LEN + 1];
        if let Ok(len) = self.read_raw(&mut current) {
            if current[..len] == record[..] {
                debug!("SettingsStore: record unchanged, write skipped");
                return Ok(());
            }
        }

        if let Err(first) = self.storage.write(NAMESPACE, KEY, &record) {
            warn!("SettingsStore: write failed ({}), retrying once", first);
            self.storage
                .write(NAMESPACE, KEY, &record)
                .map_err(|_| StoreError::Io)?;
        }
        Ok(())
    }

    fn erase(&mut self) -> Result<(), StoreError> {
        self.storage
            .delete(NAMESPACE, KEY)
            .map_err(|_| StoreError::Io)
    }
}
