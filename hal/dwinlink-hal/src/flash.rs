//! Settings storage abstractions
//!
//! Provides a blocking key-value store for the few values the panel persists
//! (Z-offset, language, volume, preheat presets). Boards back it with EEPROM
//! emulation or a flash sector.

/// Storage keys for persisted data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Panel settings (binary postcard format)
    PanelSettings = 0,
}

impl StorageKey {
    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::PanelSettings),
            _ => None,
        }
    }
}

/// Errors from settings storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Underlying device reported a failure
    Io,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Storage is full
    Full,
}

/// Blocking settings storage
///
/// Writes happen only on explicit user actions (Z-offset change, language or
/// volume selection), never from the periodic update path.
pub trait SettingsStorage {
    /// Read a value by key into the provided buffer
    ///
    /// Returns the number of bytes read.
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError>;

    /// Replace the value stored under `key`
    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError>;
}
