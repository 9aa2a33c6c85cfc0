//! User settings persistence
//!
//! Values the user changes from the touchscreen (Z offset, language, volume,
//! leveling, presets) are kept in one postcard blob under
//! [`StorageKey::PanelSettings`].

use dwinlink_hal::{SettingsStorage, StorageError, StorageKey};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::{PanelConfig, PreheatPreset};

/// Largest serialized settings blob
pub const MAX_SETTINGS_SIZE: usize = 64;

/// Blob layout version, bumped when fields change
pub const SETTINGS_VERSION: u8 = 1;

/// Settings persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Stored bytes could not be decoded
    Deserialize,
    /// Settings did not fit the buffer
    Serialize,
    /// Storage backend failed
    Storage(StorageError),
    /// TOML text could not be parsed
    Toml,
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        ConfigError::Storage(e)
    }
}

/// Display language, which also selects the page and icon set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Language {
    Chinese,
    #[default]
    English,
}

impl Language {
    /// Decode the language button value, zero selects English
    pub fn from_wire(value: u16) -> Self {
        if value == 0 {
            Language::English
        } else {
            Language::Chinese
        }
    }
}

/// Settings changed from the touchscreen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelSettings {
    /// Layout version
    pub version: u8,
    /// Z probe offset (hundredths of a mm)
    pub z_offset: i16,
    pub language: Language,
    /// Buzzer volume 0..=255
    pub volume: u8,
    /// Mesh compensation enabled
    pub leveling_enabled: bool,
    pub pla: PreheatPreset,
    pub abs: PreheatPreset,
}

impl PanelSettings {
    /// Factory settings for a machine
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            version: SETTINGS_VERSION,
            z_offset: 0,
            language: Language::English,
            volume: 0x20,
            leveling_enabled: true,
            pla: config.pla,
            abs: config.abs,
        }
    }

    /// Load settings, falling back to factory values
    pub fn load<S: SettingsStorage + ?Sized>(storage: &mut S, config: &PanelConfig) -> Self {
        match Self::load_inner(storage) {
            Ok(settings) if settings.version == SETTINGS_VERSION => {
                debug!("loaded panel settings");
                settings
            }
            Ok(_) => {
                warn!("settings layout changed, using defaults");
                Self::new(config)
            }
            Err(ConfigError::Storage(StorageError::NotFound)) => {
                debug!("no stored settings, using defaults");
                Self::new(config)
            }
            Err(e) => {
                warn!("failed to load settings: {:?}, using defaults", e);
                Self::new(config)
            }
        }
    }

    #[cfg(feature = "serde")]
    fn load_inner<S: SettingsStorage + ?Sized>(storage: &mut S) -> Result<Self, ConfigError> {
        let mut buffer = [0u8; MAX_SETTINGS_SIZE];
        let len = storage.read(StorageKey::PanelSettings, &mut buffer)?;
        postcard::from_bytes(&buffer[..len]).map_err(|_| ConfigError::Deserialize)
    }

    #[cfg(not(feature = "serde"))]
    fn load_inner<S: SettingsStorage + ?Sized>(_storage: &mut S) -> Result<Self, ConfigError> {
        Err(ConfigError::Storage(StorageError::NotFound))
    }

    /// Persist the settings
    #[cfg(feature = "serde")]
    pub fn save<S: SettingsStorage + ?Sized>(&self, storage: &mut S) -> Result<(), ConfigError> {
        let mut buffer = [0u8; MAX_SETTINGS_SIZE];
        let bytes = postcard::to_slice(self, &mut buffer).map_err(|_| ConfigError::Serialize)?;
        debug!("saving {} bytes of settings", bytes.len());
        storage.write(StorageKey::PanelSettings, bytes)?;
        Ok(())
    }

    /// Without serde support the settings live only in RAM
    #[cfg(not(feature = "serde"))]
    pub fn save<S: SettingsStorage + ?Sized>(&self, _storage: &mut S) -> Result<(), ConfigError> {
        Ok(())
    }
}
