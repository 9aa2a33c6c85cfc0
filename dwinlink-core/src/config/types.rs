//! Panel configuration types
//!
//! `PanelConfig` describes the machine the panel is fitted to. It is fixed at
//! build time or parsed from TOML on boards that carry an allocator; it is
//! never changed from the touchscreen.

use heapless::String;

use crate::files::{MAX_DISPLAY_LEN, MAX_FILES};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum length of the info strings shown on the about page
pub const MAX_INFO_LEN: usize = 32;

/// Hotend and bed targets for a material preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PreheatPreset {
    /// Hotend target (°C)
    pub hotend: i16,
    /// Bed target (°C)
    pub bed: i16,
}

impl PreheatPreset {
    pub const PLA: Self = Self {
        hotend: 200,
        bed: 60,
    };
    pub const ABS: Self = Self {
        hotend: 240,
        bed: 100,
    };
}

/// Travel range of one axis in tenths of a millimetre
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisLimits {
    pub min: i32,
    pub max: i32,
}

impl AxisLimits {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Clamp a target into the travel range
    pub fn clamp(&self, tenths: i32) -> i32 {
        tenths.clamp(self.min, self.max)
    }
}

/// Static panel and machine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PanelConfig {
    /// Base period of the periodic updater (ms)
    pub update_interval_ms: u32,
    /// Extra delay added while a page with its own refresh is showing (ms)
    pub busy_extra_delay_ms: u32,
    /// File slots on the list page
    pub max_files: u8,
    /// Width of a text variable in bytes
    pub text_width: u8,
    /// Lowest accepted Z probe offset (hundredths of a mm)
    pub z_offset_min: i16,
    /// Highest accepted Z probe offset (hundredths of a mm)
    pub z_offset_max: i16,
    /// Z microsteps per millimetre for babystepping
    pub babystep_steps_per_mm: i32,
    pub x_limits: AxisLimits,
    pub y_limits: AxisLimits,
    pub z_limits: AxisLimits,
    /// Preset used until settings are saved
    pub pla: PreheatPreset,
    pub abs: PreheatPreset,
    /// Default load/unload length (mm)
    pub filament_amount_mm: u16,
    /// Delay after every transmitted byte (µs)
    pub byte_pacing_us: u32,
    /// Idle updates before a stuck wait is released
    pub wait_stall_ticks: u16,
    /// Consecutive runout samples before pausing
    pub runout_debounce: u8,
    /// Hotend temperature that ends the cooling phase (°C)
    pub cool_threshold_c: i16,
    pub machine_name: String<MAX_INFO_LEN>,
    pub firmware_version: String<MAX_INFO_LEN>,
    pub printer_size: String<MAX_INFO_LEN>,
    pub website: String<MAX_INFO_LEN>,
}

fn info(text: &str) -> String<MAX_INFO_LEN> {
    let mut s = String::new();
    for c in text.chars() {
        if s.push(c).is_err() {
            break;
        }
    }
    s
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 2000,
            busy_extra_delay_ms: 2000,
            max_files: 20,
            text_width: 20,
            z_offset_min: -2000,
            z_offset_max: 2000,
            babystep_steps_per_mm: 400,
            x_limits: AxisLimits::new(0, 3000),
            y_limits: AxisLimits::new(0, 3000),
            z_limits: AxisLimits::new(0, 4000),
            pla: PreheatPreset::PLA,
            abs: PreheatPreset::ABS,
            filament_amount_mm: 10,
            byte_pacing_us: 1,
            wait_stall_ticks: 100,
            runout_debounce: 50,
            cool_threshold_c: 50,
            machine_name: info("CR-10S Pro"),
            firmware_version: info("1.0.0"),
            printer_size: info("300 X 300 X 400"),
            website: info("www.creality.com"),
        }
    }
}

impl PanelConfig {
    /// Limits for a jog axis
    pub fn limits(&self, axis: crate::traits::Axis) -> AxisLimits {
        match axis {
            crate::traits::Axis::X => self.x_limits,
            crate::traits::Axis::Y => self.y_limits,
            crate::traits::Axis::Z | crate::traits::Axis::E => self.z_limits,
        }
    }

    /// Check that a Z offset (hundredths) is inside the probe range
    pub fn z_offset_in_range(&self, hundredths: i32) -> bool {
        (i32::from(self.z_offset_min)..=i32::from(self.z_offset_max)).contains(&hundredths)
    }

    /// Clamp sizes to what the file cache and text buffers can hold
    ///
    /// The slot range the classifier accepts follows `max_files`, so it must
    /// never exceed the cache capacity.
    pub fn clamped(mut self) -> Self {
        let max_files = self.max_files.min(MAX_FILES as u8);
        if max_files != self.max_files {
            warn!("max_files {} limited to {}", self.max_files, max_files);
            self.max_files = max_files;
        }
        self.text_width = self.text_width.min(MAX_DISPLAY_LEN as u8);
        self
    }

    /// Parse a configuration from TOML text
    ///
    /// Missing keys keep their defaults.
    #[cfg(feature = "toml")]
    pub fn from_toml(text: &str) -> Result<Self, super::ConfigError> {
        toml::from_str::<Self>(text)
            .map(Self::clamped)
            .map_err(|_| super::ConfigError::Toml)
    }
}
