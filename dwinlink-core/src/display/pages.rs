//! Page and icon numbering
//!
//! The panel firmware ships two copies of every page and icon: one with
//! Chinese text and one with English text. The English icons sit
//! `ICON_SET_OFFSET` above the Chinese ones; page numbers have no fixed
//! relation, so each page carries both.

use dwinlink_protocol::address::ICON_SET_OFFSET;

use crate::config::Language;
use crate::state::AxisUnit;

/// Pages the coordinator switches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Page {
    Main,
    FileList,
    /// Re-heating before a paused job resumes
    ResumeHeating,
    /// Hotend back at temperature, confirm resume
    ResumeReady,
    Heating,
    Printing,
    Paused,
    TempFanOn,
    TempFanOff,
    Tools,
    Leveling,
    Filament,
    /// Nozzle too cold for load/unload
    FilamentHeatPrompt,
    FilamentHeating,
    AssistLevel,
    MoveAxis(AxisUnit),
    Autohome,
    PowerLossResume,
    NoFilament,
    AutoLevelWait,
    /// Pause or stop in progress
    Stopping,
}

impl Page {
    /// Page number for the selected language
    pub fn number(self, language: Language) -> u8 {
        let (chinese, english) = match self {
            Page::Main => (1, 45),
            Page::FileList => (2, 46),
            Page::ResumeHeating => (7, 82),
            Page::ResumeReady => (8, 83),
            Page::Heating => (10, 52),
            Page::Printing => (11, 53),
            Page::Paused => (12, 54),
            Page::TempFanOn => (15, 57),
            Page::TempFanOff => (16, 58),
            Page::Tools => (21, 63),
            Page::Leveling => (22, 64),
            Page::Filament => (23, 65),
            Page::FilamentHeatPrompt => (24, 66),
            Page::FilamentHeating => (26, 68),
            Page::AssistLevel => (28, 84),
            Page::MoveAxis(unit) => (29 + unit.page_offset(), 71 + unit.page_offset()),
            Page::Autohome => (32, 74),
            Page::PowerLossResume => (36, 76),
            Page::NoFilament => (38, 78),
            Page::AutoLevelWait => (43, 85),
            Page::Stopping => (86, 87),
        };
        match language {
            Language::Chinese => chinese,
            Language::English => english,
        }
    }

    /// Temperature page matching the fan state
    pub fn temperature(fan_on: bool) -> Self {
        if fan_on {
            Page::TempFanOn
        } else {
            Page::TempFanOff
        }
    }
}

/// Print status icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StatusIcon {
    Ready = 0,
    Heating = 1,
    Paused = 4,
    CardRemoved = 6,
    Cooling = 8,
}

impl StatusIcon {
    /// Icon index for the selected language
    pub fn index(self, language: Language) -> u8 {
        icon(self as u8, language)
    }
}

/// Shift an icon index into the language's icon set
pub fn icon(index: u8, language: Language) -> u8 {
    match language {
        Language::Chinese => index,
        Language::English => index + ICON_SET_OFFSET,
    }
}
