//! Cross-cutting panel state
//!
//! Everything the handlers and the periodic updater share lives here instead
//! of in loose flags. Only the coordinator mutates it.

use heapless::String;

use super::phase::{FilamentEvent, FilamentPhase, PrintEvent, PrintPhase};
use super::wait::WaitTracker;

/// Longest queued start command (`M23 ` plus an 8.3 name)
pub const MAX_COMMAND_LEN: usize = 24;

/// Last value of the startup progress bar
pub const STARTUP_END: u16 = 200;

/// Jog step selected on the move page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisUnit {
    #[default]
    Ten,
    One,
    Tenth,
}

impl AxisUnit {
    pub fn from_wire(value: u16) -> Self {
        match value {
            1 => AxisUnit::One,
            2 => AxisUnit::Tenth,
            _ => AxisUnit::Ten,
        }
    }

    /// Page offset of the move page for this unit
    pub fn page_offset(self) -> u8 {
        self as u8
    }
}

/// Nozzle heat gate for the filament page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeatGate {
    /// Heating was confirmed for a pending load/unload
    pub load_confirmed: bool,
    /// The heat prompt is showing
    pub prompted: bool,
    /// Re-heating after a paused job before resuming
    pub resume_warming: bool,
}

/// Extruder move held back until the nozzle is hot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingExtrude {
    pub extruder: u8,
    /// Signed length in tenths of a mm
    pub tenths: i32,
}

/// Values last written to the display by the periodic updater
///
/// Periodic pushes are skipped while the value is unchanged. Handlers that
/// write one of these variables record it here as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Echoed {
    pub z_offset: Option<i16>,
    pub hotend: Option<i16>,
    pub bed: Option<i16>,
    pub leveling_icon: Option<u32>,
    /// Hours and minutes
    pub elapsed: Option<(u32, u32)>,
    pub remaining: Option<(u32, u32)>,
}

/// Startup animation progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Startup {
    /// 0..=STARTUP_END
    pub progress: u16,
    pub done: bool,
}

/// State shared by the handlers and the updater
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorState {
    pub(crate) wait: WaitTracker,
    pub(crate) phase: PrintPhase,
    pub(crate) filament: FilamentPhase,
    /// Card removal stops the job
    pub(crate) card_check: bool,
    /// Runout sensor is sampled
    pub(crate) runout_watch: bool,
    pub(crate) runout_samples: u8,
    /// Periodic updater is allowed to run
    pub(crate) info_showing: bool,
    /// Elapsed time and progress are pushed
    pub(crate) progress_showing: bool,
    /// Part fan switched on from the panel
    pub(crate) fan_on: bool,
    pub(crate) power_saving: bool,
    /// Autohome animation frame, `None` when not homing
    pub(crate) autohome_icon: Option<u8>,
    pub(crate) axis_unit: AxisUnit,
    /// Load/unload length per extruder (tenths of a mm)
    pub(crate) filament_amount: [u16; 2],
    pub(crate) heat: HeatGate,
    /// Hotend target saved when pausing
    pub(crate) paused_hotend: i16,
    /// Target the filament heat prompt asks for
    pub(crate) preheat_hotend: i16,
    pub(crate) pending_extrude: Option<PendingExtrude>,
    /// `M23` line held back by a failed filament check
    pub(crate) pending_start: String<MAX_COMMAND_LEN>,
    /// Cache index of the file being printed
    pub(crate) printing_file: Option<usize>,
    pub(crate) startup: Startup,
    /// Added to the update interval while a page refreshes itself
    pub(crate) extra_delay: bool,
    pub(crate) echoed: Echoed,
    pub(crate) last_targets: (i16, i16),
    pub(crate) last_percent: Option<u8>,
    pub(crate) next_update_ms: u64,
    /// Last sampled card detect state
    pub(crate) card_present: bool,
    /// File list page wants a full redraw
    pub(crate) refresh_list: bool,
    /// Resume-warming animation frame
    pub(crate) warm_frame: u8,
    /// Power-loss prompt was answered or not needed
    pub(crate) recovery_handled: bool,
}

impl Default for CoordinatorState {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinatorState {
    pub fn new() -> Self {
        Self {
            wait: WaitTracker::new(),
            phase: PrintPhase::Ready,
            filament: FilamentPhase::Idle,
            card_check: false,
            runout_watch: false,
            runout_samples: 0,
            info_showing: true,
            progress_showing: false,
            fan_on: false,
            power_saving: true,
            autohome_icon: None,
            axis_unit: AxisUnit::Ten,
            filament_amount: [100, 100],
            heat: HeatGate::default(),
            paused_hotend: 0,
            preheat_hotend: 0,
            pending_extrude: None,
            pending_start: String::new(),
            printing_file: None,
            startup: Startup::default(),
            extra_delay: false,
            echoed: Echoed::default(),
            last_targets: (0, 0),
            last_percent: None,
            next_update_ms: 0,
            card_present: false,
            refresh_list: false,
            warm_frame: 0,
            recovery_handled: false,
        }
    }

    pub fn phase(&self) -> PrintPhase {
        self.phase
    }

    pub fn filament_phase(&self) -> FilamentPhase {
        self.filament
    }

    pub fn wait(&self) -> &WaitTracker {
        &self.wait
    }

    pub fn card_check_enabled(&self) -> bool {
        self.card_check
    }

    pub fn runout_watch(&self) -> bool {
        self.runout_watch
    }

    pub fn fan_on(&self) -> bool {
        self.fan_on
    }

    pub fn paused_hotend(&self) -> i16 {
        self.paused_hotend
    }

    pub fn startup_done(&self) -> bool {
        self.startup.done
    }

    /// Apply a print event, logging real transitions
    pub(crate) fn apply(&mut self, event: PrintEvent) {
        let next = self.phase.transition(event);
        if next != self.phase {
            debug!("phase {:?} -> {:?}", self.phase, next);
        }
        self.phase = next;
    }

    pub(crate) fn apply_filament(&mut self, event: FilamentEvent) {
        let next = self.filament.transition(event);
        if next != self.filament {
            debug!("filament {:?} -> {:?}", self.filament, next);
        }
        self.filament = next;
    }

    /// Arm the runout sensor with a fresh debounce count
    pub(crate) fn arm_runout(&mut self, armed: bool) {
        self.runout_watch = armed;
        self.runout_samples = 0;
    }
}
