//! Panel coordinator
//!
//! The coordinator is the single owner of the display link and the panel
//! state. Once per main-loop tick it:
//! - Follows card insertion and removal
//! - Samples the runout sensor
//! - Resolves pending waits
//! - Runs the periodic updater
//! - Reads at most one touch frame and dispatches it by category
//!
//! Handlers live in one file per page group; they all extend [`Panel`].

mod card;
mod filament;
mod motion;
mod print;
mod system;
mod temperature;
mod updater;

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use heapless::String;

use dwinlink_hal::Uart;
use dwinlink_protocol::address::Z_OFFSET_ADDR;
use dwinlink_protocol::{classify, Category, Frame, FrameReceiver, ReceiveStats};

use crate::config::{PanelConfig, PanelSettings};
use crate::display::{DisplayLink, Page, StatusIcon};
use crate::files::FileListCache;
use crate::state::{
    CoordinatorState, FilamentEvent, MachineIdle, WaitOutcome, WaitReason, MAX_COMMAND_LEN,
};
use crate::traits::Printer;

/// Touchscreen panel bound to one display UART
pub struct Panel<U, D> {
    /// Outbound frames
    link: DisplayLink<U, D>,
    /// Inbound frame assembly
    receiver: FrameReceiver,
    /// Shared handler and updater state
    state: CoordinatorState,
    /// Printable files on the card
    files: FileListCache,
    /// Board configuration
    config: PanelConfig,
    /// Persisted user settings
    settings: PanelSettings,
}

impl<U: Uart, D: DelayNs> Panel<U, D> {
    /// Create a panel on `port`, pacing bytes with `delay`
    pub fn new(port: U, delay: D, config: PanelConfig) -> Self {
        let config = config.clamped();
        let settings = PanelSettings::new(&config);
        Self {
            link: DisplayLink::new(port, delay, config.byte_pacing_us),
            receiver: FrameReceiver::new(),
            state: CoordinatorState::new(),
            files: FileListCache::new(),
            config,
            settings,
        }
    }

    /// Get the coordinator state
    pub fn state(&self) -> &CoordinatorState {
        &self.state
    }

    /// Get the cached file list
    pub fn files(&self) -> &FileListCache {
        &self.files
    }

    /// Get the persisted settings
    pub fn settings(&self) -> &PanelSettings {
        &self.settings
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn link(&self) -> &DisplayLink<U, D> {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut DisplayLink<U, D> {
        &mut self.link
    }

    /// Receive counters
    pub fn receive_stats(&self) -> ReceiveStats {
        self.receiver.stats()
    }

    /// One main-loop tick
    pub fn update<P: Printer>(&mut self, printer: &mut P, now_ms: u64) {
        self.refresh_card(printer);
        self.sample_runout(printer);
        self.resolve_wait(printer);
        self.run_updater(printer, now_ms);

        match self.receiver.poll(self.link.port_mut()) {
            Ok(Some(frame)) => self.handle_frame(printer, &frame),
            Ok(None) => {}
            Err(_) => warn!("display rx error"),
        }
    }

    /// Hook for the firmware's runout interrupt
    pub fn on_filament_runout<P: Printer>(&mut self, printer: &mut P) {
        if !self.state.runout_watch {
            debug!("runout ignored, watch off");
            return;
        }
        if !printer.card_printing() && !printer.has_commands() {
            debug!("runout ignored, nothing printing");
            return;
        }
        self.runout_pause(printer);
    }

    /// Dispatch one touch frame
    ///
    /// Frames with an unknown address, and every frame while a wait is
    /// pending, are dropped.
    pub fn handle_frame<P: Printer>(&mut self, printer: &mut P, frame: &Frame) {
        let Some(category) = classify(frame.address, self.config.max_files) else {
            debug!("unknown address {}", frame.address);
            return;
        };
        if let Some(reason) = self.state.wait.reason() {
            debug!("dropping {:?} while waiting on {:?}", category, reason);
            return;
        }

        let value = frame.first_word();
        debug!("touch {} {:?} = {}", frame.address, category, value);

        match category {
            Category::PrintFile => self.handle_print_file(printer, value),
            Category::Adjust => self.handle_adjust(printer, value),
            Category::Feedrate => self.handle_feedrate(printer, value),
            Category::PrintChoice(control) => self.handle_print_choice(printer, control, value),
            Category::ZOffset => self.handle_z_offset(printer, value),
            Category::TempControl => self.handle_temp_control(printer, value),
            Category::ManualTemp(field) => self.handle_manual_temp(printer, field, value),
            Category::Setting => self.handle_setting(printer, value),
            Category::ReturnBack => self.handle_return_back(value),
            Category::BedLevel => self.handle_bed_level(printer, value),
            Category::Axis(key) => self.handle_axis(printer, key, value),
            Category::Filament(key) => self.handle_filament(printer, key, value),
            Category::Language => self.handle_language(printer, value),
            Category::NoFilament => self.handle_no_filament(printer, value),
            Category::PowerLoss => self.handle_power_loss(printer, value),
            Category::Volume => self.handle_volume(printer, value),
            Category::Filename(key) => self.handle_filename(printer, key, value),
        }
    }

    /// Resolve the pending wait against the machine
    fn resolve_wait<P: Printer>(&mut self, printer: &mut P) {
        let idle = MachineIdle {
            position_known: printer.position_known(),
            queue_empty: !printer.has_commands(),
        };

        match self.state.wait.poll(idle, self.config.wait_stall_ticks) {
            WaitOutcome::Idle | WaitOutcome::Pending(_) => {}
            WaitOutcome::Completed(reason) => {
                debug!("wait {:?} complete", reason);
                match reason {
                    WaitReason::Pausing => {
                        self.state.info_showing = true;
                        self.link.status_icon(StatusIcon::Paused);
                        self.link.page(Page::Paused);
                    }
                    WaitReason::AutoLeveling => {
                        self.link.page(Page::Leveling);
                        self.state.wait.set(WaitReason::Draining);
                    }
                    WaitReason::Moving => {
                        self.state.autohome_icon = None;
                        self.link.page(Page::MoveAxis(self.state.axis_unit));
                    }
                    WaitReason::RunoutPause => {
                        self.state.info_showing = true;
                        self.link.page(Page::NoFilament);
                        self.state.apply_filament(FilamentEvent::MissingMidPrint);
                    }
                    WaitReason::Homing | WaitReason::Stopping | WaitReason::Draining => {}
                }
            }
            WaitOutcome::Released(reason) => {
                if reason == WaitReason::Moving {
                    self.state.autohome_icon = None;
                }
            }
        }
    }

    /// Echo the stored Z-offset (hundredths of a mm)
    fn echo_z_offset(&mut self) {
        let offset = self.settings.z_offset;
        self.link.signed(Z_OFFSET_ADDR, i32::from(offset));
        self.state.echoed.z_offset = Some(offset);
    }

    fn save_settings<P: Printer>(&mut self, printer: &mut P) {
        if let Err(e) = self.settings.save(printer) {
            warn!("settings save failed: {:?}", e);
        }
    }
}

/// Queue one G-code line, logging when the queue refuses it
fn enqueue<P: Printer>(printer: &mut P, command: &str) {
    if !printer.enqueue(command) {
        warn!("command queue full");
    }
}

/// Format and queue one G-code line
fn enqueue_fmt<P: Printer>(printer: &mut P, args: core::fmt::Arguments<'_>) {
    let mut line: String<MAX_COMMAND_LEN> = String::new();
    if line.write_fmt(args).is_err() {
        warn!("command too long");
        return;
    }
    enqueue(printer, &line);
}
