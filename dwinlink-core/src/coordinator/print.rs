//! Print control: file page, adjust page, pause/resume/stop, job start

use embedded_hal::delay::DelayNs;

use dwinlink_hal::Uart;
use dwinlink_protocol::address::{
    FAN_KEY_ICON_ADDR, FEEDRATE_ADDR, FILENAME_ICON_ADDR, PERCENTAGE_ADDR, PRINT_FILENAME_ADDR,
    PRINT_SCHEDULE_ICON_ADDR,
};
use dwinlink_protocol::PrintControl;

use crate::display::{Page, StatusIcon};
use crate::files::centered;
use crate::state::{FilamentEvent, PrintEvent, PrintPhase, WaitReason};
use crate::traits::Printer;

use super::{enqueue, enqueue_fmt, Panel};

/// Motor icon values on `FILENAME_ICON_ADDR`
pub(super) const MOTORS_ENGAGED: u32 = 10;
pub(super) const MOTORS_OFF: u32 = 11;

/// Fan key icon values
const FAN_ICON_OFF: u32 = 2;
const FAN_ICON_ON: u32 = 3;

/// Stop value that only dismisses the stop dialog
const STOP_DISMISS: u16 = 0xF0;
/// Pause confirmation value
const PAUSE_CONFIRM: u16 = 0xF1;

const FEEDRATE_MIN: u16 = 10;
const FEEDRATE_MAX: u16 = 999;

impl<U: Uart, D: DelayNs> Panel<U, D> {
    pub(super) fn handle_print_file<P: Printer>(&mut self, printer: &mut P, value: u16) {
        match value {
            1 => {
                self.state.info_showing = false;
                self.state.refresh_list = true;
                self.refresh_card(printer);
                self.link.page(Page::FileList);
            }
            2 => {
                // Back to main after a finished job
                self.state.info_showing = true;
                self.state.progress_showing = false;
                printer.quickstop();
                self.link.number(FILENAME_ICON_ADDR, MOTORS_OFF);
                self.link.number(PRINT_SCHEDULE_ICON_ADDR, 0);
                self.link.number(PRINT_SCHEDULE_ICON_ADDR + 1, 0);
                self.link.number(PERCENTAGE_ADDR, 0);
                self.send_elapsed(0);
                printer.timer_reset();
                self.state.printing_file = None;
                self.state.last_percent = None;
                self.state.apply(PrintEvent::Finish);
                self.link.page(Page::Main);
            }
            3 => {
                self.state.info_showing = true;
                self.state.progress_showing = false;
                self.link.page(Page::temperature(self.state.fan_on));
            }
            4 => self.state.info_showing = false,
            _ => debug!("print file value {} ignored", value),
        }
    }

    pub(super) fn handle_adjust<P: Printer>(&mut self, printer: &mut P, value: u16) {
        match value {
            1 => {
                self.state.info_showing = false;
                self.send_fan_icon();
            }
            2 => {
                self.state.info_showing = true;
                let page = match self.state.phase {
                    PrintPhase::Heating => Page::Heating,
                    PrintPhase::Paused => Page::Paused,
                    _ => Page::Printing,
                };
                self.link.page(page);
            }
            3 => {
                self.state.fan_on = !self.state.fan_on;
                printer.set_fan(0, self.state.fan_on);
                self.send_fan_icon();
            }
            4 => {
                self.state.power_saving = !self.state.power_saving;
                let icon = if self.state.power_saving {
                    FAN_ICON_ON
                } else {
                    FAN_ICON_OFF
                };
                self.link.number(FAN_KEY_ICON_ADDR + 1, icon);
            }
            _ => debug!("adjust value {} ignored", value),
        }
    }

    pub(super) fn handle_feedrate<P: Printer>(&mut self, printer: &mut P, value: u16) {
        let percent = value.clamp(FEEDRATE_MIN, FEEDRATE_MAX);
        printer.set_feedrate_percent(percent);
        self.link.number(FEEDRATE_ADDR, u32::from(percent));
    }

    pub(super) fn handle_print_choice<P: Printer>(
        &mut self,
        printer: &mut P,
        control: PrintControl,
        value: u16,
    ) {
        match control {
            PrintControl::Stop => {
                if value == STOP_DISMISS && self.state.phase == PrintPhase::Paused {
                    self.link.page(Page::Paused);
                    return;
                }
                self.link.page(Page::Stopping);
                self.send_elapsed(0);
                self.state.extra_delay = false;
                self.state.card_check = false;
                self.stop_job(printer);
            }
            PrintControl::Pause => {
                if value != PAUSE_CONFIRM {
                    return;
                }
                self.link.page(Page::Stopping);
                self.state.wait.set(WaitReason::Pausing);
                self.state.extra_delay = false;
                self.pause_job(printer);
            }
            PrintControl::Resume => {
                if self.state.phase != PrintPhase::Paused {
                    debug!("resume ignored in {:?}", self.state.phase);
                    return;
                }
                match value {
                    1 => self.resume_job(printer),
                    2 => self.start_resume_warming(printer),
                    _ => debug!("resume value {} ignored", value),
                }
            }
        }
    }

    /// Pause the card job and park, keeping the hotend target for resume
    pub(super) fn pause_job<P: Printer>(&mut self, printer: &mut P) {
        printer.pause_print();
        printer.timer_pause();
        self.state.paused_hotend = printer.hotend_target();
        self.state.apply(PrintEvent::Pause);
        printer.synchronize();
        enqueue(printer, "M25");
        info!("paused, hotend target {}", self.state.paused_hotend);
    }

    fn resume_job<P: Printer>(&mut self, printer: &mut P) {
        if !printer.filament_present() {
            self.state.apply_filament(FilamentEvent::MissingMidPrint);
            self.link.page(Page::NoFilament);
            return;
        }

        enqueue(printer, "M24");
        enqueue_fmt(printer, format_args!("M109 S{}", self.state.paused_hotend));
        printer.synchronize();

        self.state.apply(PrintEvent::Resume);
        self.state.arm_runout(true);
        self.state.info_showing = true;
        self.state.progress_showing = true;
        self.state.card_check = true;
        self.link.status_icon(StatusIcon::Heating);
        self.link.page(Page::Heating);
        info!("resumed");
    }

    /// Re-heat to the paused target; the updater shows the confirm page
    fn start_resume_warming<P: Printer>(&mut self, printer: &mut P) {
        self.state.heat.resume_warming = true;
        self.state.warm_frame = 0;
        self.state.info_showing = true;
        printer.set_hotend_target(self.state.paused_hotend);
        self.state.arm_runout(true);
        self.link.page(Page::ResumeHeating);
    }

    /// Cancel the job and bring the machine to a safe idle state
    pub(super) fn stop_job<P: Printer>(&mut self, printer: &mut P) {
        self.state.wait.set(WaitReason::Stopping);
        if printer.card_printing() || self.state.phase.job_active() {
            printer.stop_print();
            printer.clear_queue();
            printer.quickstop();
        }
        printer.disable_heaters();
        printer.timer_reset();
        printer.invalidate_recovery();
        printer.set_all_fans(false);

        self.state.fan_on = false;
        self.state.apply(PrintEvent::Stop);
        self.state.apply_filament(FilamentEvent::Cancelled);
        self.state.arm_runout(false);
        self.state.progress_showing = false;
        self.state.printing_file = None;
        self.state.last_percent = None;
        self.state.heat = Default::default();
        self.state.pending_extrude = None;

        self.link.status_icon(StatusIcon::Ready);
        enqueue(printer, "M84");
        info!("job stopped");
    }

    /// Start cached file `index` after a filament check
    pub(super) fn start_print<P: Printer>(&mut self, printer: &mut P, index: usize) {
        let Some(entry) = self.files.get(index) else {
            return;
        };

        self.state.pending_start.clear();
        let short = entry.short_name.clone();
        if self.state.pending_start.push_str("M23 ").is_err() {
            return;
        }
        for c in short.chars() {
            if self.state.pending_start.push(c.to_ascii_lowercase()).is_err() {
                warn!("start command too long");
                return;
            }
        }

        if !printer.filament_present() {
            self.state.apply_filament(FilamentEvent::MissingAtStart);
            self.link.page(Page::NoFilament);
            return;
        }
        self.begin_print(printer, index);
    }

    /// Queue the held start command and switch to the heating page
    pub(super) fn begin_print<P: Printer>(&mut self, printer: &mut P, index: usize) {
        let start = self.state.pending_start.clone();
        enqueue(printer, &start);
        enqueue(printer, "M24");

        self.link.clear_words(PRINT_FILENAME_ADDR, 10);
        if let Some(entry) = self.files.get(index) {
            let name = centered(&entry.display_name, usize::from(self.config.text_width));
            self.link.text(PRINT_FILENAME_ADDR, &name);
        }

        printer.set_all_fans(true);
        self.state.fan_on = true;
        self.link.status_icon(StatusIcon::Heating);
        self.link.page(Page::Heating);

        self.state.progress_showing = true;
        self.state.info_showing = true;
        self.state.extra_delay = false;
        self.state.card_check = true;
        self.state.printing_file = Some(index);
        self.state.last_percent = None;
        self.state.arm_runout(true);
        self.state.apply(PrintEvent::StartPrint);
        info!("print started from slot {}", index);
    }

    fn send_fan_icon(&mut self) {
        let icon = if self.state.fan_on {
            FAN_ICON_ON
        } else {
            FAN_ICON_OFF
        };
        self.link.number(FAN_KEY_ICON_ADDR, icon);
    }
}
