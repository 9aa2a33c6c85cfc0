//! Filament page, no-filament prompt and runout handling

use embedded_hal::delay::DelayNs;

use dwinlink_hal::Uart;
use dwinlink_protocol::address::{
    FILAMENT_UNIT1_ADDR, FILAMENT_UNIT2_ADDR, HEAT_HINT_ADDR, HEAT_PERCENT_ICON_ADDR,
    NOZZLE_PREHEAT_ADDR,
};
use dwinlink_protocol::FilamentKey;

use crate::display::{Page, StatusIcon};
use crate::state::{FilamentEvent, FilamentPhase, PendingExtrude, PrintEvent, WaitReason};
use crate::traits::Printer;

use super::{enqueue_fmt, Panel};

/// Load/unload is allowed this far below the preheat target
const HEAT_MARGIN_C: i16 = 5;

const CONFIRM_HEAT: u16 = 5;
const CANCEL_PROMPT: u16 = 6;
const KEEP_HEATING: u16 = 0xF0;
const CANCEL_HEATING: u16 = 0xF1;

impl<U: Uart, D: DelayNs> Panel<U, D> {
    pub(super) fn handle_filament<P: Printer>(
        &mut self,
        printer: &mut P,
        key: FilamentKey,
        value: u16,
    ) {
        match key {
            FilamentKey::Unit1 => self.state.filament_amount[0] = value,
            FilamentKey::Unit2 => self.state.filament_amount[1] = value,
            FilamentKey::Exchange => match value {
                1..=4 => self.request_extrude(printer, value),
                CONFIRM_HEAT => {
                    self.state.heat.load_confirmed = true;
                    let target = printer.hotend_target().max(self.state.preheat_hotend);
                    printer.set_hotend_target(target);
                    self.send_heat_percent(printer);
                    self.send_hotend_temp(printer.hotend_temp());
                    self.link.signed(NOZZLE_PREHEAT_ADDR, i32::from(target));
                    self.link.page(Page::FilamentHeating);
                }
                CANCEL_PROMPT => {
                    self.state.heat.prompted = false;
                    self.state.pending_extrude = None;
                    self.link.page(Page::Filament);
                }
                CANCEL_HEATING => {
                    self.state.heat.load_confirmed = false;
                    self.state.heat.prompted = false;
                    self.state.pending_extrude = None;
                    self.link.page(Page::Filament);
                }
                KEEP_HEATING => {}
                _ => debug!("filament value {} ignored", value),
            },
        }
    }

    /// Values 1..=4: odd unloads, even loads; 1-2 extruder 0, 3-4 extruder 1
    fn request_extrude<P: Printer>(&mut self, printer: &mut P, value: u16) {
        if !printer.filament_present() {
            self.state.apply_filament(FilamentEvent::MissingDuringChange);
            self.link.page(Page::NoFilament);
            return;
        }

        let extruder = ((value - 1) / 2) as u8;
        let amount = i32::from(self.state.filament_amount[usize::from(extruder)]);
        let tenths = if value % 2 == 1 { -amount } else { amount };
        let pending = PendingExtrude { extruder, tenths };

        let threshold = self.state.preheat_hotend - HEAT_MARGIN_C;
        if !self.state.heat.prompted && printer.hotend_temp() < threshold {
            self.state.heat.prompted = true;
            self.state.pending_extrude = Some(pending);
            self.link
                .signed(HEAT_HINT_ADDR, i32::from(self.state.preheat_hotend));
            self.link.page(Page::FilamentHeatPrompt);
            return;
        }
        self.run_extrude(printer, pending);
    }

    pub(super) fn run_extrude<P: Printer>(&mut self, printer: &mut P, pending: PendingExtrude) {
        printer.extrude(pending.extruder, pending.tenths);
        self.echo_filament_amounts();
    }

    pub(super) fn echo_filament_amounts(&mut self) {
        self.link
            .number(FILAMENT_UNIT1_ADDR, u32::from(self.state.filament_amount[0]));
        self.link
            .number(FILAMENT_UNIT2_ADDR, u32::from(self.state.filament_amount[1]));
    }

    /// Heating progress of the hotend, capped at 100
    pub(super) fn send_heat_percent<P: Printer>(&mut self, printer: &mut P) {
        let target = i32::from(printer.hotend_target());
        let current = i32::from(printer.hotend_temp()).max(0);
        let percent = if target <= 0 {
            100
        } else {
            (current * 100 / target).min(100)
        };
        self.link.number(HEAT_PERCENT_ICON_ADDR, percent as u32);
    }

    pub(super) fn handle_no_filament<P: Printer>(&mut self, printer: &mut P, value: u16) {
        match value {
            1 => {
                if !printer.filament_present() {
                    self.link.page(Page::NoFilament);
                    return;
                }
                match self.state.filament {
                    FilamentPhase::PrePrintCheck => {
                        if let Some(index) = self.files.selected() {
                            self.begin_print(printer, index);
                        }
                    }
                    FilamentPhase::MidPrintCheck => {
                        enqueue_fmt(printer, format_args!("M109 S{}", self.state.paused_hotend));
                        printer.resume_print();
                        printer.timer_start();
                        self.state.apply(PrintEvent::Resume);
                        self.state.arm_runout(true);
                        self.state.card_check = true;
                        self.state.info_showing = true;
                        self.state.progress_showing = true;
                        self.link.status_icon(StatusIcon::Heating);
                        self.link.page(Page::Heating);
                    }
                    FilamentPhase::ChangeFlow => self.link.page(Page::Filament),
                    FilamentPhase::Idle => {}
                }
                self.state.apply_filament(FilamentEvent::Resolved);
            }
            0 => {
                match self.state.filament {
                    FilamentPhase::PrePrintCheck => self.link.page(Page::FileList),
                    FilamentPhase::MidPrintCheck => self.link.page(Page::Paused),
                    FilamentPhase::ChangeFlow => self.link.page(Page::Filament),
                    FilamentPhase::Idle => {}
                }
                self.state.apply_filament(FilamentEvent::Cancelled);
            }
            _ => debug!("no filament value {} ignored", value),
        }
    }

    /// Sample the sensor while a job is running
    pub(super) fn sample_runout<P: Printer>(&mut self, printer: &mut P) {
        if !self.state.runout_watch || !(printer.card_printing() || printer.has_commands()) {
            return;
        }
        if printer.filament_present() {
            self.state.runout_samples = 0;
            return;
        }
        self.state.runout_samples = self.state.runout_samples.saturating_add(1);
        if self.state.runout_samples > self.config.runout_debounce {
            self.runout_pause(printer);
        }
    }

    /// Full pause after the filament ran out
    pub(super) fn runout_pause<P: Printer>(&mut self, printer: &mut P) {
        warn!("filament runout");
        self.state.wait.set(WaitReason::RunoutPause);
        self.state.arm_runout(false);
        self.state.progress_showing = false;
        self.state.extra_delay = false;
        self.pause_job(printer);
    }
}
