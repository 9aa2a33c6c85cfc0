//! Periodic display refresh
//!
//! Runs once per update interval while the info pages are showing. The
//! startup animation takes every tick until it finishes; after that each
//! tick pushes job progress, temperatures, heat gates and the homing and
//! leveling icons.

use embedded_hal::delay::DelayNs;

use dwinlink_hal::Uart;
use dwinlink_protocol::address::{
    AUTO_LEVEL_ICON_ADDR, AUTO_ZERO_ICON_ADDR, BED_PREHEAT_ADDR, BED_TEMP_ADDR,
    EXCH_FLMNT_ICON_ADDR, NOZZLE_PREHEAT_ADDR, NOZZLE_TEMP_ADDR, PERCENTAGE_ADDR,
    PRINT_FILENAME_ADDR, PRINT_SCHEDULE_ICON_ADDR, REMAIN_HOUR_ADDR, REMAIN_MIN_ADDR,
    SOUND_ADDR, START_ICON_ADDR, START_SOUND, TIME_HOUR_ADDR, TIME_MIN_ADDR, VOLUME_ADDR,
};

use crate::display::{Page, StatusIcon};
use crate::files::centered;
use crate::state::{PrintEvent, PrintPhase, STARTUP_END};
use crate::traits::Printer;

use super::motion::{LEVELING_OFF, LEVELING_ON};
use super::Panel;

/// Frame time of the startup animation
pub(super) const STARTUP_FRAME_MS: u64 = 30;

/// Frames of the autohome animation
const AUTOHOME_FRAMES: u8 = 10;

/// Frames of the resume-warming animation; the last icon means ready
const WARM_FRAMES: u8 = 5;
const WARM_DONE_ICON: u32 = 4;

/// Progress bar split across two icons of 100 steps each
fn progress_icons(percent: u8) -> (u32, u32) {
    if percent == 0 {
        return (0, 0);
    }
    let rec = u32::from(percent) + 1;
    if rec <= 50 {
        (rec * 2, 0)
    } else {
        (100, (rec * 2).saturating_sub(100).min(100))
    }
}

/// Remaining seconds extrapolated from elapsed time and percent done
fn remaining_s(elapsed_s: u32, percent: u8) -> u32 {
    if percent == 0 {
        return 0;
    }
    let total = u64::from(elapsed_s) * 100 / u64::from(percent);
    total.saturating_sub(u64::from(elapsed_s)) as u32
}

fn hours_minutes(seconds: u32) -> (u32, u32) {
    (seconds / 3600, (seconds % 3600) / 60)
}

impl<U: Uart, D: DelayNs> Panel<U, D> {
    pub(super) fn run_updater<P: Printer>(&mut self, printer: &mut P, now_ms: u64) {
        if now_ms < self.state.next_update_ms || !self.state.info_showing {
            return;
        }

        if !self.state.startup.done {
            self.startup_step(printer);
            self.state.next_update_ms = now_ms + STARTUP_FRAME_MS;
            return;
        }

        if self.state.progress_showing && self.state.phase.job_active() {
            self.push_progress(printer);
        }
        self.push_temperatures(printer);
        self.advance_phase(printer);
        self.run_heat_gates(printer);

        if let Some(frame) = self.state.autohome_icon {
            self.link.number(AUTO_ZERO_ICON_ADDR, u32::from(frame));
            self.state.autohome_icon = Some((frame + 1) % AUTOHOME_FRAMES);
        }

        let leveling = if printer.leveling_active() {
            LEVELING_ON
        } else {
            LEVELING_OFF
        };
        if self.state.echoed.leveling_icon != Some(leveling) {
            self.send_leveling_icon(leveling);
        }

        let mut interval = u64::from(self.config.update_interval_ms);
        if self.state.extra_delay {
            interval += u64::from(self.config.busy_extra_delay_ms);
        }
        self.state.next_update_ms = now_ms + interval;
    }

    fn startup_step<P: Printer>(&mut self, printer: &mut P) {
        let progress = self.state.startup.progress;
        if progress == 0 {
            self.link.number(SOUND_ADDR, START_SOUND);
            self.send_volume();
            self.link
                .number(VOLUME_ADDR, u32::from(self.settings.volume));
        }

        if progress <= 100 {
            self.link.number(START_ICON_ADDR, u32::from(progress));
        } else {
            self.link.number(START_ICON_ADDR + 1, u32::from(progress - 100));
        }

        self.state.startup.progress = progress + 1;
        if self.state.startup.progress > STARTUP_END {
            self.state.startup.done = true;
            self.finish_startup(printer);
        }
    }

    /// Main page, or the resume prompt when a recovery record names a cached file
    fn finish_startup<P: Printer>(&mut self, printer: &mut P) {
        self.state.info_showing = true;
        self.state.progress_showing = false;

        if !self.state.recovery_handled && self.state.card_present {
            let resumable = printer
                .recovery_record()
                .and_then(|record| self.files.find_short(&record.file));
            if let Some(index) = resumable {
                let width = usize::from(self.config.text_width);
                if let Some(entry) = self.files.get(index) {
                    let name = centered(&entry.display_name, width);
                    self.link.text(PRINT_FILENAME_ADDR, &name);
                }
                self.link.page(Page::PowerLossResume);
                info!("power loss record found");
                return;
            }
        }

        self.state.recovery_handled = true;
        self.state.extra_delay = true;
        self.link.page(Page::Main);
    }

    fn push_progress<P: Printer>(&mut self, printer: &mut P) {
        let elapsed = printer.elapsed_s();
        if self.state.echoed.elapsed != Some(hours_minutes(elapsed)) {
            self.send_elapsed(elapsed);
        }

        if !printer.card_printing() {
            return;
        }
        let percent = printer.percent_done().min(100);
        if self.state.last_percent != Some(percent) {
            let (first, second) = progress_icons(percent);
            self.link.number(PRINT_SCHEDULE_ICON_ADDR, first);
            self.link.number(PRINT_SCHEDULE_ICON_ADDR + 1, second);
            self.link.number(PERCENTAGE_ADDR, u32::from(percent));
            self.state.last_percent = Some(percent);
        }

        let remaining = hours_minutes(remaining_s(elapsed, percent));
        if self.state.echoed.remaining != Some(remaining) {
            self.link.number(REMAIN_HOUR_ADDR, remaining.0);
            self.link.number(REMAIN_MIN_ADDR, remaining.1);
            self.state.echoed.remaining = Some(remaining);
        }
    }

    fn push_temperatures<P: Printer>(&mut self, printer: &mut P) {
        if self.state.echoed.z_offset != Some(self.settings.z_offset) {
            self.echo_z_offset();
        }
        let hotend = printer.hotend_temp();
        if self.state.echoed.hotend != Some(hotend) {
            self.send_hotend_temp(hotend);
        }
        let bed = printer.bed_temp();
        if self.state.echoed.bed != Some(bed) {
            self.send_bed_temp(bed);
        }

        let targets = (printer.hotend_target(), printer.bed_target());
        let (last_hotend, last_bed) = self.state.last_targets;
        if targets == self.state.last_targets {
            return;
        }

        self.link.signed(NOZZLE_PREHEAT_ADDR, i32::from(targets.0));
        self.link.signed(BED_PREHEAT_ADDR, i32::from(targets.1));
        if !printer.card_printing() {
            if targets.0 > last_hotend || targets.1 > last_bed {
                self.link.status_icon(StatusIcon::Heating);
                self.state.extra_delay = false;
            } else {
                self.link.status_icon(StatusIcon::Cooling);
            }
        }
        self.state.last_targets = targets;
    }

    pub(super) fn send_hotend_temp(&mut self, celsius: i16) {
        self.link.signed(NOZZLE_TEMP_ADDR, i32::from(celsius));
        self.state.echoed.hotend = Some(celsius);
    }

    pub(super) fn send_bed_temp(&mut self, celsius: i16) {
        self.link.signed(BED_TEMP_ADDR, i32::from(celsius));
        self.state.echoed.bed = Some(celsius);
    }

    pub(super) fn send_leveling_icon(&mut self, icon: u32) {
        self.link.number(AUTO_LEVEL_ICON_ADDR, icon);
        self.state.echoed.leveling_icon = Some(icon);
    }

    /// Elapsed job time as hours and minutes
    pub(super) fn send_elapsed(&mut self, seconds: u32) {
        let (hours, minutes) = hours_minutes(seconds);
        self.link.number(TIME_HOUR_ADDR, hours);
        self.link.number(TIME_MIN_ADDR, minutes);
        self.state.echoed.elapsed = Some((hours, minutes));
    }

    fn advance_phase<P: Printer>(&mut self, printer: &mut P) {
        match self.state.phase {
            PrintPhase::Heating
                if printer.card_printing() && printer.hotend_temp() >= printer.hotend_target() =>
            {
                self.state.apply(PrintEvent::HeatReached);
                self.link.page(Page::Printing);
            }
            PrintPhase::Cooling if printer.hotend_temp() < self.config.cool_threshold_c => {
                self.state.apply(PrintEvent::Cooled);
                self.link.status_icon(StatusIcon::Ready);
            }
            _ => {}
        }
    }

    fn run_heat_gates<P: Printer>(&mut self, printer: &mut P) {
        let hot = printer.hotend_temp() >= printer.hotend_target();

        if self.state.heat.load_confirmed {
            self.send_heat_percent(printer);
            if hot {
                self.state.heat.load_confirmed = false;
                self.state.heat.prompted = false;
                self.link.page(Page::Filament);
                match self.state.pending_extrude.take() {
                    Some(pending) => self.run_extrude(printer, pending),
                    None => self.echo_filament_amounts(),
                }
            }
        }

        if self.state.heat.resume_warming {
            if hot {
                self.state.heat.resume_warming = false;
                self.state.warm_frame = 0;
                self.state.progress_showing = true;
                self.link.number(EXCH_FLMNT_ICON_ADDR, WARM_DONE_ICON);
                self.link.page(Page::ResumeReady);
            } else {
                let frame = self.state.warm_frame % WARM_FRAMES;
                self.link.number(EXCH_FLMNT_ICON_ADDR, u32::from(frame));
                self.state.warm_frame = self.state.warm_frame.wrapping_add(1);
            }
        }
    }
}
