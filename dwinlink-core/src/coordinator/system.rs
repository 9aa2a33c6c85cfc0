//! Settings pages, language, volume, power-loss prompt and panel startup

use embedded_hal::delay::DelayNs;

use dwinlink_hal::Uart;
use dwinlink_protocol::address::{
    BED_PREHEAT_ADDR, CHOOSE_FILENAME_ADDR, CORP_WEBSITE_ADDR, FAN_KEY_ICON_ADDR, FEEDRATE_ADDR,
    FILENAME_COUNT_ADDR, FILENAME_ICON1_ADDR, FILENAME_ICON_ADDR, FILE_SLOT_SIZE,
    MAC_VERSION_ADDR, NOZZLE_PREHEAT_ADDR, PRINTER_SIZE_ADDR, PRINT_FILENAME_ADDR,
    PRINT_SCHEDULE_ICON_ADDR, SOFT_VERSION_ADDR, SOUND_ADDR, SOUND_ICON_ADDR, VOLUME_ICON_ADDR,
};

use crate::config::{Language, PanelSettings};
use crate::display::{Page, StatusIcon};
use crate::files::slot_address;
use crate::state::{AxisUnit, CoordinatorState, PrintEvent, WaitReason};
use crate::traits::Printer;

use super::motion::{LEVELING_OFF, LEVELING_ON};
use super::print::{MOTORS_ENGAGED, MOTORS_OFF};
use super::{enqueue, enqueue_fmt, Panel};

/// Sound icon values
const SOUND_ON: u32 = 8;
const SOUND_MUTED: u32 = 9;

/// Words cleared ahead of the machine info strings
const INFO_WORDS: u16 = 20;

impl<U: Uart, D: DelayNs> Panel<U, D> {
    /// Bring the display to its initial state
    ///
    /// Loads the persisted settings, pushes the idle icons and temperatures,
    /// builds the file list and arms the startup animation.
    pub fn init<P: Printer>(&mut self, printer: &mut P) {
        self.settings = PanelSettings::load(printer, &self.config);
        self.link.set_language(self.settings.language);
        self.state = CoordinatorState::new();
        self.state.preheat_hotend = self.settings.pla.hotend;
        self.state.filament_amount = [self.config.filament_amount_mm * 10; 2];

        self.link.number(FAN_KEY_ICON_ADDR + 1, 3);
        printer.set_feedrate_percent(100);
        self.link.number(FEEDRATE_ADDR, 100);
        self.link.number(FILENAME_ICON_ADDR, MOTORS_OFF);

        self.link.number(NOZZLE_PREHEAT_ADDR, 0);
        self.link.number(BED_PREHEAT_ADDR, 0);
        self.send_hotend_temp(printer.hotend_temp());
        self.send_bed_temp(printer.bed_temp());
        self.state.last_targets = (printer.hotend_target(), printer.bed_target());

        printer.set_all_fans(false);
        self.link.number(FAN_KEY_ICON_ADDR, 2);

        if self.settings.leveling_enabled {
            enqueue(printer, "M420 S1");
            self.send_leveling_icon(LEVELING_ON);
        } else {
            self.send_leveling_icon(LEVELING_OFF);
        }

        self.link.clear_words(MAC_VERSION_ADDR, INFO_WORDS);
        self.write_info_strings();
        self.link.number(PRINT_SCHEDULE_ICON_ADDR, 0);
        self.link.number(PRINT_SCHEDULE_ICON_ADDR + 1, 0);

        // Blank every slot before the cache fills them
        for i in 0..usize::from(self.config.max_files) {
            self.link.clear_words(slot_address(i), FILE_SLOT_SIZE);
        }
        self.link.clear_words(PRINT_FILENAME_ADDR, FILE_SLOT_SIZE);
        self.link.clear_words(CHOOSE_FILENAME_ADDR, FILE_SLOT_SIZE);
        self.link.clear_words(FILENAME_COUNT_ADDR, 8);
        for j in 1..=u16::from(self.config.max_files) {
            self.link.number(FILENAME_ICON_ADDR + j, 10);
            self.link.number(FILENAME_ICON1_ADDR + j, 10);
        }

        self.state.card_present = printer.card_inserted();
        if self.state.card_present {
            self.load_card_list(printer);
        } else {
            self.link.status_icon(StatusIcon::CardRemoved);
        }

        self.echo_z_offset();
        info!("panel ready, {} files", self.files.len());
    }

    fn write_info_strings(&mut self) {
        let name = self.config.machine_name.clone();
        let version = self.config.firmware_version.clone();
        let size = self.config.printer_size.clone();
        let website = self.config.website.clone();
        self.link.text(MAC_VERSION_ADDR, &name);
        self.link.text(SOFT_VERSION_ADDR, &version);
        self.link.text(PRINTER_SIZE_ADDR, &size);
        self.link.text(CORP_WEBSITE_ADDR, &website);
    }

    pub(super) fn handle_setting<P: Printer>(&mut self, printer: &mut P, value: u16) {
        match value {
            0 => {
                self.state.info_showing = true;
                self.state.progress_showing = false;
            }
            1 => {
                let icon = if self.settings.leveling_enabled {
                    LEVELING_ON
                } else {
                    LEVELING_OFF
                };
                self.send_leveling_icon(icon);
                self.link.number(FILENAME_ICON_ADDR, MOTORS_ENGAGED);
                self.state.wait.set(WaitReason::Homing);
                enqueue(printer, "G28");
                printer.set_leveling(false);
                enqueue(printer, "G1 F150 Z0.0");
                printer.set_leveling(self.settings.leveling_enabled);
                self.link.page(Page::Leveling);
            }
            2 => {
                self.state.info_showing = true;
                self.state.progress_showing = false;
                self.state.filament_amount = [self.config.filament_amount_mm * 10; 2];
                self.echo_filament_amounts();
                self.send_hotend_temp(printer.hotend_temp());
                self.link
                    .signed(NOZZLE_PREHEAT_ADDR, i32::from(printer.hotend_target()));
                self.link.page(Page::Filament);
            }
            3 => {
                self.state.axis_unit = AxisUnit::Ten;
                self.echo_positions(printer);
                self.link.page(Page::MoveAxis(AxisUnit::Ten));
            }
            5 => self.write_info_strings(),
            6 => {
                enqueue(printer, "M84");
                self.link.number(FILENAME_ICON_ADDR, MOTORS_OFF);
            }
            _ => debug!("setting value {} ignored", value),
        }
    }

    pub(super) fn handle_return_back(&mut self, value: u16) {
        match value {
            1 => {
                self.state.extra_delay = true;
                self.state.info_showing = false;
                self.link.page(Page::Tools);
            }
            2 => self.link.page(Page::Leveling),
            _ => debug!("return value {} ignored", value),
        }
    }

    pub(super) fn handle_language<P: Printer>(&mut self, printer: &mut P, value: u16) {
        let language = Language::from_wire(value);
        self.settings.language = language;
        self.link.set_language(language);
        let icon = if printer.card_mounted() {
            StatusIcon::Ready
        } else {
            StatusIcon::CardRemoved
        };
        self.link.status_icon(icon);
        self.save_settings(printer);
    }

    pub(super) fn handle_volume<P: Printer>(&mut self, printer: &mut P, value: u16) {
        self.settings.volume = value.min(u16::from(u8::MAX)) as u8;
        self.send_volume();
        self.save_settings(printer);
    }

    /// Volume and sound icons plus the buzzer level
    pub(super) fn send_volume(&mut self) {
        let volume = u32::from(self.settings.volume);
        if volume == 0 {
            self.link.number(VOLUME_ICON_ADDR, 0);
            self.link.number(SOUND_ICON_ADDR, SOUND_MUTED);
        } else {
            self.link
                .number(VOLUME_ICON_ADDR, ((volume + 1) / 32).saturating_sub(1));
            self.link.number(SOUND_ICON_ADDR, SOUND_ON);
        }
        self.link.number(SOUND_ADDR + 1, volume << 8);
    }

    pub(super) fn handle_power_loss<P: Printer>(&mut self, printer: &mut P, value: u16) {
        match value {
            1 => {
                let Some(record) = printer.recovery_record() else {
                    warn!("resume without recovery record");
                    self.link.page(Page::Main);
                    return;
                };
                enqueue_fmt(printer, format_args!("M190 S{}", record.bed_target));
                enqueue_fmt(printer, format_args!("M109 S{}", record.hotend_target));
                enqueue(printer, "M106 S255");
                enqueue_fmt(printer, format_args!("T{}", record.extruder));
                printer.set_all_fans(true);

                self.state.fan_on = true;
                self.state.recovery_handled = true;
                self.state.printing_file = self.files.find_short(&record.file);
                self.state.progress_showing = true;
                self.state.info_showing = true;
                self.state.extra_delay = false;
                self.state.card_check = true;
                self.state.arm_runout(true);
                self.state.apply(PrintEvent::StartPrint);
                self.link.status_icon(StatusIcon::Heating);
                self.link.page(Page::Heating);
                info!("resuming after power loss");
            }
            2 => {
                self.state.info_showing = true;
                self.state.progress_showing = false;
                self.state.extra_delay = true;
                self.state.recovery_handled = true;
                self.link.page(Page::Main);
                printer.stop_print();
                printer.clear_queue();
                printer.quickstop();
                printer.disable_heaters();
                printer.invalidate_recovery();
                self.state.apply(PrintEvent::Stop);
                info!("power loss recovery declined");
            }
            _ => debug!("power loss value {} ignored", value),
        }
    }
}
