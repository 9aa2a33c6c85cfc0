//! Temperature page handlers

use embedded_hal::delay::DelayNs;

use dwinlink_hal::Uart;
use dwinlink_protocol::address::{BED_PREHEAT_ADDR, NOZZLE_PREHEAT_ADDR};
use dwinlink_protocol::TempField;

use crate::config::PreheatPreset;
use crate::display::{Page, StatusIcon};
use crate::state::PrintEvent;
use crate::traits::Printer;

use super::Panel;

const COOL_DOWN: u16 = 0xF1;

impl<U: Uart, D: DelayNs> Panel<U, D> {
    pub(super) fn handle_temp_control<P: Printer>(&mut self, printer: &mut P, value: u16) {
        match value {
            0 => {
                self.state.info_showing = true;
                self.state.progress_showing = false;
            }
            3 => {
                self.state.fan_on = !self.state.fan_on;
                printer.set_fan(0, self.state.fan_on);
                self.link.page(Page::temperature(self.state.fan_on));
            }
            5 => {
                let preset = self.settings.pla;
                self.apply_preset(printer, preset);
            }
            6 => {
                let preset = self.settings.abs;
                self.apply_preset(printer, preset);
            }
            COOL_DOWN => {
                printer.set_all_fans(true);
                self.state.fan_on = true;
                printer.disable_heaters();
                self.link.number(NOZZLE_PREHEAT_ADDR, 0);
                self.link.number(BED_PREHEAT_ADDR, 0);
                self.link.status_icon(StatusIcon::Cooling);
                self.link.page(Page::TempFanOn);
                self.state.apply(PrintEvent::Cooldown);
            }
            _ => debug!("temp control value {} ignored", value),
        }
    }

    fn apply_preset<P: Printer>(&mut self, printer: &mut P, preset: PreheatPreset) {
        printer.set_hotend_target(preset.hotend);
        printer.set_bed_target(preset.bed);
        self.state.preheat_hotend = preset.hotend;
        self.link.signed(NOZZLE_PREHEAT_ADDR, i32::from(preset.hotend));
        self.link.signed(BED_PREHEAT_ADDR, i32::from(preset.bed));
    }

    pub(super) fn handle_manual_temp<P: Printer>(
        &mut self,
        printer: &mut P,
        field: TempField,
        value: u16,
    ) {
        match field {
            TempField::Both => match value {
                0 => self.link.page(Page::temperature(self.state.fan_on)),
                1 => {
                    printer.set_hotend_target(0);
                    self.link.number(NOZZLE_PREHEAT_ADDR, 0);
                }
                2 => {
                    printer.set_bed_target(0);
                    self.link.number(BED_PREHEAT_ADDR, 0);
                }
                _ => {}
            },
            TempField::Nozzle => {
                let target = clamp_target(value, printer.hotend_max());
                printer.set_hotend_target(target);
                self.link.signed(NOZZLE_PREHEAT_ADDR, i32::from(target));
            }
            TempField::Bed => {
                let target = clamp_target(value, printer.bed_max());
                printer.set_bed_target(target);
                self.link.signed(BED_PREHEAT_ADDR, i32::from(target));
            }
        }
    }
}

fn clamp_target(value: u16, max: i16) -> i16 {
    let value = i16::try_from(value).unwrap_or(i16::MAX);
    value.min(max).max(0)
}
