//! Leveling, Z-offset and jog handlers

use embedded_hal::delay::DelayNs;

use dwinlink_hal::Uart;
use dwinlink_protocol::address::{
    AUTOLEVEL_GRID_ICON_ADDR, DISPLAY_X_ADDR, DISPLAY_Y_ADDR, DISPLAY_Z_ADDR,
    FILENAME_ICON_ADDR,
};
use dwinlink_protocol::AxisKey;

use crate::display::Page;
use crate::state::{AxisUnit, WaitReason};
use crate::traits::{Axis, Printer};

use super::print::MOTORS_ENGAGED;
use super::{enqueue, enqueue_fmt, Panel};

/// Leveling icon values
pub(super) const LEVELING_ON: u32 = 2;
pub(super) const LEVELING_OFF: u32 = 3;

/// Inset of the corner leveling points from the bed edge (mm)
const CORNER_INSET_MM: i32 = 30;

/// Z-offset step of the +/- buttons (hundredths of a mm)
const Z_OFFSET_STEP: i32 = 10;

/// Autohome value of the home key
const HOME_ALL: u16 = 3;

impl<U: Uart, D: DelayNs> Panel<U, D> {
    /// Absolute Z-offset write, hundredths of a mm as 16-bit two's complement
    pub(super) fn handle_z_offset<P: Printer>(&mut self, printer: &mut P, value: u16) {
        let offset = i32::from(value as i16);
        if !self.set_z_offset(printer, offset) {
            warn!("z offset {} out of range", offset);
        }
    }

    /// Babystep to `offset` and persist it; out-of-range offsets are rejected
    fn set_z_offset<P: Printer>(&mut self, printer: &mut P, offset: i32) -> bool {
        if !self.config.z_offset_in_range(offset) {
            return false;
        }
        let delta = offset - i32::from(self.settings.z_offset);
        printer.babystep_z(self.config.babystep_steps_per_mm * delta / 100);
        // In range implies it fits
        self.settings.z_offset = offset as i16;
        self.echo_z_offset();
        self.save_settings(printer);
        true
    }

    pub(super) fn handle_bed_level<P: Printer>(&mut self, printer: &mut P, value: u16) {
        match value {
            1 => {
                if printer.position_known() {
                    enqueue(printer, "G28 Z0");
                } else {
                    enqueue(printer, "G28");
                }
                printer.set_leveling(false);
                enqueue(printer, "G1 F150 Z0.0");
                self.send_leveling_icon(LEVELING_OFF);
                self.echo_z_offset();
            }
            2 => {
                let offset = i32::from(self.settings.z_offset) + Z_OFFSET_STEP;
                self.set_z_offset(printer, offset);
            }
            3 => {
                let offset = i32::from(self.settings.z_offset) - Z_OFFSET_STEP;
                self.set_z_offset(printer, offset);
            }
            4 => {
                self.state.wait.set(WaitReason::Homing);
                enqueue(printer, "G28 X0 Y0 Z0");
                enqueue(printer, "G90");
                printer.set_leveling(false);
                enqueue(printer, "G1 F200 Z0.0");
                self.send_leveling_icon(LEVELING_OFF);
                self.link.page(Page::AssistLevel);
            }
            5 => {
                self.state.wait.set(WaitReason::AutoLeveling);
                self.link.number(AUTOLEVEL_GRID_ICON_ADDR, 1);
                self.link.page(Page::AutoLevelWait);
                enqueue(printer, "G29");
                printer.set_leveling(false);
                let (x, y) = self.bed_centre();
                enqueue(printer, "G1 F100 Z10.2");
                enqueue_fmt(printer, format_args!("G1 X{} Y{} F5000", x, y));
                enqueue(printer, "G1 F100 Z0.0");
                self.send_leveling_icon(LEVELING_OFF);
            }
            6..=10 => {
                let (x, y) = self.level_point(value);
                self.state.wait.set(WaitReason::Homing);
                enqueue(printer, "G1 F100 Z3");
                enqueue_fmt(printer, format_args!("G1 X{} Y{} F5000", x, y));
                enqueue(printer, "G1 F100 Z0");
            }
            11 => {
                let enabled = !self.settings.leveling_enabled;
                self.settings.leveling_enabled = enabled;
                if enabled {
                    enqueue(printer, "M420 S1");
                    self.send_leveling_icon(LEVELING_ON);
                } else {
                    enqueue(printer, "M420 S0");
                    self.send_leveling_icon(LEVELING_OFF);
                }
                self.save_settings(printer);
                self.echo_z_offset();
            }
            _ => {
                debug!("bed level value {} ignored", value);
                return;
            }
        }
        self.link.number(FILENAME_ICON_ADDR, MOTORS_ENGAGED);
    }

    /// Bed centre in whole mm
    fn bed_centre(&self) -> (i32, i32) {
        let x = (self.config.x_limits.min + self.config.x_limits.max) / 20;
        let y = (self.config.y_limits.min + self.config.y_limits.max) / 20;
        (x, y)
    }

    /// Manual leveling point: centre, then the corners counter-clockwise
    fn level_point(&self, value: u16) -> (i32, i32) {
        let x_max = self.config.x_limits.max / 10 - CORNER_INSET_MM;
        let y_max = self.config.y_limits.max / 10 - CORNER_INSET_MM;
        match value {
            7 => (CORNER_INSET_MM, CORNER_INSET_MM),
            8 => (x_max, CORNER_INSET_MM),
            9 => (x_max, y_max),
            10 => (CORNER_INSET_MM, y_max),
            _ => self.bed_centre(),
        }
    }

    pub(super) fn handle_axis<P: Printer>(&mut self, printer: &mut P, key: AxisKey, value: u16) {
        let axis = match key {
            AxisKey::Home => {
                if value == HOME_ALL {
                    self.state.wait.set(WaitReason::Moving);
                    enqueue(printer, "G28");
                    enqueue(printer, "G1 F100 Z10.2");
                    self.state.info_showing = true;
                    self.state.autohome_icon = Some(0);
                    self.state.extra_delay = false;
                    self.link.page(Page::Autohome);
                    self.link.number(FILENAME_ICON_ADDR, MOTORS_ENGAGED);
                } else {
                    self.state.axis_unit = AxisUnit::from_wire(value);
                }
                return;
            }
            AxisKey::X => Axis::X,
            AxisKey::Y => Axis::Y,
            AxisKey::Z => Axis::Z,
        };

        // Data is the target in tenths of a mm
        let target = self.config.limits(axis).clamp(i32::from(value));
        printer.move_axis(axis, target);
        if axis == Axis::Z {
            self.echo_positions(printer);
        }
        self.link.number(FILENAME_ICON_ADDR, MOTORS_ENGAGED);
    }

    /// Echo X/Y/Z in tenths of a mm
    pub(super) fn echo_positions<P: Printer>(&mut self, printer: &mut P) {
        self.link.signed(DISPLAY_X_ADDR, printer.position(Axis::X));
        self.link.signed(DISPLAY_Y_ADDR, printer.position(Axis::Y));
        self.link.signed(DISPLAY_Z_ADDR, printer.position(Axis::Z));
    }
}
