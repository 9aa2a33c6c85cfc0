//! Motion, thermal and job traits

/// G-code command queue
pub trait CommandQueue {
    /// Append one command line, returns false if the queue is full
    fn enqueue(&mut self, command: &str) -> bool;

    /// Drop every queued command
    fn clear_queue(&mut self);

    /// Commands are still waiting or executing
    fn has_commands(&self) -> bool;
}

/// Heater targets and readings in whole degrees Celsius
pub trait Thermal {
    fn hotend_temp(&self) -> i16;
    fn hotend_target(&self) -> i16;
    fn set_hotend_target(&mut self, celsius: i16);

    fn bed_temp(&self) -> i16;
    fn bed_target(&self) -> i16;
    fn set_bed_target(&mut self, celsius: i16);

    /// Highest target the hotend accepts
    fn hotend_max(&self) -> i16;

    /// Highest target the bed accepts
    fn bed_max(&self) -> i16;

    /// Zero every heater target
    fn disable_heaters(&mut self);
}

/// Machine axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X,
    Y,
    Z,
    E,
}

/// Motion planner
///
/// Positions are in tenths of a millimetre.
pub trait Motion {
    /// All axes have been homed since power-up
    fn position_known(&self) -> bool;

    /// Current logical position of `axis`
    fn position(&self, axis: Axis) -> i32;

    /// Plan a straight move of one axis to `tenths`
    ///
    /// Implementations skip the move when the planner is full.
    fn move_axis(&mut self, axis: Axis, tenths: i32);

    /// Relative extruder move on `extruder`, negative retracts
    fn extrude(&mut self, extruder: u8, tenths: i32);

    /// Abort all planned moves immediately
    fn quickstop(&mut self);

    /// Block until the planner is empty
    fn synchronize(&mut self);

    /// Nudge Z by a number of microsteps without changing the position
    fn babystep_z(&mut self, steps: i32);

    fn leveling_active(&self) -> bool;
    fn set_leveling(&mut self, enabled: bool);

    /// Feed-rate override in percent
    fn feedrate_percent(&self) -> u16;
    fn set_feedrate_percent(&mut self, percent: u16);
}

/// Print job timer
pub trait JobTimer {
    /// Elapsed printing time in seconds
    fn elapsed_s(&self) -> u32;
    fn timer_running(&self) -> bool;
    fn timer_start(&mut self);
    fn timer_pause(&mut self);
    fn timer_reset(&mut self);
}

/// Part cooling fans
pub trait Fans {
    fn fan_count(&self) -> u8;

    /// Switch one fan fully on or off
    fn set_fan(&mut self, index: u8, on: bool);

    fn set_all_fans(&mut self, on: bool) {
        for index in 0..self.fan_count() {
            self.set_fan(index, on);
        }
    }
}

/// Filament runout switch
pub trait FilamentSensor {
    /// Sample the switch, true when filament is loaded
    fn filament_present(&mut self) -> bool;
}
