//! Printer collaborator traits
//!
//! The panel engine never touches the SD filesystem, planner or heaters
//! directly. Boards implement these traits over their own firmware services
//! and pass a single [`Printer`] into [`crate::Panel::update`].

pub mod card;
pub mod machine;
pub mod recovery;

pub use card::{CardReader, DirEntry};
pub use machine::{Axis, CommandQueue, Fans, FilamentSensor, JobTimer, Motion, Thermal};
pub use recovery::{PowerLossRecovery, RecoveryRecord, MAX_SHORT_NAME_LEN};

use dwinlink_hal::SettingsStorage;

/// Everything the coordinator needs from the printer
pub trait Printer:
    CardReader
    + CommandQueue
    + Thermal
    + Motion
    + JobTimer
    + Fans
    + FilamentSensor
    + PowerLossRecovery
    + SettingsStorage
{
}

impl<T> Printer for T where
    T: CardReader
        + CommandQueue
        + Thermal
        + Motion
        + JobTimer
        + Fans
        + FilamentSensor
        + PowerLossRecovery
        + SettingsStorage
{
}
