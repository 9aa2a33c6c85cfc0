//! Panel state machines
//!
//! The print phase, the filament check sub-state and the input-blocking wait
//! tracker, gathered into one [`CoordinatorState`].

pub mod coordinator;
pub mod phase;
pub mod wait;

pub use coordinator::{
    AxisUnit, CoordinatorState, Echoed, HeatGate, PendingExtrude, Startup, MAX_COMMAND_LEN,
    STARTUP_END,
};
pub use phase::{FilamentEvent, FilamentPhase, PrintEvent, PrintPhase};
pub use wait::{MachineIdle, WaitOutcome, WaitReason, WaitTracker};
