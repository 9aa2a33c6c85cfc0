//! Pending multi-step operations
//!
//! While a wait reason is set the panel drops every touch frame. Each reason
//! knows which machine condition ends it; [`WaitTracker::poll`] is called once
//! per update tick.

/// Why touch input is currently blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitReason {
    /// User pause, waiting for the park sequence
    Pausing,
    /// Homing or a leveling move
    Homing,
    /// Probing the mesh
    AutoLeveling,
    /// Autohome from the move page
    Moving,
    /// Runout pause, waiting for the park sequence
    RunoutPause,
    /// Job cancel
    Stopping,
    /// Remaining moves after leveling
    Draining,
}

/// Machine conditions a wait can depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineIdle {
    /// All axes homed
    pub position_known: bool,
    /// Command queue drained
    pub queue_empty: bool,
}

impl WaitReason {
    /// The operation behind this wait has finished
    pub fn is_complete(self, idle: MachineIdle) -> bool {
        match self {
            WaitReason::Pausing => idle.position_known,
            WaitReason::Homing | WaitReason::RunoutPause => {
                idle.position_known && idle.queue_empty
            }
            WaitReason::AutoLeveling => idle.queue_empty,
            WaitReason::Moving | WaitReason::Stopping | WaitReason::Draining => idle.queue_empty,
        }
    }
}

/// Outcome of one wait poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitOutcome {
    /// Nothing pending
    Idle,
    /// Still waiting
    Pending(WaitReason),
    /// The wait finished normally
    Completed(WaitReason),
    /// The wait was force-cleared after idling too long
    Released(WaitReason),
}

/// Current wait plus the stall counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WaitTracker {
    reason: Option<WaitReason>,
    idle_ticks: u16,
}

impl WaitTracker {
    pub const fn new() -> Self {
        Self {
            reason: None,
            idle_ticks: 0,
        }
    }

    pub fn reason(&self) -> Option<WaitReason> {
        self.reason
    }

    pub fn is_waiting(&self) -> bool {
        self.reason.is_some()
    }

    /// Block input until `reason` completes
    pub fn set(&mut self, reason: WaitReason) {
        debug!("wait set: {:?}", reason);
        self.reason = Some(reason);
        self.idle_ticks = 0;
    }

    pub fn clear(&mut self) {
        if let Some(reason) = self.reason.take() {
            debug!("wait cleared: {:?}", reason);
        }
        self.idle_ticks = 0;
    }

    /// Check the pending wait against the machine
    ///
    /// A wait that sees an empty queue on more than `stall_limit`
    /// consecutive polls is released even if its condition never holds.
    pub fn poll(&mut self, idle: MachineIdle, stall_limit: u16) -> WaitOutcome {
        let Some(reason) = self.reason else {
            return WaitOutcome::Idle;
        };

        if idle.queue_empty {
            self.idle_ticks = self.idle_ticks.saturating_add(1);
        } else {
            self.idle_ticks = 0;
        }

        if self.idle_ticks > stall_limit {
            warn!("wait {:?} stalled, releasing", reason);
            self.reason = None;
            self.idle_ticks = 0;
            return WaitOutcome::Released(reason);
        }

        if reason.is_complete(idle) {
            self.reason = None;
            self.idle_ticks = 0;
            WaitOutcome::Completed(reason)
        } else {
            WaitOutcome::Pending(reason)
        }
    }
}
