//! Print and filament phase machines
//!
//! The print phase drives which status icon and page the panel shows. All
//! transitions go through [`PrintPhase::transition`] so the handlers cannot
//! invent states the updater does not know about.

/// Print job phase as seen by the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PrintPhase {
    /// No job, heaters idle or holding
    #[default]
    Ready,
    /// Job started, waiting for the hotend to reach target
    Heating,
    /// Job running
    Printing,
    /// Job paused by the user or a runout
    Paused,
    /// Heaters switched off from the temperature page
    Cooling,
}

/// Inputs to the print phase machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PrintEvent {
    /// File selected or power-loss resume accepted
    StartPrint,
    /// Hotend reached target
    HeatReached,
    /// User pause or runout pause
    Pause,
    /// Resume confirmed
    Resume,
    /// Job cancelled
    Stop,
    /// Job returned from the finished page
    Finish,
    /// Cool-down requested
    Cooldown,
    /// Hotend below the cool-down threshold
    Cooled,
}

impl PrintPhase {
    /// A job exists (heating, printing or paused)
    pub fn job_active(&self) -> bool {
        matches!(
            self,
            PrintPhase::Heating | PrintPhase::Printing | PrintPhase::Paused
        )
    }

    /// Process an event and return the next phase
    pub fn transition(self, event: PrintEvent) -> Self {
        use PrintEvent::*;
        use PrintPhase::*;

        match (self, event) {
            (Ready, StartPrint) | (Cooling, StartPrint) | (Paused, StartPrint) => Heating,

            (Heating, HeatReached) => Printing,

            (Heating, Pause) | (Printing, Pause) => Paused,
            (Paused, Resume) => Printing,

            (Heating, Stop) | (Printing, Stop) | (Paused, Stop) => Ready,
            (Heating, Finish) | (Printing, Finish) | (Paused, Finish) => Ready,

            (Ready, Cooldown) => Cooling,
            (Cooling, Cooled) => Ready,

            // Default: stay in current phase
            _ => self,
        }
    }
}

/// Filament check sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilamentPhase {
    #[default]
    Idle,
    /// Sensor reported empty before a print started
    PrePrintCheck,
    /// Sensor reported empty while a job was paused or running
    MidPrintCheck,
    /// Sensor reported empty on the load/unload page
    ChangeFlow,
}

/// Inputs to the filament check machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilamentEvent {
    /// No filament when starting a print
    MissingAtStart,
    /// No filament during a job
    MissingMidPrint,
    /// No filament on the filament page
    MissingDuringChange,
    /// Filament confirmed and the blocked action went ahead
    Resolved,
    /// User backed out of the prompt
    Cancelled,
}

impl FilamentPhase {
    /// Process an event and return the next phase
    pub fn transition(self, event: FilamentEvent) -> Self {
        use FilamentEvent::*;
        use FilamentPhase::*;

        match (self, event) {
            (Idle, MissingAtStart) => PrePrintCheck,
            (Idle, MissingMidPrint) => MidPrintCheck,
            (Idle, MissingDuringChange) => ChangeFlow,

            // A re-check that still fails keeps the current prompt
            (PrePrintCheck, MissingAtStart)
            | (MidPrintCheck, MissingMidPrint)
            | (ChangeFlow, MissingDuringChange) => self,

            (_, Resolved) | (_, Cancelled) => Idle,

            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_lifecycle() {
        let phase = PrintPhase::Ready
            .transition(PrintEvent::StartPrint)
            .transition(PrintEvent::HeatReached);
        assert_eq!(phase, PrintPhase::Printing);

        let phase = phase.transition(PrintEvent::Pause);
        assert_eq!(phase, PrintPhase::Paused);

        let phase = phase.transition(PrintEvent::Resume);
        assert_eq!(phase, PrintPhase::Printing);

        assert_eq!(phase.transition(PrintEvent::Finish), PrintPhase::Ready);
    }

    #[test]
    fn test_stop_from_any_job_phase() {
        for phase in [PrintPhase::Heating, PrintPhase::Printing, PrintPhase::Paused] {
            assert_eq!(phase.transition(PrintEvent::Stop), PrintPhase::Ready);
        }
    }

    #[test]
    fn test_invalid_events_ignored() {
        assert_eq!(
            PrintPhase::Ready.transition(PrintEvent::Pause),
            PrintPhase::Ready
        );
        assert_eq!(
            PrintPhase::Ready.transition(PrintEvent::Resume),
            PrintPhase::Ready
        );
        assert_eq!(
            PrintPhase::Printing.transition(PrintEvent::Cooldown),
            PrintPhase::Printing
        );
    }

    #[test]
    fn test_cooling_cycle() {
        let phase = PrintPhase::Ready.transition(PrintEvent::Cooldown);
        assert_eq!(phase, PrintPhase::Cooling);
        assert_eq!(phase.transition(PrintEvent::Cooled), PrintPhase::Ready);
        assert_eq!(
            phase.transition(PrintEvent::StartPrint),
            PrintPhase::Heating
        );
    }

    #[test]
    fn test_job_active() {
        assert!(!PrintPhase::Ready.job_active());
        assert!(PrintPhase::Heating.job_active());
        assert!(PrintPhase::Paused.job_active());
        assert!(!PrintPhase::Cooling.job_active());
    }

    #[test]
    fn test_filament_checks() {
        let phase = FilamentPhase::Idle.transition(FilamentEvent::MissingAtStart);
        assert_eq!(phase, FilamentPhase::PrePrintCheck);
        assert_eq!(
            phase.transition(FilamentEvent::MissingAtStart),
            FilamentPhase::PrePrintCheck
        );
        assert_eq!(phase.transition(FilamentEvent::Resolved), FilamentPhase::Idle);

        let phase = FilamentPhase::Idle.transition(FilamentEvent::MissingMidPrint);
        assert_eq!(phase, FilamentPhase::MidPrintCheck);
        assert_eq!(phase.transition(FilamentEvent::Cancelled), FilamentPhase::Idle);
    }
}
