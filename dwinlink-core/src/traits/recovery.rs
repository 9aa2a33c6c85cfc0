//! Power-loss recovery record

use heapless::String;

/// Longest 8.3 short name including the dot
pub const MAX_SHORT_NAME_LEN: usize = 13;

/// Snapshot written by the firmware while printing
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RecoveryRecord {
    /// Short name of the file that was printing
    pub file: String<MAX_SHORT_NAME_LEN>,
    pub hotend_target: i16,
    pub bed_target: i16,
    /// Active tool when power was lost
    pub extruder: u8,
}

/// Access to the power-loss recovery record
pub trait PowerLossRecovery {
    /// The saved record, if one is valid
    fn recovery_record(&self) -> Option<RecoveryRecord>;

    /// Mark the record invalid so it is not offered again
    fn invalidate_recovery(&mut self);
}
