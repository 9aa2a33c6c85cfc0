//! SD card reader trait

/// One directory entry as reported by the card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry<'a> {
    /// Long (VFAT) name including extension
    pub long_name: &'a str,
    /// 8.3 name used to open the file
    pub short_name: &'a str,
}

/// Card reader and SD print job control
pub trait CardReader {
    /// Card detect switch state
    fn card_inserted(&mut self) -> bool;

    /// Filesystem is mounted and readable
    fn card_mounted(&self) -> bool;

    /// Try to mount the card, returns true on success
    fn mount_card(&mut self) -> bool;

    /// Unmount after removal
    fn release_card(&mut self);

    /// Number of entries in the working directory
    fn file_count(&mut self) -> u16;

    /// Entry at `index` in directory order (oldest first)
    fn file_entry(&mut self, index: u16) -> Option<DirEntry<'_>>;

    /// An SD print is running (not paused)
    fn card_printing(&self) -> bool;

    /// Progress of the running file, 0..=100
    fn percent_done(&self) -> u8;

    /// Pause reading the print file
    fn pause_print(&mut self);

    /// Continue reading the print file
    fn resume_print(&mut self);

    /// Abort the print file
    fn stop_print(&mut self);
}
