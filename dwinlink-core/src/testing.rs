//! Host-side mocks for unit and scenario tests

use std::collections::{HashMap, VecDeque};
use std::format;
use std::string::{String, ToString};
use std::vec::Vec;

use dwinlink_hal::{SettingsStorage, StorageError, StorageKey, UartRx, UartTx};
use dwinlink_protocol::{Command, Frame, Value, ValueKind};

use crate::traits::{
    Axis, CardReader, CommandQueue, DirEntry, Fans, FilamentSensor, JobTimer, Motion,
    PowerLossRecovery, RecoveryRecord, Thermal,
};

/// Transport failure raised by [`LoopbackUart`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteFailed;

/// UART that records transmitted bytes and replays injected ones
#[derive(Debug, Default)]
pub struct LoopbackUart {
    sent: Vec<u8>,
    incoming: VecDeque<u8>,
    pub fail_writes: bool,
}

impl LoopbackUart {
    pub fn sent(&self) -> &[u8] {
        &self.sent
    }

    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }

    /// Queue bytes for the receive side
    pub fn inject(&mut self, bytes: &[u8]) {
        self.incoming.extend(bytes.iter().copied());
    }

    /// Queue a touch report (`0x83` read-variable response) for one word
    pub fn inject_touch(&mut self, address: u16, value: u16) {
        let mut frame = Frame::new(Command::ReadVariable, address, &value.to_be_bytes()).unwrap();
        frame.byte_length = 1;
        self.inject(&frame.encode_to_vec().unwrap());
    }

    /// Decode every transmitted frame
    pub fn sent_frames(&self) -> Vec<Frame> {
        let mut frames = Vec::new();
        let mut pos = 0;
        while pos + 3 <= self.sent.len() {
            let end = (pos + 3 + self.sent[pos + 2] as usize).min(self.sent.len());
            if let Ok(dwinlink_protocol::Decoded::Frame(frame)) =
                Frame::decode(&self.sent[pos..end])
            {
                frames.push(frame);
            }
            pos = end;
        }
        frames
    }

    /// Page numbers switched to, in order
    pub fn pages(&self) -> Vec<u8> {
        self.sent_frames()
            .iter()
            .filter(|f| f.address == dwinlink_protocol::address::EXCHANGE_PAGE_ADDR)
            .filter_map(|f| f.data.get(3).copied())
            .collect()
    }

    /// Last word written to `address`
    pub fn last_word(&self, address: u16) -> Option<u16> {
        self.sent_frames()
            .iter()
            .rev()
            .find(|f| f.address == address)
            .and_then(|f| f.word(0))
    }

    /// Last text written to `address`
    pub fn last_text(&self, address: u16) -> Option<String> {
        self.sent_frames()
            .iter()
            .rev()
            .find(|f| f.address == address)
            .and_then(|f| match f.value(ValueKind::Str) {
                Some(Value::Str(text)) => Some(text.to_string()),
                _ => None,
            })
    }
}

impl UartTx for LoopbackUart {
    type Error = WriteFailed;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(WriteFailed);
        }
        self.sent.push(byte);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl UartRx for LoopbackUart {
    type Error = WriteFailed;

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        Ok(self.incoming.pop_front())
    }
}

/// Settings store backed by a map
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<u8, Vec<u8>>,
    pub writes: u32,
}

impl SettingsStorage for MemoryStorage {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let value = self.values.get(&key.as_u8()).ok_or(StorageError::NotFound)?;
        if value.len() > buffer.len() {
            return Err(StorageError::BufferTooSmall);
        }
        buffer[..value.len()].copy_from_slice(value);
        Ok(value.len())
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        self.values.insert(key.as_u8(), data.to_vec());
        self.writes += 1;
        Ok(())
    }
}

/// Card with an in-memory directory
#[derive(Debug, Default)]
pub struct MockCard {
    /// (long name, short name), oldest first
    pub files: Vec<(String, String)>,
    pub inserted: bool,
    pub mounted: bool,
    pub printing: bool,
    pub percent: u8,
    pub stops: u32,
    pub pauses: u32,
    pub resumes: u32,
}

impl MockCard {
    /// Inserted, mounted card holding `names`
    pub fn with_files(names: &[&str]) -> Self {
        let files = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), format!("FILE{}.GCO", i)))
            .collect();
        Self {
            files,
            inserted: true,
            mounted: true,
            ..Self::default()
        }
    }
}

impl CardReader for MockCard {
    fn card_inserted(&mut self) -> bool {
        self.inserted
    }

    fn card_mounted(&self) -> bool {
        self.mounted
    }

    fn mount_card(&mut self) -> bool {
        self.mounted = self.inserted;
        self.mounted
    }

    fn release_card(&mut self) {
        self.mounted = false;
    }

    fn file_count(&mut self) -> u16 {
        self.files.len() as u16
    }

    fn file_entry(&mut self, index: u16) -> Option<DirEntry<'_>> {
        self.files.get(usize::from(index)).map(|(long, short)| DirEntry {
            long_name: long.as_str(),
            short_name: short.as_str(),
        })
    }

    fn card_printing(&self) -> bool {
        self.printing
    }

    fn percent_done(&self) -> u8 {
        self.percent
    }

    fn pause_print(&mut self) {
        self.printing = false;
        self.pauses += 1;
    }

    fn resume_print(&mut self) {
        self.printing = true;
        self.resumes += 1;
    }

    fn stop_print(&mut self) {
        self.printing = false;
        self.stops += 1;
    }
}

/// Whole-printer mock recording every collaborator call
#[derive(Debug)]
pub struct MockPrinter {
    pub card: MockCard,
    pub storage: MemoryStorage,
    /// Every enqueued G-code line
    pub gcode: Vec<String>,
    /// Queue reports pending commands
    pub busy: bool,
    pub queue_clears: u32,
    pub hotend: (i16, i16),
    pub bed: (i16, i16),
    pub heaters_disabled: u32,
    pub homed: bool,
    pub positions: [i32; 4],
    pub moves: Vec<(Axis, i32)>,
    pub extrusions: Vec<(u8, i32)>,
    pub quickstops: u32,
    pub babysteps: i32,
    pub leveling: bool,
    pub feedrate: u16,
    pub elapsed: u32,
    pub timer_running: bool,
    pub timer_resets: u32,
    pub fans: [bool; 2],
    pub filament: bool,
    pub recovery: Option<RecoveryRecord>,
    pub recovery_invalidated: bool,
}

impl Default for MockPrinter {
    fn default() -> Self {
        Self {
            card: MockCard::with_files(&["cube.gcode", "benchy.gcode"]),
            storage: MemoryStorage::default(),
            gcode: Vec::new(),
            busy: false,
            queue_clears: 0,
            hotend: (25, 0),
            bed: (25, 0),
            heaters_disabled: 0,
            homed: true,
            positions: [0; 4],
            moves: Vec::new(),
            extrusions: Vec::new(),
            quickstops: 0,
            babysteps: 0,
            leveling: false,
            feedrate: 100,
            elapsed: 0,
            timer_running: false,
            timer_resets: 0,
            fans: [false; 2],
            filament: true,
            recovery: None,
            recovery_invalidated: false,
        }
    }
}

impl MockPrinter {
    pub fn has_gcode(&self, line: &str) -> bool {
        self.gcode.iter().any(|g| g == line)
    }
}

impl CardReader for MockPrinter {
    fn card_inserted(&mut self) -> bool {
        self.card.card_inserted()
    }
    fn card_mounted(&self) -> bool {
        self.card.card_mounted()
    }
    fn mount_card(&mut self) -> bool {
        self.card.mount_card()
    }
    fn release_card(&mut self) {
        self.card.release_card()
    }
    fn file_count(&mut self) -> u16 {
        self.card.file_count()
    }
    fn file_entry(&mut self, index: u16) -> Option<DirEntry<'_>> {
        self.card.file_entry(index)
    }
    fn card_printing(&self) -> bool {
        self.card.card_printing()
    }
    fn percent_done(&self) -> u8 {
        self.card.percent_done()
    }
    fn pause_print(&mut self) {
        self.card.pause_print()
    }
    fn resume_print(&mut self) {
        self.card.resume_print()
    }
    fn stop_print(&mut self) {
        self.card.stop_print()
    }
}

impl CommandQueue for MockPrinter {
    fn enqueue(&mut self, command: &str) -> bool {
        self.gcode.push(command.to_string());
        true
    }

    fn clear_queue(&mut self) {
        self.queue_clears += 1;
        self.busy = false;
    }

    fn has_commands(&self) -> bool {
        self.busy
    }
}

impl Thermal for MockPrinter {
    fn hotend_temp(&self) -> i16 {
        self.hotend.0
    }
    fn hotend_target(&self) -> i16 {
        self.hotend.1
    }
    fn set_hotend_target(&mut self, celsius: i16) {
        self.hotend.1 = celsius;
    }
    fn bed_temp(&self) -> i16 {
        self.bed.0
    }
    fn bed_target(&self) -> i16 {
        self.bed.1
    }
    fn set_bed_target(&mut self, celsius: i16) {
        self.bed.1 = celsius;
    }
    fn hotend_max(&self) -> i16 {
        260
    }
    fn bed_max(&self) -> i16 {
        110
    }
    fn disable_heaters(&mut self) {
        self.hotend.1 = 0;
        self.bed.1 = 0;
        self.heaters_disabled += 1;
    }
}

fn axis_index(axis: Axis) -> usize {
    match axis {
        Axis::X => 0,
        Axis::Y => 1,
        Axis::Z => 2,
        Axis::E => 3,
    }
}

impl Motion for MockPrinter {
    fn position_known(&self) -> bool {
        self.homed
    }
    fn position(&self, axis: Axis) -> i32 {
        self.positions[axis_index(axis)]
    }
    fn move_axis(&mut self, axis: Axis, tenths: i32) {
        self.positions[axis_index(axis)] = tenths;
        self.moves.push((axis, tenths));
    }
    fn extrude(&mut self, extruder: u8, tenths: i32) {
        self.extrusions.push((extruder, tenths));
    }
    fn quickstop(&mut self) {
        self.quickstops += 1;
    }
    fn synchronize(&mut self) {}
    fn babystep_z(&mut self, steps: i32) {
        self.babysteps += steps;
    }
    fn leveling_active(&self) -> bool {
        self.leveling
    }
    fn set_leveling(&mut self, enabled: bool) {
        self.leveling = enabled;
    }
    fn feedrate_percent(&self) -> u16 {
        self.feedrate
    }
    fn set_feedrate_percent(&mut self, percent: u16) {
        self.feedrate = percent;
    }
}

impl JobTimer for MockPrinter {
    fn elapsed_s(&self) -> u32 {
        self.elapsed
    }
    fn timer_running(&self) -> bool {
        self.timer_running
    }
    fn timer_start(&mut self) {
        self.timer_running = true;
    }
    fn timer_pause(&mut self) {
        self.timer_running = false;
    }
    fn timer_reset(&mut self) {
        self.timer_running = false;
        self.elapsed = 0;
        self.timer_resets += 1;
    }
}

impl Fans for MockPrinter {
    fn fan_count(&self) -> u8 {
        2
    }
    fn set_fan(&mut self, index: u8, on: bool) {
        if let Some(fan) = self.fans.get_mut(usize::from(index)) {
            *fan = on;
        }
    }
}

impl FilamentSensor for MockPrinter {
    fn filament_present(&mut self) -> bool {
        self.filament
    }
}

impl PowerLossRecovery for MockPrinter {
    fn recovery_record(&self) -> Option<RecoveryRecord> {
        if self.recovery_invalidated {
            None
        } else {
            self.recovery.clone()
        }
    }

    fn invalidate_recovery(&mut self) {
        self.recovery_invalidated = true;
    }
}

impl SettingsStorage for MockPrinter {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        self.storage.read(key, buffer)
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        self.storage.write(key, data)
    }
}
