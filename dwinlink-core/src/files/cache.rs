//! File-list cache
//!
//! Holds the printable files of the card together with the display slot each
//! one is shown in. The list page has a fixed number of slots, so the cache
//! keeps the newest files only.

use heapless::{String, Vec};

use dwinlink_protocol::address::{FILE_SLOT_SIZE, SDFILE_ADDR};

use crate::traits::{CardReader, MAX_SHORT_NAME_LEN};

/// Slots on the file list page
pub const MAX_FILES: usize = 20;

/// Longest display name kept per entry
pub const MAX_DISPLAY_LEN: usize = 32;

/// Marker appended to names cut to the text width
const ELLIPSIS: &str = "~~";

const EXTENSIONS: [&str; 2] = [".gcode", ".GCODE"];

/// One cached file
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FileEntry {
    /// Name shown in the slot, without extension
    pub display_name: String<MAX_DISPLAY_LEN>,
    /// 8.3 name used to open the file
    pub short_name: String<MAX_SHORT_NAME_LEN>,
    /// Text variable address of the slot
    pub slot: u16,
}

/// Display slot address for cache index `index`
pub fn slot_address(index: usize) -> u16 {
    SDFILE_ADDR + FILE_SLOT_SIZE * index as u16
}

fn push_str_lossy<const N: usize>(out: &mut String<N>, text: &str) {
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
}

/// Display name for a long file name, or `None` if it is not G-code
///
/// The extension is dropped. Names that reach `width` characters are cut
/// to `width - 3` characters followed by `~~`.
pub fn display_name(long_name: &str, width: usize) -> Option<String<MAX_DISPLAY_LEN>> {
    // The stem needs at least one character
    let skip = long_name.char_indices().nth(1).map(|(i, _)| i)?;
    let rest = &long_name[skip..];
    let stem_end = EXTENSIONS.iter().filter_map(|ext| rest.find(ext)).min()? + skip;
    let stem = &long_name[..stem_end];

    let mut name = String::new();
    if stem.chars().count() >= width {
        let keep = width.saturating_sub(3);
        for c in stem.chars().take(keep) {
            if name.push(c).is_err() {
                break;
            }
        }
        push_str_lossy(&mut name, ELLIPSIS);
    } else {
        push_str_lossy(&mut name, stem);
    }
    Some(name)
}

/// Pad a name with leading spaces so it sits centred in `width`
pub fn centered(name: &str, width: usize) -> String<MAX_DISPLAY_LEN> {
    let len = name.chars().count();
    let mut out = String::new();
    if len < width {
        for _ in 0..(width - len) / 2 {
            let _ = out.push(' ');
        }
    }
    push_str_lossy(&mut out, name);
    out
}

/// Bounded cache of printable files
#[derive(Debug, Clone, Default)]
pub struct FileListCache {
    entries: Vec<FileEntry, MAX_FILES>,
    selected: Option<usize>,
}

impl FileListCache {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            selected: None,
        }
    }

    /// Re-read the card, newest files first
    ///
    /// Non G-code entries are skipped and do not use up a slot. Returns the
    /// number of cached files.
    pub fn rebuild<C: CardReader + ?Sized>(
        &mut self,
        card: &mut C,
        max_files: u8,
        text_width: u8,
    ) -> usize {
        self.clear();
        let cap = usize::from(max_files).min(MAX_FILES);
        let width = usize::from(text_width).min(MAX_DISPLAY_LEN);
        let count = card.file_count();

        for i in (0..count).rev() {
            if self.entries.len() >= cap {
                break;
            }
            let Some(entry) = card.file_entry(i) else {
                continue;
            };
            let Some(display_name) = display_name(entry.long_name, width) else {
                trace!("skipping non-gcode entry {}", i);
                continue;
            };

            let mut short_name = String::new();
            push_str_lossy(&mut short_name, entry.short_name);
            let slot = slot_address(self.entries.len());
            let _ = self.entries.push(FileEntry {
                display_name,
                short_name,
                slot,
            });
        }

        debug!("cached {} files", self.entries.len());
        self.entries.len()
    }

    /// Forget every entry and the selection
    pub fn clear(&mut self) {
        self.entries.clear();
        self.selected = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&FileEntry> {
        self.entries.get(index)
    }

    /// Select entry `number` (1-based), out-of-range numbers are ignored
    pub fn select(&mut self, number: u16) -> Option<usize> {
        let number = usize::from(number);
        if number == 0 || number > self.entries.len() {
            return None;
        }
        self.selected = Some(number - 1);
        self.selected
    }

    /// Index of the selected entry
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Find a cached file by its 8.3 name, ignoring case
    pub fn find_short(&self, short_name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.short_name.eq_ignore_ascii_case(short_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCard;
    use proptest::prelude::*;

    #[test]
    fn test_display_name_strips_extension() {
        assert_eq!(display_name("cube.gcode", 20).unwrap().as_str(), "cube");
        assert_eq!(display_name("BENCHY.GCODE", 20).unwrap().as_str(), "BENCHY");
    }

    #[test]
    fn test_display_name_multibyte_first_char() {
        assert_eq!(display_name("été.gcode", 20).unwrap().as_str(), "été");
        assert_eq!(display_name("ü.GCODE", 20).unwrap().as_str(), "ü");
    }

    #[test]
    fn test_display_name_rejects_other_files() {
        assert_eq!(display_name("notes.txt", 20), None);
        assert_eq!(display_name(".gcode", 20), None);
        assert_eq!(display_name("mixed.Gcode", 20), None);
    }

    #[test]
    fn test_display_name_truncates_at_width() {
        let name = display_name("a_really_long_model_name.gcode", 20).unwrap();
        assert_eq!(name.as_str(), "a_really_long_mod~~");

        // Exactly the width is also cut
        let name = display_name("abcdefghijklmnopqrst.gcode", 20).unwrap();
        assert_eq!(name.as_str(), "abcdefghijklmnopq~~");

        // One below fits
        let name = display_name("abcdefghijklmnopqrs.gcode", 20).unwrap();
        assert_eq!(name.as_str(), "abcdefghijklmnopqrs");
    }

    #[test]
    fn test_centered() {
        assert_eq!(centered("cube", 20).as_str(), "        cube");
        assert_eq!(centered("abcdefghijklmnopq~~", 20).as_str(), "abcdefghijklmnopq~~");
    }

    #[test]
    fn test_rebuild_newest_first_with_slots() {
        let mut card = MockCard::with_files(&["old.gcode", "readme.txt", "new.gcode"]);
        let mut cache = FileListCache::new();

        assert_eq!(cache.rebuild(&mut card, 20, 20), 2);
        assert_eq!(cache.entries()[0].display_name.as_str(), "new");
        assert_eq!(cache.entries()[0].slot, SDFILE_ADDR);
        assert_eq!(cache.entries()[1].display_name.as_str(), "old");
        assert_eq!(cache.entries()[1].slot, SDFILE_ADDR + 10);
    }

    #[test]
    fn test_rebuild_respects_cap() {
        let names: std::vec::Vec<std::string::String> =
            (0..21).map(|i| std::format!("part{}.gcode", i)).collect();
        let refs: std::vec::Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        let mut card = MockCard::with_files(&refs);
        let mut cache = FileListCache::new();

        assert_eq!(cache.rebuild(&mut card, 20, 20), 20);
        assert_eq!(cache.entries()[0].display_name.as_str(), "part20");
        assert_eq!(cache.entries()[19].display_name.as_str(), "part1");
    }

    #[test]
    fn test_skipped_files_do_not_use_slots() {
        let mut card = MockCard::with_files(&["a.gcode", "b.gcode", "c.stl", "d.stl"]);
        let mut cache = FileListCache::new();

        assert_eq!(cache.rebuild(&mut card, 1, 20), 1);
        assert_eq!(cache.entries()[0].display_name.as_str(), "b");
    }

    #[test]
    fn test_select_bounds() {
        let mut card = MockCard::with_files(&["a.gcode", "b.gcode"]);
        let mut cache = FileListCache::new();
        cache.rebuild(&mut card, 20, 20);

        assert_eq!(cache.select(0), None);
        assert_eq!(cache.select(3), None);
        assert_eq!(cache.selected(), None);
        assert_eq!(cache.select(2), Some(1));
        assert_eq!(cache.selected(), Some(1));
    }

    #[test]
    fn test_clear_drops_selection() {
        let mut card = MockCard::with_files(&["a.gcode"]);
        let mut cache = FileListCache::new();
        cache.rebuild(&mut card, 20, 20);
        cache.select(1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.selected(), None);
    }

    #[test]
    fn test_find_short_ignores_case() {
        let mut card = MockCard::with_files(&["a.gcode", "b.gcode"]);
        let mut cache = FileListCache::new();
        cache.rebuild(&mut card, 20, 20);

        let short = cache.entries()[1].short_name.clone();
        let lower: std::string::String = short.to_ascii_lowercase();
        assert_eq!(cache.find_short(&lower), Some(1));
    }

    proptest! {
        #[test]
        fn test_display_name_fits_width(
            stem in "[a-zA-Z0-9_ -]{1,40}",
            width in 3usize..=MAX_DISPLAY_LEN,
        ) {
            let long = std::format!("{}.gcode", stem);
            let name = display_name(&long, width).unwrap();
            prop_assert!(name.chars().count() < width);
            prop_assert!(centered(&name, width).chars().count() <= width);
        }
    }
}
