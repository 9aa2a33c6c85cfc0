//! Card file list

pub mod cache;

pub use cache::{
    centered, display_name, slot_address, FileEntry, FileListCache, MAX_DISPLAY_LEN, MAX_FILES,
};
