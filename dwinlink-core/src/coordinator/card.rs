//! Card insertion and the file list page

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use heapless::String;

use dwinlink_hal::Uart;
use dwinlink_protocol::address::{
    CHOOSE_FILENAME_ADDR, FILENAME_COUNT_ADDR, FILENAME_ICON1_ADDR, FILENAME_ICON_ADDR,
    FILENAME_NATURE_ADDR, FILE_SLOT_SIZE, PRINT_FILENAME_ADDR,
};
use dwinlink_protocol::FileKey;

use crate::display::{Page, StatusIcon};
use crate::files::{centered, slot_address};
use crate::traits::Printer;

use super::Panel;

/// Text colour of the selected entry
const COLOUR_SELECTED: u32 = 0x87F0;
/// Text colour of the other entries
const COLOUR_NORMAL: u32 = 0xFFFF;

/// Slot icon values
const SLOT_ICON_FILE: u32 = 1;
const SLOT_ICON_SELECTED: u32 = 6;
const SLOT_ICON_BLANK: u32 = 10;

/// Stride between per-slot colour variables
const NATURE_STRIDE: u16 = 16;

fn nature_address(number: usize) -> u16 {
    FILENAME_NATURE_ADDR + NATURE_STRIDE * number as u16
}

impl<U: Uart, D: DelayNs> Panel<U, D> {
    /// Follow card detect and redraw the list when asked to
    pub(super) fn refresh_card<P: Printer>(&mut self, printer: &mut P) {
        let inserted = printer.card_inserted();
        if inserted != self.state.card_present {
            self.state.card_present = inserted;
            if inserted {
                info!("card inserted");
                self.load_card_list(printer);
            } else {
                info!("card removed");
                printer.release_card();
                if self.state.card_check {
                    self.stop_job(printer);
                    self.state.card_check = false;
                }
                self.link.status_icon(StatusIcon::CardRemoved);
                self.blank_file_list();
            }
        }

        if self.state.refresh_list && self.state.card_present && printer.card_mounted() {
            self.state.refresh_list = false;
            self.link.clear_words(CHOOSE_FILENAME_ADDR, FILE_SLOT_SIZE);
            self.link.clear_words(FILENAME_COUNT_ADDR, 8);
            for i in 0..self.files.len() {
                self.send_slot(i);
                self.link.number(nature_address(i + 1), COLOUR_NORMAL);
                self.link
                    .number(FILENAME_ICON1_ADDR + i as u16 + 1, SLOT_ICON_BLANK);
            }
        }
    }

    /// Mount the card, rebuild the cache and fill the slots
    pub(super) fn load_card_list<P: Printer>(&mut self, printer: &mut P) {
        if !printer.card_mounted() && !printer.mount_card() {
            warn!("card mount failed");
            self.link.status_icon(StatusIcon::CardRemoved);
            return;
        }

        self.files
            .rebuild(printer, self.config.max_files, self.config.text_width);
        for i in 0..self.files.len() {
            self.send_slot(i);
        }
        self.link.status_icon(StatusIcon::Ready);
    }

    fn send_slot(&mut self, index: usize) {
        if let Some(entry) = self.files.get(index) {
            let slot = entry.slot;
            let name = entry.display_name.clone();
            self.link.text(slot, &name);
            self.link
                .number(FILENAME_ICON_ADDR + index as u16 + 1, SLOT_ICON_FILE);
        }
    }

    /// Blank every slot and forget the cache
    pub(super) fn blank_file_list(&mut self) {
        for i in 0..self.files.len() {
            self.link.clear_words(slot_address(i), FILE_SLOT_SIZE);
            self.link.number(nature_address(i + 1), COLOUR_NORMAL);
        }
        self.link.clear_words(PRINT_FILENAME_ADDR, FILE_SLOT_SIZE);
        self.link.clear_words(CHOOSE_FILENAME_ADDR, FILE_SLOT_SIZE);
        self.link.clear_words(FILENAME_COUNT_ADDR, 8);
        for j in 1..=u16::from(self.config.max_files) {
            self.link.number(FILENAME_ICON_ADDR + j, SLOT_ICON_BLANK);
            self.link.number(FILENAME_ICON1_ADDR + j, SLOT_ICON_BLANK);
        }
        self.files.clear();
    }

    pub(super) fn handle_filename<P: Printer>(&mut self, printer: &mut P, key: FileKey, value: u16) {
        match key {
            FileKey::Choose => self.choose_file(printer, value),
            FileKey::Play => match value {
                1 => {
                    if !printer.card_mounted() {
                        return;
                    }
                    match self.files.selected() {
                        Some(index) => self.start_print(printer, index),
                        None => debug!("play without selection"),
                    }
                }
                0 => {
                    self.state.info_showing = true;
                    self.state.progress_showing = false;
                    self.link.page(Page::Main);
                }
                _ => debug!("play value {} ignored", value),
            },
            FileKey::Other => trace!("file block write {} ignored", value),
        }
    }

    fn choose_file<P: Printer>(&mut self, printer: &mut P, number: u16) {
        if !printer.card_mounted() {
            return;
        }
        let Some(index) = self.files.select(number) else {
            debug!("file {} out of range", number);
            return;
        };

        let width = usize::from(self.config.text_width);
        let name = match self.files.get(index) {
            Some(entry) => centered(&entry.display_name, width),
            None => return,
        };
        self.link.clear_words(CHOOSE_FILENAME_ADDR, FILE_SLOT_SIZE);
        self.link.text(CHOOSE_FILENAME_ADDR, &name);

        let mut count: String<12> = String::new();
        let _ = write!(count, "{}/{}", number, self.files.len());
        self.link.clear_words(FILENAME_COUNT_ADDR, 8);
        self.link.text(FILENAME_COUNT_ADDR, &count);

        for j in 1..=self.files.len() {
            self.link.number(nature_address(j), COLOUR_NORMAL);
            self.link
                .number(FILENAME_ICON1_ADDR + j as u16, SLOT_ICON_BLANK);
        }
        self.link
            .number(nature_address(usize::from(number)), COLOUR_SELECTED);
        self.link
            .number(FILENAME_ICON1_ADDR + number, SLOT_ICON_SELECTED);
    }
}
