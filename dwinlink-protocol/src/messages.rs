//! Outbound message types
//!
//! Everything the mainboard sends is a variable write. `PanelMessage` names
//! the intent and `to_frame` turns it into wire form. [`Value::decode`] reads
//! a written value back out of frame data.

use crate::address::EXCHANGE_PAGE_ADDR;
use crate::frame::{Command, Frame, FrameError, MAX_DATA_SIZE};

/// Page switch command word written to `EXCHANGE_PAGE_ADDR`
pub const PAGE_SWITCH_BASE: u32 = 0x5A01_0000;

/// Value written into a display variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Value<'a> {
    /// Single byte, sent in the high half of one word
    Byte(u8),
    /// One 16-bit word
    Word(u16),
    /// Two words, high word first
    DWord(u32),
    /// Text bytes, truncated to the frame capacity
    Str(&'a str),
}

/// Payload layout of a [`Value`], needed to read one back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValueKind {
    Byte,
    Word,
    DWord,
    Str,
}

impl<'a> Value<'a> {
    /// Pick the narrowest numeric encoding for `n`
    pub fn number(n: u32) -> Self {
        if n > 0xFFFF {
            Value::DWord(n)
        } else {
            Value::Word(n as u16)
        }
    }

    /// Signed values are sent as their 16-bit two's complement
    pub fn signed(n: i32) -> Self {
        Value::Word(n as u16)
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Byte(_) => ValueKind::Byte,
            Value::Word(_) => ValueKind::Word,
            Value::DWord(_) => ValueKind::DWord,
            Value::Str(_) => ValueKind::Str,
        }
    }

    /// Read a value of `kind` out of frame data
    ///
    /// Returns `None` when the data is too short for the kind or, for text,
    /// not valid UTF-8. Bytes past the value are ignored.
    pub fn decode(kind: ValueKind, data: &'a [u8]) -> Option<Self> {
        match (kind, data) {
            (ValueKind::Byte, [b, ..]) => Some(Value::Byte(*b)),
            (ValueKind::Word, [hi, lo, ..]) => Some(Value::Word(u16::from_be_bytes([*hi, *lo]))),
            (ValueKind::DWord, [a, b, c, d, ..]) => {
                Some(Value::DWord(u32::from_be_bytes([*a, *b, *c, *d])))
            }
            (ValueKind::Str, _) => core::str::from_utf8(data).ok().map(Value::Str),
            _ => None,
        }
    }

    /// Bytes this value occupies on the wire
    pub fn encode(&self, out: &mut heapless::Vec<u8, MAX_DATA_SIZE>) -> Result<(), FrameError> {
        out.clear();
        let result = match *self {
            Value::Byte(b) => out.extend_from_slice(&[b, 0]),
            Value::Word(w) => out.extend_from_slice(&w.to_be_bytes()),
            Value::DWord(d) => out.extend_from_slice(&d.to_be_bytes()),
            Value::Str(s) => out.extend_from_slice(truncate(s, MAX_DATA_SIZE).as_bytes()),
        };
        result.map_err(|_| FrameError::TooLong)
    }
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Messages from the mainboard to the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelMessage<'a> {
    /// Write a value into a display variable
    Write { address: u16, value: Value<'a> },
    /// Switch the visible page
    Page(u8),
}

impl<'a> PanelMessage<'a> {
    /// Build the frame for this message
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match *self {
            PanelMessage::Write { address, value } => {
                let mut data = heapless::Vec::new();
                value.encode(&mut data)?;
                Frame::new(Command::WriteVariable, address, &data)
            }
            PanelMessage::Page(page) => PanelMessage::Write {
                address: EXCHANGE_PAGE_ADDR,
                value: Value::DWord(PAGE_SWITCH_BASE + u32::from(page)),
            }
            .to_frame(),
        }
    }
}
