//! Frame encoding and decoding for the RTS/DWIN protocol.
//!
//! Frame format:
//! - HEADER (2 bytes): 0x5A 0xA5
//! - LENGTH (1 byte): number of bytes following this one
//! - COMMAND (1 byte): 0x80..=0x83
//! - ADDRESS (1 byte for registers, 2 bytes big-endian for variables)
//! - COUNT (1 byte, read commands only): requested/returned length
//! - DATA (0-32 bytes)
//!
//! There is no checksum. A frame is only as trustworthy as its length byte.

use heapless::Vec;

use crate::messages::{Value, ValueKind};

/// Frame synchronization bytes
pub const HEADER: [u8; 2] = [0x5A, 0xA5];

/// Bytes before the length-counted section (header + length)
pub const PREAMBLE_LEN: usize = 3;

/// Maximum data bytes carried by one frame (16 words)
pub const MAX_DATA_SIZE: usize = 32;

/// Maximum complete frame size (PREAMBLE + COMMAND + ADDRESS + COUNT + DATA)
pub const MAX_FRAME_SIZE: usize = PREAMBLE_LEN + 1 + 2 + 1 + MAX_DATA_SIZE;

/// Payload of the acknowledgement the display sends after a write
pub const WRITE_ACK: [u8; 2] = [b'O', b'K'];

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// First two bytes are not 0x5A 0xA5
    BadHeader,
    /// Declared length too small for the command
    TooShort,
    /// Fewer bytes than the declared length
    Truncated,
    /// More bytes than the declared length, or data over capacity
    TooLong,
    /// Command byte outside 0x80..=0x83
    UnknownCommand,
    /// Register address does not fit in one byte
    AddressOutOfRange,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Command kind carried in the COMMAND byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// Write bytes into a display register
    WriteRegister = 0x80,
    /// Read bytes from a display register
    ReadRegister = 0x81,
    /// Write 16-bit words into a display variable
    WriteVariable = 0x82,
    /// Read 16-bit words from a display variable
    ReadVariable = 0x83,
}

impl Command {
    /// Parse a command byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x80 => Some(Command::WriteRegister),
            0x81 => Some(Command::ReadRegister),
            0x82 => Some(Command::WriteVariable),
            0x83 => Some(Command::ReadVariable),
            _ => None,
        }
    }

    /// Wire value of this command
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Width of the address field in bytes
    pub fn address_width(self) -> usize {
        match self {
            Command::WriteRegister | Command::ReadRegister => 1,
            Command::WriteVariable | Command::ReadVariable => 2,
        }
    }

    /// Read commands carry a count byte after the address
    pub fn is_read(self) -> bool {
        matches!(self, Command::ReadRegister | Command::ReadVariable)
    }
}

/// Result of decoding a complete buffer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Decoded {
    /// The display acknowledged a previous write
    WriteAck,
    /// Any other well-formed frame
    Frame(Frame),
}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Command kind
    pub command: Command,
    /// Register (8-bit) or variable (16-bit) address
    pub address: u16,
    /// COUNT byte of read commands; zero for writes
    pub byte_length: u8,
    /// Data bytes after the address (and count)
    pub data: Vec<u8, MAX_DATA_SIZE>,
}

impl Frame {
    /// Create a write frame carrying `data`
    pub fn new(command: Command, address: u16, data: &[u8]) -> Result<Self, FrameError> {
        if command.address_width() == 1 && address > 0xFF {
            return Err(FrameError::AddressOutOfRange);
        }

        let mut data_vec = Vec::new();
        data_vec
            .extend_from_slice(data)
            .map_err(|_| FrameError::TooLong)?;

        Ok(Self {
            command,
            address,
            byte_length: 0,
            data: data_vec,
        })
    }

    /// Create a read request for `count` bytes (registers) or words (variables)
    pub fn read(command: Command, address: u16, count: u8) -> Result<Self, FrameError> {
        let mut frame = Self::new(command, address, &[])?;
        frame.byte_length = count;
        Ok(frame)
    }

    /// The LENGTH byte this frame encodes with
    pub fn length(&self) -> u8 {
        let count = usize::from(self.command.is_read());
        (1 + self.command.address_width() + count + self.data.len()) as u8
    }

    /// Total encoded size in bytes
    pub fn encoded_len(&self) -> usize {
        PREAMBLE_LEN + self.length() as usize
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[..2].copy_from_slice(&HEADER);
        buffer[2] = self.length();
        buffer[3] = self.command.to_byte();

        let mut pos = 4;
        if self.command.address_width() == 2 {
            buffer[pos..pos + 2].copy_from_slice(&self.address.to_be_bytes());
            pos += 2;
        } else {
            buffer[pos] = self.address as u8;
            pos += 1;
        }
        if self.command.is_read() {
            buffer[pos] = self.byte_length;
            pos += 1;
        }
        buffer[pos..pos + self.data.len()].copy_from_slice(&self.data);

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }

    /// Decode one complete frame
    ///
    /// `bytes` must hold exactly `3 + LENGTH` bytes.
    pub fn decode(bytes: &[u8]) -> Result<Decoded, FrameError> {
        if bytes.len() < PREAMBLE_LEN {
            return Err(FrameError::Truncated);
        }
        if bytes[..2] != HEADER {
            return Err(FrameError::BadHeader);
        }

        let length = bytes[2] as usize;
        if length <= 2 {
            return Err(FrameError::TooShort);
        }
        let total = PREAMBLE_LEN + length;
        if bytes.len() < total {
            return Err(FrameError::Truncated);
        }
        if bytes.len() > total {
            return Err(FrameError::TooLong);
        }

        let command_byte = bytes[3];
        if length == 3 && matches!(command_byte, 0x80 | 0x82) && bytes[4..6] == WRITE_ACK {
            return Ok(Decoded::WriteAck);
        }

        let command = Command::from_byte(command_byte).ok_or(FrameError::UnknownCommand)?;
        let width = command.address_width();
        let count = usize::from(command.is_read());
        if length < 1 + width + count {
            return Err(FrameError::TooShort);
        }

        let address = if width == 2 {
            u16::from_be_bytes([bytes[4], bytes[5]])
        } else {
            u16::from(bytes[4])
        };
        let byte_length = if count == 1 { bytes[4 + width] } else { 0 };

        let mut data = Vec::new();
        data.extend_from_slice(&bytes[4 + width + count..total])
            .map_err(|_| FrameError::TooLong)?;

        Ok(Decoded::Frame(Frame {
            command,
            address,
            byte_length,
            data,
        }))
    }

    /// Big-endian word at `index`, if present
    pub fn word(&self, index: usize) -> Option<u16> {
        let start = index * 2;
        match self.data.get(start..start + 2) {
            Some(pair) => Some(u16::from_be_bytes([pair[0], pair[1]])),
            None => None,
        }
    }

    /// First data value as the handlers see it
    ///
    /// Variable frames carry words; register frames carry single bytes.
    /// Missing data reads as zero.
    pub fn first_word(&self) -> u16 {
        match self.command {
            Command::WriteVariable | Command::ReadVariable => match self.word(0) {
                Some(word) => word,
                None => self.data.first().map_or(0, |&b| u16::from(b)),
            },
            Command::WriteRegister | Command::ReadRegister => {
                self.data.first().map_or(0, |&b| u16::from(b))
            }
        }
    }

    /// Data read back as a value of `kind`
    pub fn value(&self, kind: ValueKind) -> Option<Value<'_>> {
        Value::decode(kind, &self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decode_frame(bytes: &[u8]) -> Frame {
        match Frame::decode(bytes).unwrap() {
            Decoded::Frame(frame) => frame,
            Decoded::WriteAck => panic!("unexpected ack"),
        }
    }

    #[test]
    fn test_encode_write_variable_word() {
        let frame = Frame::new(Command::WriteVariable, 0x1036, &[0x00, 0xC8]).unwrap();
        let mut buffer = [0u8; 16];
        let len = frame.encode(&mut buffer).unwrap();

        assert_eq!(len, 8);
        assert_eq!(&buffer[..len], &[0x5A, 0xA5, 0x05, 0x82, 0x10, 0x36, 0x00, 0xC8]);
    }

    #[test]
    fn test_encode_read_variable_request() {
        let frame = Frame::read(Command::ReadVariable, 0x1002, 1).unwrap();
        let encoded = frame.encode_to_vec().unwrap();

        assert_eq!(&encoded[..], &[0x5A, 0xA5, 0x04, 0x83, 0x10, 0x02, 0x01]);
    }

    #[test]
    fn test_encode_register_commands() {
        let write = Frame::new(Command::WriteRegister, 0x03, &[0x01]).unwrap();
        assert_eq!(&write.encode_to_vec().unwrap()[..], &[0x5A, 0xA5, 0x03, 0x80, 0x03, 0x01]);

        let read = Frame::read(Command::ReadRegister, 0x03, 2).unwrap();
        assert_eq!(&read.encode_to_vec().unwrap()[..], &[0x5A, 0xA5, 0x03, 0x81, 0x03, 0x02]);
    }

    #[test]
    fn test_register_address_must_fit_byte() {
        let result = Frame::new(Command::WriteRegister, 0x100, &[1]);
        assert_eq!(result, Err(FrameError::AddressOutOfRange));
    }

    #[test]
    fn test_decode_read_variable_response() {
        // Touch on address 0x1008 with value 0x00F0
        let frame = decode_frame(&[0x5A, 0xA5, 0x06, 0x83, 0x10, 0x08, 0x01, 0x00, 0xF0]);

        assert_eq!(frame.command, Command::ReadVariable);
        assert_eq!(frame.address, 0x1008);
        assert_eq!(frame.byte_length, 1);
        assert_eq!(frame.first_word(), 0x00F0);
    }

    #[test]
    fn test_decode_register_response() {
        let frame = decode_frame(&[0x5A, 0xA5, 0x04, 0x81, 0x03, 0x01, 0x2A]);

        assert_eq!(frame.command, Command::ReadRegister);
        assert_eq!(frame.address, 0x03);
        assert_eq!(frame.first_word(), 0x2A);
    }

    #[test]
    fn test_decode_write_ack() {
        assert_eq!(
            Frame::decode(&[0x5A, 0xA5, 0x03, 0x82, b'O', b'K']),
            Ok(Decoded::WriteAck)
        );
        assert_eq!(
            Frame::decode(&[0x5A, 0xA5, 0x03, 0x80, b'O', b'K']),
            Ok(Decoded::WriteAck)
        );
    }

    #[test]
    fn test_decode_rejects_bad_header() {
        let result = Frame::decode(&[0x5A, 0x00, 0x03, 0x82, 0x00, 0x00]);
        assert_eq!(result, Err(FrameError::BadHeader));
    }

    #[test]
    fn test_decode_rejects_short_length() {
        assert_eq!(
            Frame::decode(&[0x5A, 0xA5, 0x02, 0x82, 0x10]),
            Err(FrameError::TooShort)
        );
        // Read-variable needs address and count
        assert_eq!(
            Frame::decode(&[0x5A, 0xA5, 0x03, 0x83, 0x10, 0x08]),
            Err(FrameError::TooShort)
        );
    }

    #[test]
    fn test_decode_rejects_length_mismatch() {
        assert_eq!(
            Frame::decode(&[0x5A, 0xA5, 0x05, 0x82, 0x10, 0x36, 0x00]),
            Err(FrameError::Truncated)
        );
        assert_eq!(
            Frame::decode(&[0x5A, 0xA5, 0x03, 0x82, 0x10, 0x36, 0x00]),
            Err(FrameError::TooLong)
        );
    }

    #[test]
    fn test_decode_unknown_command() {
        let result = Frame::decode(&[0x5A, 0xA5, 0x03, 0x90, 0x10, 0x36]);
        assert_eq!(result, Err(FrameError::UnknownCommand));
    }

    #[test]
    fn test_buffer_too_small() {
        let frame = Frame::new(Command::WriteVariable, 0x1000, &[0; 8]).unwrap();
        let mut buffer = [0u8; 8];
        assert_eq!(frame.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }

    fn command_strategy() -> impl Strategy<Value = Command> {
        prop_oneof![
            Just(Command::WriteRegister),
            Just(Command::ReadRegister),
            Just(Command::WriteVariable),
            Just(Command::ReadVariable),
        ]
    }

    proptest! {
        #[test]
        fn test_encode_decode_roundtrip(
            command in command_strategy(),
            address in any::<u16>(),
            count in any::<u8>(),
            data in proptest::collection::vec(any::<u8>(), 0..=MAX_DATA_SIZE),
        ) {
            let address = if command.address_width() == 1 { address & 0xFF } else { address };
            let mut frame = Frame::new(command, address, &data).unwrap();
            if command.is_read() {
                frame.byte_length = count;
            }
            // A three-byte "OK" write is indistinguishable from an ack
            prop_assume!(!(frame.length() == 3 && !command.is_read() && frame_is_ok(&frame)));

            let encoded = frame.encode_to_vec().unwrap();
            prop_assert_eq!(encoded.len(), frame.encoded_len());
            prop_assert_eq!(Frame::decode(&encoded), Ok(Decoded::Frame(frame)));
        }
    }

    fn frame_is_ok(frame: &Frame) -> bool {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        match frame.encode(&mut buffer) {
            Ok(_) => buffer[4..6] == WRITE_ACK,
            Err(_) => false,
        }
    }
}
