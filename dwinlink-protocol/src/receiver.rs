//! Byte-at-a-time frame receiver
//!
//! The display streams touch reports and write acknowledgements over the same
//! line. The receiver resynchronizes on the 0x5A 0xA5 header, collects exactly
//! `LENGTH` further bytes and hands complete frames to the caller. Acks are
//! counted and swallowed.

use heapless::Vec;

use dwinlink_hal::UartRx;

use crate::frame::{Decoded, Frame, FrameError, HEADER, MAX_FRAME_SIZE, PREAMBLE_LEN};

/// Counters kept by the receiver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceiveStats {
    /// Frames delivered to the caller
    pub frames: u32,
    /// Write acknowledgements swallowed
    pub acks: u32,
    /// Partial or malformed frames thrown away
    pub discarded: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReceiveState {
    /// Waiting for the first header byte
    WaitingForHeader,
    /// Got 0x5A, waiting for 0xA5
    WaitingForSync,
    /// Header complete, waiting for LENGTH
    WaitingForLength,
    /// Collecting the counted bytes
    ReadingBody,
}

/// State machine that reassembles frames from a byte stream
#[derive(Debug, Clone)]
pub struct FrameReceiver {
    state: ReceiveState,
    buffer: Vec<u8, MAX_FRAME_SIZE>,
    expected: usize,
    stats: ReceiveStats,
}

impl Default for FrameReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReceiver {
    /// Create an idle receiver
    pub fn new() -> Self {
        Self {
            state: ReceiveState::WaitingForHeader,
            buffer: Vec::new(),
            expected: 0,
            stats: ReceiveStats::default(),
        }
    }

    /// Drop any partial frame
    pub fn reset(&mut self) {
        self.state = ReceiveState::WaitingForHeader;
        self.buffer.clear();
        self.expected = 0;
    }

    /// Counters since creation
    pub fn stats(&self) -> ReceiveStats {
        self.stats
    }

    /// True while a frame is partially received
    pub fn in_frame(&self) -> bool {
        self.state != ReceiveState::WaitingForHeader
    }

    fn discard(&mut self, error: FrameError) -> Result<Option<Frame>, FrameError> {
        self.stats.discarded = self.stats.discarded.wrapping_add(1);
        self.reset();
        Err(error)
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(frame))` when a complete frame is ready, `Ok(None)`
    /// when more bytes are needed or an ack was consumed, or `Err` when a
    /// partial frame had to be discarded.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            ReceiveState::WaitingForHeader => {
                if byte == HEADER[0] {
                    self.buffer.clear();
                    let _ = self.buffer.push(byte);
                    self.state = ReceiveState::WaitingForSync;
                }
                // Line noise between frames is ignored
                Ok(None)
            }
            ReceiveState::WaitingForSync => {
                if byte == HEADER[1] {
                    let _ = self.buffer.push(byte);
                    self.state = ReceiveState::WaitingForLength;
                } else if byte != HEADER[0] {
                    self.reset();
                }
                // A repeated 0x5A may be the real start, stay in sync wait
                Ok(None)
            }
            ReceiveState::WaitingForLength => {
                let length = byte as usize;
                if length <= 2 {
                    return self.discard(FrameError::TooShort);
                }
                if PREAMBLE_LEN + length > MAX_FRAME_SIZE {
                    return self.discard(FrameError::TooLong);
                }
                let _ = self.buffer.push(byte);
                self.expected = PREAMBLE_LEN + length;
                self.state = ReceiveState::ReadingBody;
                Ok(None)
            }
            ReceiveState::ReadingBody => {
                // Capacity is checked against `expected` when LENGTH arrives
                let _ = self.buffer.push(byte);
                if self.buffer.len() < self.expected {
                    return Ok(None);
                }

                let decoded = Frame::decode(&self.buffer);
                match decoded {
                    Ok(Decoded::WriteAck) => {
                        self.stats.acks = self.stats.acks.wrapping_add(1);
                        self.reset();
                        Ok(None)
                    }
                    Ok(Decoded::Frame(frame)) => {
                        self.stats.frames = self.stats.frames.wrapping_add(1);
                        self.reset();
                        Ok(Some(frame))
                    }
                    Err(error) => self.discard(error),
                }
            }
        }
    }

    /// Feed multiple bytes
    ///
    /// Returns the first complete frame found, if any. Bytes after that frame
    /// are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    /// Drain the receive side of `rx` until one frame is ready or it runs dry
    ///
    /// Malformed frames are counted in [`ReceiveStats::discarded`] and
    /// skipped; only transport errors are returned.
    pub fn poll<R: UartRx>(&mut self, rx: &mut R) -> Result<Option<Frame>, R::Error> {
        while let Some(byte) = rx.read_byte()? {
            if let Ok(Some(frame)) = self.feed(byte) {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}
