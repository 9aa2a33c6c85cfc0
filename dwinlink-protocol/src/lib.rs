//! RTS/DWIN Display Communication Protocol
//!
//! This crate defines the serial protocol between the printer mainboard and
//! the DWIN touchscreen MCU. The display owns pages, icons and text variables;
//! the mainboard writes values into display variables and receives a frame
//! whenever the user touches a control bound to a variable address.
//!
//! # Protocol Overview
//!
//! All messages use a fixed-header binary frame with no checksum:
//! ```text
//! ┌──────┬──────┬────────┬─────────┬─────────────────────┐
//! │ 0x5A │ 0xA5 │ LENGTH │ COMMAND │ ADDRESS + PAYLOAD   │
//! │ 1B   │ 1B   │ 1B     │ 1B      │ LENGTH - 1 bytes    │
//! └──────┴──────┴────────┴─────────┴─────────────────────┘
//! ```
//!
//! `LENGTH` counts every byte after itself. Register commands carry a one
//! byte address, variable commands a big-endian 16-bit address.

#![no_std]
#![deny(unsafe_code)]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod address;
pub mod frame;
pub mod messages;
pub mod receiver;

pub use address::{classify, AxisKey, Category, FileKey, FilamentKey, PrintControl, TempField};
pub use frame::{Command, Decoded, Frame, FrameError, HEADER, MAX_DATA_SIZE, MAX_FRAME_SIZE};
pub use messages::{PanelMessage, Value, ValueKind};
pub use receiver::{FrameReceiver, ReceiveStats};
