//! Dwinlink Hardware Abstraction Layer
//!
//! Traits the panel engine needs from the board: a polled serial port to the
//! display MCU and a small key-value store for persisted panel settings.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  dwinlink-core (panel coordinator)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  dwinlink-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ embedded-io   │       │ board flash / │
//! │ serial ports  │       │   EEPROM      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Non-blocking serial communication
//! - [`flash::SettingsStorage`] - Persistent settings storage

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use flash::{SettingsStorage, StorageError, StorageKey};
pub use uart::{IoUart, NoDelay, PacedTx, Uart, UartRx, UartTx};
