//! Dwinlink Core - Panel Coordination Engine
//!
//! Drives an RTS/DWIN touchscreen from the printer mainboard. The engine owns
//! the display link and translates touch frames into printer actions and
//! printer state into display variables.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  frames   ┌──────────────────────────────┐
//! │ display UART │ ────────► │ Panel                        │
//! │ (DisplayLink)│ ◄──────── │  ├─ classify → handlers      │
//! └──────────────┘  values   │  ├─ CoordinatorState         │
//!                            │  ├─ FileListCache            │
//!                            │  └─ periodic updater         │
//!                            └──────────────┬───────────────┘
//!                                           │ Printer traits
//!                                           ▼
//!                     card · queue · thermal · motion · timer ·
//!                     fans · filament sensor · recovery · storage
//! ```
//!
//! The firmware calls [`Panel::update`] once per main-loop tick and
//! [`Panel::on_filament_runout`] from its runout interrupt.
//!
//! # Modules
//!
//! - [`coordinator`] - The [`Panel`] and its touch handlers
//! - [`state`] - Print phase, filament check and wait state machines
//! - [`display`] - Outbound link, pages and icons
//! - [`files`] - Card file-list cache
//! - [`config`] - Board configuration and persisted settings
//! - [`traits`] - Printer collaborator traits

#![no_std]
#![deny(unsafe_code)]

#[cfg(any(test, feature = "std"))]
extern crate std;

#[macro_use]
mod fmt;

pub mod config;
pub mod coordinator;
pub mod display;
pub mod files;
pub mod state;
pub mod traits;

#[cfg(test)]
mod testing;

pub use coordinator::Panel;
