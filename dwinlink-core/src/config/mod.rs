//! Configuration types
//!
//! Static machine configuration plus the user settings persisted as postcard
//! binary data.

pub mod settings;
pub mod types;

pub use settings::*;
pub use types::*;
