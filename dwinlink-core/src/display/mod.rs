//! Display output: link, pages and icons

pub mod link;
pub mod pages;

pub use link::{DisplayLink, LinkError};
pub use pages::{icon, Page, StatusIcon};
