//! # Mapgen Development Tools
//!
//! Command-line tools for development:
//! - ASCII layout generator for hand-drawn test levels
//! - Mission loader printing the finished map and its add requests

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod layout;
pub mod report;
