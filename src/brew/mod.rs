//! Homebrew interaction layer
//!
//! This module handles all interactions with the brew CLI:
//! - Locating the brew executable and host details
//! - Listing installed formulae and casks
//! - Command execution (install, uninstall, search)

pub mod commands;
pub mod detect;
pub mod listing;

pub use detect::{detect_brew, BrewInfo};
pub use listing::{snapshot, Snapshot};
