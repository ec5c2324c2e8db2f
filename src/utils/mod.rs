//! Utility functions module
//!
//! Output formatting and placeholder detection shared by the config and CLI
//! modules.

pub mod format;
pub mod placeholder;

pub use format::*;
pub use placeholder::*;
