//! Control protocol implementation
//!
//! Handles command parsing and dispatch.

pub mod commands;
pub mod handlers;

pub use commands::{Command, CommandStatus, parse_command, split_commands};
pub use handlers::{MISSING_FILE_MARKER, handle_command};
