//! File system storage
//!
//! Directory enumeration and file lookup for the served directory.

pub mod operations;

pub use operations::{find_entry, format_listing, list_directory};
