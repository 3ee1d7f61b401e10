//! Transfer module for the file server
//!
//! Handles data channel setup and windowed file transfers.

pub mod data_channel;
pub mod file_ops;

pub use data_channel::{close_data_channel, open_data_channel};
pub use file_ops::{TransferStats, WindowPlan, send_windows};
