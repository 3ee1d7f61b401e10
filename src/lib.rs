pub mod client;
pub mod error;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod transfer;

pub use server::{Server, ServerConfig};
