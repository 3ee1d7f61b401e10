//! Error handlers
//!
//! Logs operation failures at a level matching their severity.

use crate::error::types::{FtServerError, StorageError, TransferError};
use log::{error, warn};
use std::net::SocketAddr;

/// Logs an error raised while serving `peer`.
///
/// Failed data connections and missing files are expected in normal use and
/// are logged as warnings; read and socket failures are errors.
pub fn handle_error(peer: &SocketAddr, err: &FtServerError) {
    match err {
        FtServerError::Transfer(TransferError::ConnectFailed(..))
        | FtServerError::Transfer(TransferError::DataPortUnknown)
        | FtServerError::Storage(StorageError::FileNotFound(_)) => {
            warn!("Client {}: {}", peer, err);
        }
        _ => error!("Client {}: {}", peer, err),
    }
}
