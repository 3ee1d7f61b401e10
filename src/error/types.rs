//! Error types
//!
//! Defines domain-specific error types for each module of the file server.

use std::fmt;
use std::io;
use std::net::SocketAddr;

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    FileNotFound(String),
    ReadFailed(String, io::Error),
    IoError(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::FileNotFound(p) => write!(f, "File not found: {}", p),
            StorageError::ReadFailed(p, e) => write!(f, "Failed to read {}: {}", p, e),
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::ReadFailed(_, e) | StorageError::IoError(e) => Some(e),
            StorageError::FileNotFound(_) => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

/// Transfer module errors
#[derive(Debug)]
pub enum TransferError {
    ConnectFailed(SocketAddr, io::Error),
    DataPortUnknown,
    TransferFailed(io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::ConnectFailed(addr, e) => {
                write!(f, "Could not establish data connection to {}: {}", addr, e)
            }
            TransferError::DataPortUnknown => {
                write!(f, "No data port known; client must send `port <n>`")
            }
            TransferError::TransferFailed(e) => write!(f, "Transfer failed: {}", e),
        }
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferError::ConnectFailed(_, e) | TransferError::TransferFailed(e) => Some(e),
            TransferError::DataPortUnknown => None,
        }
    }
}

impl From<io::Error> for TransferError {
    fn from(error: io::Error) -> Self {
        TransferError::TransferFailed(error)
    }
}

/// Top-level error for a single `get` or `list` operation
#[derive(Debug)]
pub enum FtServerError {
    Storage(StorageError),
    Transfer(TransferError),
}

impl fmt::Display for FtServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtServerError::Storage(e) => write!(f, "Storage error: {}", e),
            FtServerError::Transfer(e) => write!(f, "Transfer error: {}", e),
        }
    }
}

impl std::error::Error for FtServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FtServerError::Storage(e) => Some(e),
            FtServerError::Transfer(e) => Some(e),
        }
    }
}

impl From<StorageError> for FtServerError {
    fn from(error: StorageError) -> Self {
        FtServerError::Storage(error)
    }
}

impl From<TransferError> for FtServerError {
    fn from(error: TransferError) -> Self {
        FtServerError::Transfer(error)
    }
}
