//! Command handlers module for the file server.
//!
//! This module defines handler functions for each control-channel command.
//! `get` and `list` open a fresh data channel per call and close it before
//! returning, whatever the outcome.

use log::{info, warn};
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::client::Session;
use crate::error::{FtServerError, StorageError, TransferError, handle_error};
use crate::protocol::{Command, CommandStatus};
use crate::server::config::ServerConfig;
use crate::storage::{find_entry, format_listing, list_directory};
use crate::transfer::{TransferStats, close_data_channel, open_data_channel, send_windows};

/// Payload written on the data channel when a requested file does not exist.
pub const MISSING_FILE_MARKER: &[u8] = b"0";

/// Dispatches a received command to its corresponding handler.
///
/// # Arguments
///
/// * `session` - State of the client sending the command.
/// * `command` - Reference to the parsed command.
/// * `control` - Write side of the control connection, used for the `get`
///   length header.
/// * `config` - Server configuration.
///
/// # Returns
///
/// * `CommandStatus::CloseConnection` for quit, `Continue` otherwise. A failed
///   `get` or `list` is logged and does not end the session.
pub async fn handle_command<W>(
    session: &mut Session,
    command: &Command,
    control: &mut W,
    config: &ServerConfig,
) -> CommandStatus
where
    W: AsyncWrite + Unpin,
{
    let result = match command {
        Command::Quit => return handle_cmd_quit(session),
        Command::Get(filename) => handle_cmd_get(session, filename, control, config).await,
        Command::List => handle_cmd_list(session, config).await,
        Command::Port(port) => {
            handle_cmd_port(session, *port);
            Ok(())
        }
        Command::Unrecognized(raw) => {
            handle_cmd_unrecognized(session, raw);
            Ok(())
        }
    };

    if let Err(e) = result {
        handle_error(session.peer_addr(), &e);
    }

    CommandStatus::Continue
}

/// Handles `\q` / `\quit`: signals the session loop to close.
fn handle_cmd_quit(session: &Session) -> CommandStatus {
    info!("Control connection to {} closing", session.peer_addr());
    CommandStatus::CloseConnection
}

/// Handles `port <n>`: records where the peer accepts data connections.
fn handle_cmd_port(session: &mut Session, port: u16) {
    session.set_data_port(port);
    info!(
        "Client {} will accept data connections on port {}",
        session.peer_addr(),
        port
    );
}

fn handle_cmd_unrecognized(session: &Session, raw: &str) {
    warn!("Ignoring unrecognized command from {}: {:?}", session.peer_addr(), raw);
}

/// Handles `get <filename>`.
///
/// Opens the data channel first; if that fails nothing is sent at all.
async fn handle_cmd_get<W>(
    session: &Session,
    filename: &str,
    control: &mut W,
    config: &ServerConfig,
) -> Result<(), FtServerError>
where
    W: AsyncWrite + Unpin,
{
    let mut data_stream = open_data_channel(session).await?;

    let result = send_file(session, filename, control, &mut data_stream, config).await;
    close_data_channel(data_stream, session.peer_addr()).await;

    let (file_len, stats) = result?;
    let expected = config.window_plan().delivered_len(file_len);
    if stats.bytes_sent != expected {
        warn!(
            "File {} changed during transfer: header announced {} bytes, {} expected on the wire, {} sent",
            filename, file_len, expected, stats.bytes_sent
        );
    }
    info!(
        "File {} sent to {}: {} bytes in {} windows ({} bytes skipped)",
        filename,
        session.peer_addr(),
        stats.bytes_sent,
        stats.windows,
        stats.bytes_dropped()
    );
    Ok(())
}

/// Writes the length header on `control` and the windowed content on `data`,
/// or the missing-file marker on `data` if `filename` is not an entry of the
/// served directory.
async fn send_file<W>(
    session: &Session,
    filename: &str,
    control: &mut W,
    data: &mut TcpStream,
    config: &ServerConfig,
) -> Result<(u64, TransferStats), FtServerError>
where
    W: AsyncWrite + Unpin,
{
    let path = match find_entry(&config.root_dir, filename).await {
        Ok(path) => path,
        Err(StorageError::FileNotFound(name)) => {
            data.write_all(MISSING_FILE_MARKER)
                .await
                .map_err(TransferError::from)?;
            return Err(StorageError::FileNotFound(name).into());
        }
        Err(e) => return Err(e.into()),
    };

    let read_failed = |e: std::io::Error| StorageError::ReadFailed(filename.to_string(), e);

    let mut file = File::open(&path).await.map_err(read_failed)?;
    let metadata = file.metadata().await.map_err(read_failed)?;
    if !metadata.is_file() {
        return Err(read_failed(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a regular file",
        ))
        .into());
    }

    info!("Sending file {} to {}", filename, session.peer_addr());

    control
        .write_all(metadata.len().to_string().as_bytes())
        .await
        .map_err(TransferError::from)?;
    control.flush().await.map_err(TransferError::from)?;

    let stats = send_windows(&mut file, data, config.window_plan())
        .await
        .map_err(TransferError::from)?;

    Ok((metadata.len(), stats))
}

/// Handles `list`: sends the newline-joined directory listing in one write.
async fn handle_cmd_list(session: &Session, config: &ServerConfig) -> Result<(), FtServerError> {
    let mut data_stream = open_data_channel(session).await?;

    let result = send_listing(session, &mut data_stream, config).await;
    close_data_channel(data_stream, session.peer_addr()).await;

    result
}

async fn send_listing(
    session: &Session,
    data: &mut TcpStream,
    config: &ServerConfig,
) -> Result<(), FtServerError> {
    let names = list_directory(&config.root_dir).await?;
    let listing = format_listing(&names);

    info!("Returning directory contents to {}:\n{}", session.peer_addr(), listing);

    data.write_all(listing.as_bytes())
        .await
        .map_err(TransferError::from)?;
    Ok(())
}
