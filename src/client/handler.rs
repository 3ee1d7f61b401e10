use log::{error, info, warn};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::client::Session;
use crate::protocol::{CommandStatus, handle_command, parse_command, split_commands};
use crate::server::config::ServerConfig;

/// Runs the command loop of one control connection until the client quits,
/// disconnects, or sends bytes that are not valid UTF-8.
///
/// - Reads at most `command_buffer_size` bytes per iteration.
/// - Dispatches every command line in the read using `handle_command`.
/// - Shuts the control socket down exactly once, when the session closes.
pub async fn handle_client(cmd_stream: TcpStream, mut session: Session, config: Arc<ServerConfig>) {
    let client_addr = *session.peer_addr();
    let (mut read_half, mut write_half) = cmd_stream.into_split();
    let mut buffer = vec![0u8; config.command_buffer_size];

    'session: while session.is_connected() {
        let n = match read_half.read(&mut buffer).await {
            Ok(0) => {
                info!("Connection to {} closed by client", client_addr);
                break;
            }
            Ok(n) => n,
            Err(e) => {
                error!("Failed to read from {}: {}", client_addr, e);
                break;
            }
        };

        let received = match std::str::from_utf8(&buffer[..n]) {
            Ok(text) => text,
            Err(e) => {
                warn!("Undecodable command from {}: {}", client_addr, e);
                break;
            }
        };

        for line in split_commands(received) {
            info!("Client {} sent command: {}", client_addr, line);
            let command = parse_command(line);

            let status = handle_command(&mut session, &command, &mut write_half, &config).await;
            if status == CommandStatus::CloseConnection {
                break 'session;
            }
        }
    }

    if session.close() {
        if let Err(e) = write_half.shutdown().await {
            warn!("Failed to shut down control connection to {}: {}", client_addr, e);
        }
        info!("Control connection {} closed", client_addr);
    }
}
