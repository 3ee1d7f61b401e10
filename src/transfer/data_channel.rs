//! Module `data_channel`
//!
//! Opens the per-operation data connection. The server always initiates:
//! it connects back to the peer's IP on the port recorded in the session,
//! so the peer must already be listening there.

use log::{error, info, warn};
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::client::Session;
use crate::error::TransferError;

/// Connects to the data port of the peer behind `session`.
///
/// # Returns
///
/// * `Ok(TcpStream)` - A ready-to-use data connection stream
/// * `Err(TransferError::DataPortUnknown)` - No default port and no `port <n>` yet
/// * `Err(TransferError::ConnectFailed)` - Nobody is listening at the target
pub async fn open_data_channel(session: &Session) -> Result<TcpStream, TransferError> {
    let Some(target) = session.data_socket() else {
        warn!(
            "No data port known for client {}; waiting for a port command",
            session.peer_addr()
        );
        return Err(TransferError::DataPortUnknown);
    };

    info!(
        "Establishing data connection with client {} on port {}",
        target.ip(),
        target.port()
    );

    match TcpStream::connect(target).await {
        Ok(stream) => {
            info!(
                "Data connection established with client {} on port {}",
                target.ip(),
                target.port()
            );
            Ok(stream)
        }
        Err(e) => {
            error!(
                "Could not establish a data connection with client {} on port {}: {}",
                target.ip(),
                target.port(),
                e
            );
            Err(TransferError::ConnectFailed(target, e))
        }
    }
}

/// Shuts the data stream down, logging but never retrying a failure.
pub async fn close_data_channel(mut stream: TcpStream, peer: &SocketAddr) {
    info!("Data connection to {} closing", peer);
    match stream.shutdown().await {
        Ok(()) => info!("Data connection to {} closed", peer),
        Err(e) => warn!("Failed to close data connection to {}: {}", peer, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn connects_to_the_session_data_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let peer: SocketAddr = "127.0.0.1:50000".parse().unwrap();
        let session = Session::new(peer, port);

        let (stream, accepted) = tokio::join!(open_data_channel(&session), listener.accept());
        let stream = stream.unwrap();
        let (mut accepted, _) = accepted.unwrap();

        close_data_channel(stream, &peer).await;
        let mut buf = Vec::new();
        assert_eq!(accepted.read_to_end(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn reports_failure_when_nobody_listens() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let peer: SocketAddr = "127.0.0.1:50000".parse().unwrap();
        let session = Session::new(peer, port);

        match open_data_channel(&session).await {
            Err(TransferError::ConnectFailed(addr, _)) => assert_eq!(addr.port(), port),
            other => panic!("expected connect failure, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn fails_without_a_data_port() {
        let peer: SocketAddr = "127.0.0.1:50000".parse().unwrap();
        let session = Session::new(peer, None);

        assert!(matches!(
            open_data_channel(&session).await,
            Err(TransferError::DataPortUnknown)
        ));
    }
}
