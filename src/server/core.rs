use log::{error, info, warn};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinSet;

use crate::client::{Session, handle_client};
use crate::server::config::ServerConfig;

pub struct Server {
    listener: TcpListener,
    config: Arc<ServerConfig>,
    default_data_port: Option<u16>,
}

impl Server {
    /// Binds the control listener described by `config`.
    ///
    /// If the listening port plus `data_port_offset` does not fit in a port
    /// number, the server still starts but has no default data port: clients
    /// must announce one with `port <n>` before `get` or `list` can succeed.
    pub async fn bind(config: ServerConfig) -> io::Result<Self> {
        let control_socket = config.control_socket();

        let listener = match TcpListener::bind(&control_socket).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to bind to {}: {}", control_socket, e);
                return Err(e);
            }
        };

        let local_addr = listener.local_addr()?;
        let default_data_port = local_addr.port().checked_add(config.data_port_offset);
        match default_data_port {
            Some(port) => info!("Default data port: {}", port),
            None => warn!(
                "Data port {} + {} is out of range; clients must send `port <n>`",
                local_addr.port(),
                config.data_port_offset
            ),
        }

        info!("Server bound to {}", local_addr);
        info!("Serving directory: {}", config.root_dir.display());

        Ok(Self {
            listener,
            config: Arc::new(config),
            default_data_port,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Data port used for clients that never send `port <n>`, if any.
    pub fn default_data_port(&self) -> Option<u16> {
        self.default_data_port
    }

    /// Accepts control connections until `shutdown` resolves.
    ///
    /// Every connection gets its own task and `Session`. On shutdown the
    /// listening socket is released first, then all active sessions are
    /// aborted.
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let Server {
            listener,
            config,
            default_data_port,
        } = self;

        let mut sessions = JoinSet::new();
        tokio::pin!(shutdown);

        match listener.local_addr() {
            Ok(addr) => info!("Listening for connections on {}", addr),
            Err(e) => warn!("Listening on an unknown address: {}", e),
        }

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, client_addr)) => {
                        info!("Client {} connected", client_addr);
                        let session = Session::new(client_addr, default_data_port);
                        sessions.spawn(handle_client(stream, session, Arc::clone(&config)));
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                    }
                },
                Some(finished) = sessions.join_next(), if !sessions.is_empty() => {
                    if let Err(e) = finished {
                        error!("Session task failed: {}", e);
                    }
                }
            }
        }

        drop(listener);

        let active = sessions.len();
        sessions.shutdown().await;
        info!("Server stopped, {} active sessions aborted", active);
    }
}
