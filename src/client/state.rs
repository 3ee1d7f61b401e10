//! Module `state`
//!
//! Defines the `Session` struct holding the server-side state of one
//! control connection: who the peer is, where its data channel listens,
//! and whether the session is still running.

use std::net::SocketAddr;

/// Lifecycle of a control session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Closed,
}

/// Represents the state of a connected client.
#[derive(Debug)]
pub struct Session {
    peer_addr: SocketAddr,
    data_port: Option<u16>,
    state: SessionState,
}

impl Session {
    /// Creates a connected session whose data channel targets `data_port`
    /// on the peer's IP. With no port, data connections fail until the peer
    /// sends `port <n>`.
    pub fn new(peer_addr: SocketAddr, data_port: impl Into<Option<u16>>) -> Self {
        Self {
            peer_addr,
            data_port: data_port.into(),
            state: SessionState::Connected,
        }
    }

    // --------------------
    // Getter methods
    // --------------------

    /// Returns the address of the peer on the control connection.
    pub fn peer_addr(&self) -> &SocketAddr {
        &self.peer_addr
    }

    /// Returns the port the peer listens on for data connections, if known.
    pub fn data_port(&self) -> Option<u16> {
        self.data_port
    }

    /// Returns the peer's IP paired with its data port.
    pub fn data_socket(&self) -> Option<SocketAddr> {
        self.data_port
            .map(|port| SocketAddr::new(self.peer_addr.ip(), port))
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    // --------------------
    // Setter methods
    // --------------------

    /// Records the data port announced by the peer with `port <n>`.
    pub fn set_data_port(&mut self, port: u16) {
        self.data_port = Some(port);
    }

    /// Moves the session into `Closed`.
    ///
    /// Returns `true` only on the transition, so callers release the control
    /// socket exactly once.
    pub fn close(&mut self) -> bool {
        let was_connected = self.is_connected();
        self.state = SessionState::Closed;
        was_connected
    }
}
