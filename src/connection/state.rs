//! Connection state machine.
//!
//! # States
//! - Disconnected: no channel held; `connect()` allowed
//! - Connecting: channel opened, health check in flight
//! - Connected: calls allowed
//! - Closed: terminal
//!
//! # State Transitions
//! ```text
//! Disconnected → Connecting: connect()
//! Connecting → Connected: health check passed
//! Connecting → Disconnected: open or health check failed
//! Connected → Disconnected: ping() failed
//! any → Closed: close()
//! ```

/// Lifecycle state of one service connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Closed,
}

impl ConnectionState {
    pub fn can_connect(self) -> bool {
        self == ConnectionState::Disconnected
    }

    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }

    pub fn is_closed(self) -> bool {
        self == ConnectionState::Closed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Closed => "closed",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
