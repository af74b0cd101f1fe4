//! FTP data connection modes
//!
//! Exactly one mode is armed at a time. Replacing a mode drops the old
//! value, which closes any listener it owned.

use std::fmt;
use std::net::SocketAddrV4;
use tokio::net::TcpListener;

/// Armed data connection mode
#[derive(Debug, Default)]
pub enum DataMode {
    #[default]
    None,
    /// Server-supplied endpoint to connect out to
    Passive(SocketAddrV4),
    /// Locally bound listener the server connects in to
    Active(TcpListener),
}

impl DataMode {
    pub fn is_armed(&self) -> bool {
        !matches!(self, DataMode::None)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, DataMode::Active(_))
    }
}

impl fmt::Display for DataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataMode::None => write!(f, "none"),
            DataMode::Passive(addr) => write!(f, "passive -> {}", addr),
            DataMode::Active(listener) => match listener.local_addr() {
                Ok(addr) => write!(f, "active <- {}", addr),
                Err(_) => write!(f, "active"),
            },
        }
    }
}
