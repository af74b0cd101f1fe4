//! Error types
//!
//! Defines domain-specific error types for each module of the FTP client.

use std::fmt;
use std::io;
use std::net::SocketAddrV4;
use std::path::PathBuf;

/// Control channel errors
#[derive(Debug)]
pub enum ControlError {
    ConnectFailed(String, io::Error),
    ConnectionClosed,
    TruncatedReply(u16),
    Io(io::Error),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::ConnectFailed(addr, e) => {
                write!(f, "Failed to connect to {}: {}", addr, e)
            }
            ControlError::ConnectionClosed => write!(f, "Server closed the control connection"),
            ControlError::TruncatedReply(code) => {
                write!(f, "Connection closed in the middle of a {} reply", code)
            }
            ControlError::Io(e) => write!(f, "Control channel I/O error: {}", e),
        }
    }
}

impl std::error::Error for ControlError {}

impl From<io::Error> for ControlError {
    fn from(error: io::Error) -> Self {
        ControlError::Io(error)
    }
}

/// Data mode and transfer errors
#[derive(Debug)]
pub enum TransferError {
    NoDataMode,
    InvalidHostPort(String),
    InvalidFileName(String),
    BindFailed(SocketAddrV4, io::Error),
    ConnectFailed(SocketAddrV4, io::Error),
    AcceptFailed(io::Error),
    LocalFileFailed(PathBuf, io::Error),
    TransferFailed(io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::NoDataMode => write!(f, "No data mode armed, use PASV or PORT first"),
            TransferError::InvalidHostPort(arg) => {
                write!(f, "Invalid host-port argument: {}", arg)
            }
            TransferError::InvalidFileName(name) => {
                write!(f, "No local file name can be derived from {:?}", name)
            }
            TransferError::BindFailed(addr, e) => {
                write!(f, "Failed to listen on {}: {}", addr, e)
            }
            TransferError::ConnectFailed(addr, e) => {
                write!(f, "Failed to open data connection to {}: {}", addr, e)
            }
            TransferError::AcceptFailed(e) => {
                write!(f, "Failed to accept data connection: {}", e)
            }
            TransferError::LocalFileFailed(path, e) => {
                write!(f, "Cannot write local file {}: {}", path.display(), e)
            }
            TransferError::TransferFailed(e) => write!(f, "Transfer failed: {}", e),
        }
    }
}

impl std::error::Error for TransferError {}

/// General FTP client error that encompasses all error types
#[derive(Debug)]
pub enum FtpClientError {
    Control(ControlError),
    Transfer(TransferError),
    Io(io::Error),
}

impl fmt::Display for FtpClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtpClientError::Control(e) => write!(f, "Control error: {}", e),
            FtpClientError::Transfer(e) => write!(f, "Transfer error: {}", e),
            FtpClientError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for FtpClientError {}

impl From<ControlError> for FtpClientError {
    fn from(error: ControlError) -> Self {
        FtpClientError::Control(error)
    }
}

impl From<TransferError> for FtpClientError {
    fn from(error: TransferError) -> Self {
        FtpClientError::Transfer(error)
    }
}

impl From<io::Error> for FtpClientError {
    fn from(error: io::Error) -> Self {
        FtpClientError::Io(error)
    }
}
