//! Error handlers
//!
//! Decides how far an error travels: the command in progress, or the session.

use crate::error::types::{ControlError, FtpClientError, TransferError};
use log::{error, warn};

/// Log an FTP client error at the command boundary
pub fn handle_error(err: &FtpClientError) {
    match err {
        FtpClientError::Transfer(TransferError::NoDataMode) => {
            warn!("Command abandoned: {}", err)
        }
        _ => error!("Command failed: {}", err),
    }
}

/// Whether the session can no longer continue after this error
pub fn is_fatal(err: &FtpClientError) -> bool {
    matches!(
        err,
        FtpClientError::Control(ControlError::ConnectFailed(..))
            | FtpClientError::Control(ControlError::ConnectionClosed)
    )
}
