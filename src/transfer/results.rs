//! Transfer result types
//!
//! Defines how a transfer command ended once its control replies were read.

use std::fmt;

/// Terminal state of a RETR or LIST command
#[derive(Debug, PartialEq)]
pub enum TransferOutcome {
    /// Payload received and the final reply read
    Completed { bytes: u64, final_code: Option<u16> },
    /// Preliminary reply was not 1xx; no data connection was touched
    Refused { code: Option<u16> },
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferOutcome::Completed { bytes, final_code } => match final_code {
                Some(code) => write!(f, "{} bytes received, server replied {}", bytes, code),
                None => write!(f, "{} bytes received", bytes),
            },
            TransferOutcome::Refused { code: Some(code) } => {
                write!(f, "refused by server ({})", code)
            }
            TransferOutcome::Refused { code: None } => write!(f, "refused by server"),
        }
    }
}
