//! Transfer module for FTP client
//!
//! Handles data mode negotiation and the RETR/LIST transfers that run over
//! one short-lived data connection each.

pub mod file_ops;
pub mod modes;
pub mod negotiator;
pub mod results;

// Re-export key types and functions
pub use file_ops::{handle_file_download, handle_listing};
pub use modes::DataMode;
pub use negotiator::DataNegotiator;
pub use results::TransferOutcome;
