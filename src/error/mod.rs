//! Error handling
//!
//! Defines error types and handling for the FTP client.

pub mod handlers;
pub mod types;

pub use handlers::{handle_error, is_fatal};
pub use types::*;
