//! RAX FTP Client
//!
//! Interactive FTP client: one control connection, one short-lived data
//! connection per transfer, negotiated in passive or active mode.

pub mod client;
pub mod config;
pub mod control;
pub mod error;
pub mod protocol;
pub mod transfer;
pub mod utils;

pub use client::{ClientSession, run_commands};
pub use config::ClientConfig;
