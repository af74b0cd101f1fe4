//! Control connection
//!
//! The single long-lived command/reply connection to the server.

pub mod channel;

pub use channel::ControlChannel;
