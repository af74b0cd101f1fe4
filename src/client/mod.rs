//! Client session and command loop
//!
//! Drives one control session from operator input.

pub mod handler;
pub mod session;

pub use handler::run_commands;
pub use session::ClientSession;
