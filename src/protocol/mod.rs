//! FTP Protocol implementation
//!
//! Handles command classification, reply framing and host-port decoding.

pub mod commands;
pub mod parser;
pub mod responses;

pub use commands::{Command, CommandStatus};
pub use parser::{find_host_port_tuple, parse_command, parse_host_port};
pub use responses::Reply;
