//! Module `commands`
//!
//! Defines how an operator input line is classified before it is sent
//! to the server, and how the dispatcher should proceed afterwards.

/// An operator command, classified by its verb.
///
/// Every variant keeps the raw line, which is what goes over the wire.
/// Only the verbs that need client-side work are singled out; anything
/// else is forwarded untouched.
#[derive(Debug, PartialEq)]
pub enum Command {
    Pasv(String),              // Enter passive mode
    Port(String, String),      // Active mode, with its h1,h2,h3,h4,p1,p2 argument
    Retr(String, String),      // Download, with the remote file name
    List(String),              // Directory listing
    Quit(String),              // End the session
    Passthrough(String),       // Sent verbatim, one reply read
}

impl Command {
    /// The line sent to the server
    pub fn raw(&self) -> &str {
        match self {
            Command::Pasv(raw)
            | Command::Port(raw, _)
            | Command::Retr(raw, _)
            | Command::List(raw)
            | Command::Quit(raw)
            | Command::Passthrough(raw) => raw,
        }
    }

    /// Whether the command opens a data connection
    pub fn is_transfer(&self) -> bool {
        matches!(self, Command::Retr(..) | Command::List(_))
    }
}

/// What the dispatcher does once a command has been handled.
#[derive(Debug, PartialEq)]
pub enum CommandStatus {
    Continue,
    CloseConnection,
}
