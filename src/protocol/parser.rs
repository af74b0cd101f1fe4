//! FTP parsing
//!
//! Classifies operator input and decodes the `h1,h2,h3,h4,p1,p2`
//! host-port notation used by PASV replies and PORT arguments.

use lazy_regex::{Lazy, Regex, lazy_regex};
use std::net::{Ipv4Addr, SocketAddrV4};

use crate::error::TransferError;
use crate::protocol::Command;

/// Parses a raw operator line into a `Command`.
///
/// The verb is matched case-insensitively. Verbs that need an argument
/// fall back to `Passthrough` when it is missing, so the server can answer
/// with its own syntax error.
pub fn parse_command(raw: &str) -> Command {
    let trimmed = raw.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("").to_ascii_uppercase();
    let arg = parts.next().unwrap_or("").trim();
    let line = trimmed.to_string();

    match cmd.as_str() {
        "PASV" => Command::Pasv(line),
        "PORT" if !arg.is_empty() => Command::Port(line, arg.to_string()),
        "RETR" if !arg.is_empty() => Command::Retr(line, arg.to_string()),
        "LIST" => Command::List(line),
        "QUIT" | "BYE" | "EXIT" => Command::Quit(line),
        _ => Command::Passthrough(line),
    }
}

/// Decodes `h1,h2,h3,h4,p1,p2` into an IPv4 endpoint with port `p1*256+p2`.
pub fn parse_host_port(arg: &str) -> Result<SocketAddrV4, TransferError> {
    let fields = arg
        .split(',')
        .map(|field| field.trim().parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| TransferError::InvalidHostPort(arg.to_string()))?;

    if fields.len() != 6 {
        return Err(TransferError::InvalidHostPort(arg.to_string()));
    }

    let ip = Ipv4Addr::new(fields[0], fields[1], fields[2], fields[3]);
    let port = u16::from(fields[4]) * 256 + u16::from(fields[5]);
    Ok(SocketAddrV4::new(ip, port))
}

/// `(h1,h2,h3,h4,p1,p2)` as it appears in a PASV reply
static HOST_PORT_TUPLE_RE: Lazy<Regex> =
    lazy_regex!(r"\((\d+),(\d+),(\d+),(\d+),(\d+),(\d+)\)");

/// Finds the last parenthesized host-port tuple in `text`.
///
/// Tuples with a field above 255 are skipped.
pub fn find_host_port_tuple(text: &str) -> Option<SocketAddrV4> {
    HOST_PORT_TUPLE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let mut fields = [0u8; 6];
            for (i, field) in fields.iter_mut().enumerate() {
                *field = caps[i + 1].parse().ok()?;
            }
            let ip = Ipv4Addr::new(fields[0], fields[1], fields[2], fields[3]);
            Some(SocketAddrV4::new(ip, (u16::from(fields[4]) << 8) | u16::from(fields[5])))
        })
        .last()
}
