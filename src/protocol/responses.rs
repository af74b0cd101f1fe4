//! FTP Response handling
//!
//! Models one logical server reply and the line rules that delimit it.

/// Standard FTP reply codes
pub const TRANSFER_COMPLETE: u16 = 226;
pub const ENTERING_PASSIVE: u16 = 227;

/// One logical reply: a single line, or a `ddd-` ... `ddd ` block.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    code: Option<u16>,
    multiline: bool,
    lines: Vec<String>,
}

impl Reply {
    pub fn new(code: Option<u16>, multiline: bool, lines: Vec<String>) -> Self {
        Self {
            code,
            multiline,
            lines,
        }
    }

    /// Reply code of the first line, if it starts with three digits
    pub fn code(&self) -> Option<u16> {
        self.code
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All lines joined with `\n`
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// 1xx: the server is about to use the data connection
    pub fn is_preliminary(&self) -> bool {
        matches!(self.code, Some(100..=199))
    }

    /// 2xx
    pub fn is_completion(&self) -> bool {
        matches!(self.code, Some(200..=299))
    }
}

/// Splits the leading `ddd` off a line, with the character that follows it.
pub fn reply_code(line: &str) -> Option<(u16, Option<char>)> {
    let digits = line.get(..3)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let code = digits.parse().ok()?;
    Some((code, line[3..].chars().next()))
}

/// The code opening a multi-line reply (`ddd-`), if `line` is such a line.
pub fn multiline_start(line: &str) -> Option<u16> {
    match reply_code(line) {
        Some((code, Some('-'))) => Some(code),
        _ => None,
    }
}

/// Whether `line` closes a multi-line reply opened with `code`.
pub fn is_terminator(line: &str, code: u16) -> bool {
    match reply_code(line) {
        Some((found, Some(sep))) => found == code && sep.is_whitespace(),
        _ => false,
    }
}

/// Format a command line for the wire
pub fn format_command(line: &str) -> String {
    format!("{}\r\n", line.trim_end_matches(['\r', '\n']))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_code() {
        assert_eq!(reply_code("220 ready"), Some((220, Some(' '))));
        assert_eq!(reply_code("211-Features"), Some((211, Some('-'))));
        assert_eq!(reply_code("226"), Some((226, None)));
        assert_eq!(reply_code(" PASV"), None);
        assert_eq!(reply_code("2x0 nope"), None);
        assert_eq!(reply_code("22"), None);
    }

    #[test]
    fn test_multiline_markers() {
        assert_eq!(multiline_start("211-Features:"), Some(211));
        assert_eq!(multiline_start("211 End"), None);

        assert!(is_terminator("211 End", 211));
        assert!(is_terminator("211\tEnd", 211));
        assert!(!is_terminator("211-more", 211));
        assert!(!is_terminator("212 other", 211));
        assert!(!is_terminator(" 211 indented", 211));
        assert!(!is_terminator("211", 211));
    }

    #[test]
    fn test_reply_classification() {
        let reply = Reply::new(Some(150), false, vec!["150 Opening".into()]);
        assert!(reply.is_preliminary());
        assert!(!reply.is_completion());

        let reply = Reply::new(Some(TRANSFER_COMPLETE), false, vec!["226 Done".into()]);
        assert!(reply.is_completion());

        let reply = Reply::new(None, false, vec!["garbage".into()]);
        assert!(!reply.is_preliminary());
        assert!(!reply.is_completion());
    }

    #[test]
    fn test_format_command_appends_single_crlf() {
        assert_eq!(format_command("NOOP"), "NOOP\r\n");
        assert_eq!(format_command("NOOP\r\n"), "NOOP\r\n");
        assert_eq!(format_command("NOOP\n"), "NOOP\r\n");
    }
}
