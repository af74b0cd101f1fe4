//! Module `channel`
//!
//! Owns the long-lived control connection. Commands go out as CRLF
//! terminated lines; replies come back one logical reply at a time and
//! every raw line is echoed to the operator as it arrives.

use log::{debug, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use crate::error::ControlError;
use crate::protocol::Reply;
use crate::protocol::responses::{format_command, is_terminator, multiline_start, reply_code};

/// The control connection, split into a buffered read cursor and a writer.
pub struct ControlChannel<R = BufReader<OwnedReadHalf>, W = OwnedWriteHalf> {
    reader: R,
    writer: W,
    peer: String,
}

impl ControlChannel {
    /// Opens the control connection to `host:port`.
    pub async fn connect(host: &str, port: u16) -> Result<Self, ControlError> {
        let address = format!("{}:{}", host, port);
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|e| ControlError::ConnectFailed(address.clone(), e))?;

        info!("Control connection established with {}", address);

        let (read_half, write_half) = stream.into_split();
        Ok(Self::from_parts(BufReader::new(read_half), write_half, address))
    }
}

impl<R, W> ControlChannel<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn from_parts(reader: R, writer: W, peer: String) -> Self {
        Self {
            reader,
            writer,
            peer,
        }
    }

    /// `host:port` of the server
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Sends one command line, adding the CRLF terminator if it is missing.
    pub async fn send_line(&mut self, text: &str) -> Result<(), ControlError> {
        let line = format_command(text);
        debug!("C> {}", line.trim_end());
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Reads one logical reply, echoing each line to `output`.
    ///
    /// A first line of the form `ddd-` opens a multi-line reply that runs
    /// until a line starting with the same `ddd` and whitespace. Anything
    /// else is a complete reply on its own.
    pub async fn read_response<O>(&mut self, output: &mut O) -> Result<Reply, ControlError>
    where
        O: AsyncWrite + Unpin,
    {
        let first = self
            .read_line(output)
            .await?
            .ok_or(ControlError::ConnectionClosed)?;

        let code = reply_code(&first).map(|(code, _)| code);
        let Some(open_code) = multiline_start(&first) else {
            return Ok(Reply::new(code, false, vec![first]));
        };

        let mut lines = vec![first];
        loop {
            let line = self
                .read_line(output)
                .await?
                .ok_or(ControlError::TruncatedReply(open_code))?;
            let done = is_terminator(&line, open_code);
            lines.push(line);
            if done {
                break;
            }
        }

        Ok(Reply::new(code, true, lines))
    }

    /// Reads one line without its terminator and echoes it; `None` at end of stream.
    async fn read_line<O>(&mut self, output: &mut O) -> Result<Option<String>, ControlError>
    where
        O: AsyncWrite + Unpin,
    {
        let mut raw = Vec::new();
        let n = self.reader.read_until(b'\n', &mut raw).await?;
        if n == 0 {
            return Ok(None);
        }

        let line = String::from_utf8_lossy(&raw)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        debug!("S< {}", line);

        output.write_all(line.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;

        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(input: &[u8]) -> ControlChannel<BufReader<&[u8]>, Vec<u8>> {
        ControlChannel::from_parts(BufReader::new(input), Vec::new(), "test".into())
    }

    #[tokio::test]
    async fn test_single_line_reply() {
        let mut control = channel(b"220 ready\r\n");
        let mut output = Vec::new();

        let reply = control.read_response(&mut output).await.unwrap();
        assert_eq!(reply.code(), Some(220));
        assert!(!reply.is_multiline());
        assert_eq!(reply.lines(), ["220 ready"]);
        assert_eq!(output, b"220 ready\n");
    }

    #[tokio::test]
    async fn test_multiline_reply_stops_at_terminator() {
        let mut control = channel(
            b"211-Features:\r\n PASV\r\n211-still going\r\n211 End\r\n200 next reply\r\n",
        );
        let mut output = Vec::new();

        let reply = control.read_response(&mut output).await.unwrap();
        assert_eq!(reply.code(), Some(211));
        assert!(reply.is_multiline());
        assert_eq!(
            reply.lines(),
            ["211-Features:", " PASV", "211-still going", "211 End"]
        );

        let next = control.read_response(&mut output).await.unwrap();
        assert_eq!(next.lines(), ["200 next reply"]);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "211-Features:\n PASV\n211-still going\n211 End\n200 next reply\n"
        );
    }

    #[tokio::test]
    async fn test_multiline_ignores_other_codes() {
        let mut control = channel(b"220-Welcome\r\n230 not mine\r\n220 ready\r\n");
        let mut output = Vec::new();

        let reply = control.read_response(&mut output).await.unwrap();
        assert_eq!(reply.lines().len(), 3);
        assert_eq!(reply.lines()[2], "220 ready");
    }

    #[tokio::test]
    async fn test_bare_lf_and_invalid_utf8_are_tolerated() {
        let mut control = channel(b"550 caf\xff\n");
        let mut output = Vec::new();

        let reply = control.read_response(&mut output).await.unwrap();
        assert_eq!(reply.code(), Some(550));
        assert_eq!(reply.lines(), ["550 caf\u{FFFD}"]);
    }

    #[tokio::test]
    async fn test_truncated_multiline_reply() {
        let mut control = channel(b"211-Features:\r\n PASV\r\n");
        let mut output = Vec::new();

        let err = control.read_response(&mut output).await.unwrap_err();
        assert!(matches!(err, ControlError::TruncatedReply(211)));
        assert_eq!(output, b"211-Features:\n PASV\n");
    }

    #[tokio::test]
    async fn test_closed_connection() {
        let mut control = channel(b"");
        let mut output = Vec::new();

        let err = control.read_response(&mut output).await.unwrap_err();
        assert!(matches!(err, ControlError::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_send_line_appends_crlf() {
        let mut control = channel(b"");
        control.send_line("USER anonymous").await.unwrap();
        control.send_line("NOOP\r\n").await.unwrap();
        assert_eq!(control.writer, b"USER anonymous\r\nNOOP\r\n");
    }
}
