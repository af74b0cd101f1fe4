use log::{debug, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite};

use crate::client::ClientSession;
use crate::error::{FtpClientError, handle_error, is_fatal};
use crate::protocol::{CommandStatus, parse_command};

/// Runs the interactive command loop.
///
/// - Reads one command per line from `input` until end of input.
/// - Each command is fully resolved, data transfer included, before the
///   next line is read.
/// - Errors are logged and end only the command in progress, unless the
///   control connection itself is gone.
pub async fn run_commands<R, W, I, O>(
    session: &mut ClientSession<R, W>,
    input: I,
    output: &mut O,
) -> Result<(), FtpClientError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let command = parse_command(trimmed);
        debug!(
            "Dispatching {:?}{}",
            command,
            if command.is_transfer() { " (data transfer)" } else { "" }
        );

        match session.execute(&command, output).await {
            Ok(CommandStatus::Continue) => {}
            Ok(CommandStatus::CloseConnection) => {
                info!("Session closed by {}", command.raw());
                return Ok(());
            }
            Err(e) if is_fatal(&e) => return Err(e),
            Err(e) => handle_error(&e),
        }
    }

    info!("End of input, closing session");
    Ok(())
}
