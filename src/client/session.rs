//! Client session management
//!
//! Ties the control channel and the data mode negotiator together and runs
//! one classified command to completion.

use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use crate::config::ClientConfig;
use crate::control::ControlChannel;
use crate::error::{ControlError, FtpClientError, handle_error};
use crate::protocol::{Command, CommandStatus, Reply};
use crate::transfer::{DataNegotiator, handle_file_download, handle_listing};

/// One control session and its data mode
pub struct ClientSession<R = BufReader<OwnedReadHalf>, W = OwnedWriteHalf> {
    control: ControlChannel<R, W>,
    negotiator: DataNegotiator,
    config: ClientConfig,
}

impl ClientSession {
    /// Connects to the server named by `config`.
    pub async fn connect(config: ClientConfig) -> Result<Self, FtpClientError> {
        let control = ControlChannel::connect(&config.host, config.port).await?;
        Ok(Self::new(control, config))
    }
}

impl<R, W> ClientSession<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(control: ControlChannel<R, W>, config: ClientConfig) -> Self {
        Self {
            control,
            negotiator: DataNegotiator::default(),
            config,
        }
    }

    pub fn negotiator(&self) -> &DataNegotiator {
        &self.negotiator
    }

    /// Reads and prints the server greeting.
    pub async fn read_welcome<O>(&mut self, output: &mut O) -> Result<Reply, FtpClientError>
    where
        O: AsyncWrite + Unpin,
    {
        let reply = self.control.read_response(output).await?;
        info!("Connected to {} ({:?})", self.control.peer(), reply.code());
        Ok(reply)
    }

    /// Runs one command, including any data transfer it starts.
    pub async fn execute<O>(
        &mut self,
        command: &Command,
        output: &mut O,
    ) -> Result<CommandStatus, FtpClientError>
    where
        O: AsyncWrite + Unpin,
    {
        match command {
            Command::Pasv(line) => {
                self.control.send_line(line).await?;
                let reply = self.control.read_response(output).await?;
                self.negotiator.on_passive_reply(&reply);
            }
            Command::Port(line, args) => {
                // The listener must exist before the server hears about it.
                // On failure the command still goes out so the server's
                // answer reaches the operator.
                if let Err(e) = self.negotiator.on_active_request(args) {
                    handle_error(&e.into());
                }
                self.control.send_line(line).await?;
                self.control.read_response(output).await?;
            }
            Command::Retr(line, filename) => {
                let local_path = self.config.download_path(filename)?;
                let outcome = handle_file_download(
                    &mut self.control,
                    &mut self.negotiator,
                    line,
                    &local_path,
                    self.config.buffer_size,
                    output,
                )
                .await?;
                info!("RETR {}: {}", filename, outcome);
            }
            Command::List(line) => {
                let outcome = handle_listing(
                    &mut self.control,
                    &mut self.negotiator,
                    line,
                    self.config.buffer_size,
                    output,
                )
                .await?;
                info!("LIST: {}", outcome);
            }
            Command::Quit(line) => {
                self.control.send_line(line).await?;
                match self.control.read_response(output).await {
                    Ok(reply) if !reply.is_completion() => {
                        warn!("Server answered {:?} to quit, closing anyway", reply.code());
                    }
                    Ok(_) => {}
                    // Hanging up is an acceptable answer to a quit.
                    Err(ControlError::ConnectionClosed) => {
                        info!("Server closed the connection without a quit reply");
                    }
                    Err(e) => return Err(e.into()),
                }
                return Ok(CommandStatus::CloseConnection);
            }
            Command::Passthrough(line) => {
                self.control.send_line(line).await?;
                self.control.read_response(output).await?;
            }
        }

        Ok(CommandStatus::Continue)
    }
}
