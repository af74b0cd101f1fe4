//! File operations for data transfers
//!
//! RETR downloads are copied byte for byte into a local file. LIST output is
//! decoded leniently and streamed to the operator. Both finish only once the
//! data connection hit end of stream and the final control reply was read.

use log::{info, warn};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::control::ControlChannel;
use crate::error::{FtpClientError, TransferError};
use crate::protocol::Reply;
use crate::protocol::responses::TRANSFER_COMPLETE;
use crate::transfer::{DataNegotiator, TransferOutcome};
use crate::utils::LossyUtf8Decoder;

/// Runs a RETR command and stores the payload at `local_path`.
///
/// The data connection is acquired after the preliminary reply and is
/// closed before the final reply is read.
pub async fn handle_file_download<R, W, O>(
    control: &mut ControlChannel<R, W>,
    negotiator: &mut DataNegotiator,
    command_line: &str,
    local_path: &Path,
    buffer_size: usize,
    output: &mut O,
) -> Result<TransferOutcome, FtpClientError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    O: AsyncWrite + Unpin,
{
    control.send_line(command_line).await?;
    let preliminary = control.read_response(output).await?;

    if let Some(outcome) = check_preliminary(control, negotiator, &preliminary, output).await? {
        return Ok(outcome);
    }

    let received = receive_file(negotiator, local_path, buffer_size).await;
    let final_reply = control.read_response(output).await?;
    check_final(&final_reply);
    let bytes = received?;

    info!("Downloaded {} bytes into {}", bytes, local_path.display());
    Ok(TransferOutcome::Completed {
        bytes,
        final_code: final_reply.code(),
    })
}

/// Runs a LIST command and writes the listing to `output`.
///
/// In active mode the server may connect before its preliminary reply
/// arrives, so the accept runs alongside the read of that reply. A refusal
/// that comes first leaves the listener untouched. The armed mode is torn
/// down once the listing has been streamed.
pub async fn handle_listing<R, W, O>(
    control: &mut ControlChannel<R, W>,
    negotiator: &mut DataNegotiator,
    command_line: &str,
    buffer_size: usize,
    output: &mut O,
) -> Result<TransferOutcome, FtpClientError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    O: AsyncWrite + Unpin,
{
    control.send_line(command_line).await?;

    let (early, preliminary) = if negotiator.mode().is_active() {
        let reply = control.read_response(output);
        tokio::pin!(reply);
        tokio::select! {
            accepted = negotiator.acquire_data_connection() => (Some(accepted), reply.await?),
            preliminary = &mut reply => (None, preliminary?),
        }
    } else {
        (None, control.read_response(output).await?)
    };

    if let Some(outcome) = check_preliminary(control, negotiator, &preliminary, output).await? {
        return Ok(outcome);
    }

    let data = match early {
        Some(accepted) => accepted,
        None => negotiator.acquire_data_connection().await,
    };
    let streamed = match data {
        Ok(stream) => stream_listing(stream, buffer_size, output).await,
        Err(e) => Err(e),
    };
    negotiator.reset();

    let final_reply = control.read_response(output).await?;
    check_final(&final_reply);
    let bytes = streamed?;

    info!("Listing complete, {} bytes", bytes);
    Ok(TransferOutcome::Completed {
        bytes,
        final_code: final_reply.code(),
    })
}

/// Decides whether a transfer may go on to its data connection.
///
/// A non-1xx preliminary reply ends the command. With no data mode armed
/// the server's follow-up error reply is drained before giving up.
async fn check_preliminary<R, W, O>(
    control: &mut ControlChannel<R, W>,
    negotiator: &DataNegotiator,
    preliminary: &Reply,
    output: &mut O,
) -> Result<Option<TransferOutcome>, FtpClientError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    O: AsyncWrite + Unpin,
{
    if !preliminary.is_preliminary() {
        warn!(
            "Transfer not started, server replied {:?}",
            preliminary.code()
        );
        return Ok(Some(TransferOutcome::Refused {
            code: preliminary.code(),
        }));
    }

    if !negotiator.is_armed() {
        control.read_response(output).await?;
        return Err(TransferError::NoDataMode.into());
    }

    Ok(None)
}

fn check_final(reply: &Reply) {
    if reply.code() != Some(TRANSFER_COMPLETE) {
        warn!("Transfer ended with reply {:?} instead of {}", reply.code(), TRANSFER_COMPLETE);
    }
}

async fn receive_file(
    negotiator: &mut DataNegotiator,
    local_path: &Path,
    buffer_size: usize,
) -> Result<u64, TransferError> {
    let mut data = negotiator.acquire_data_connection().await?;
    let file_err = |e: std::io::Error| TransferError::LocalFileFailed(local_path.to_path_buf(), e);

    let mut file = File::create(local_path).await.map_err(file_err)?;
    let mut buffer = vec![0u8; buffer_size];
    let mut total = 0u64;

    loop {
        let n = data
            .read(&mut buffer)
            .await
            .map_err(TransferError::TransferFailed)?;
        if n == 0 {
            break;
        }
        file.write_all(&buffer[..n]).await.map_err(file_err)?;
        total += n as u64;
    }

    file.flush().await.map_err(file_err)?;
    Ok(total)
}

async fn stream_listing<O>(
    mut data: TcpStream,
    buffer_size: usize,
    output: &mut O,
) -> Result<u64, TransferError>
where
    O: AsyncWrite + Unpin,
{
    let mut decoder = LossyUtf8Decoder::default();
    let mut buffer = vec![0u8; buffer_size];
    let mut total = 0u64;

    loop {
        let n = data
            .read(&mut buffer)
            .await
            .map_err(TransferError::TransferFailed)?;
        if n == 0 {
            break;
        }
        total += n as u64;

        let text = decoder.feed(&buffer[..n]);
        output
            .write_all(text.as_bytes())
            .await
            .map_err(TransferError::TransferFailed)?;
    }

    let tail = decoder.finish();
    output
        .write_all(tail.as_bytes())
        .await
        .map_err(TransferError::TransferFailed)?;
    output.flush().await.map_err(TransferError::TransferFailed)?;

    Ok(total)
}
