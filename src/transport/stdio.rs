use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use super::{TransportError, MAX_MESSAGE_BYTES};
use crate::handlers::Dispatcher;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};

/// Serve newline-delimited JSON-RPC 2.0 on the process's stdin/stdout.
pub async fn run(dispatcher: &Dispatcher) -> Result<(), TransportError> {
    info!("starting MCP server in stdio mode");
    serve(
        dispatcher,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

/// Serve one stdio-style session over arbitrary streams.
///
/// Messages are handled strictly in order and each response is flushed before
/// the next line is read. Blank lines are ignored; undecodable lines are
/// logged, counted as errors and dropped. Returns `Ok(())` at end of input.
pub async fn serve<R, W>(dispatcher: &Dispatcher, reader: R, writer: W) -> Result<(), TransportError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let stats = dispatcher.stats();
    stats.connection_opened();
    let outcome = session(dispatcher, reader, writer).await;
    stats.connection_closed();
    outcome
}

async fn session<R, W>(dispatcher: &Dispatcher, mut reader: R, mut writer: W) -> Result<(), TransportError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let stats = dispatcher.stats();
    let mut raw = Vec::new();

    loop {
        raw.clear();
        // At most one byte past the cap is buffered per line.
        let n = (&mut reader)
            .take(MAX_MESSAGE_BYTES as u64 + 1)
            .read_until(b'\n', &mut raw)
            .await
            .map_err(TransportError::Read)?;
        if n == 0 {
            info!("received EOF, shutting down");
            return Ok(());
        }

        if n > MAX_MESSAGE_BYTES {
            if raw.last() != Some(&b'\n') {
                discard_line(&mut reader).await.map_err(TransportError::Read)?;
            }
            warn!(limit = MAX_MESSAGE_BYTES, "message too large, dropped");
            stats.increment_errors();
            continue;
        }

        let trimmed = match std::str::from_utf8(&raw) {
            Ok(s) => s.trim(),
            Err(e) => {
                warn!(error = %e, "message is not valid UTF-8, dropped");
                stats.increment_errors();
                continue;
            }
        };

        if trimmed.is_empty() {
            continue;
        }

        let req: JsonRpcRequest = match serde_json::from_str(trimmed) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "error decoding message, dropped");
                stats.increment_errors();
                continue;
            }
        };

        if let Some(resp) = dispatcher.handle(&req).await {
            if let Err(e) = write_response(&mut writer, &resp).await {
                stats.increment_errors();
                return Err(e);
            }
        }
    }
}

/// Skip the rest of the current line without buffering it.
async fn discard_line<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let (newline, available) = {
            let buf = reader.fill_buf().await?;
            (buf.iter().position(|b| *b == b'\n'), buf.len())
        };
        match newline {
            Some(i) => {
                reader.consume(i + 1);
                return Ok(());
            }
            None if available == 0 => return Ok(()),
            None => reader.consume(available),
        }
    }
}

async fn write_response<W>(writer: &mut W, resp: &JsonRpcResponse) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let out = serde_json::to_string(resp)?;
    writer.write_all(out.as_bytes()).await.map_err(TransportError::Write)?;
    writer.write_all(b"\n").await.map_err(TransportError::Write)?;
    writer.flush().await.map_err(TransportError::Write)?;
    Ok(())
}
