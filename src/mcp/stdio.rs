//! Newline-delimited JSON session transport
//!
//! One complete JSON document per line in, at most one response line out.
//! Diagnostics go to the logging side channel, never the output stream, so
//! the peer sees nothing but response lines.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::mcp::server::handle_request;
use crate::AppState;

/// Blocking session loop: read a line, handle it, write and flush the
/// response, repeat until end-of-stream.
///
/// Lines that fail to parse as JSON produce no response at all (no `id` can
/// be recovered from them), and a fault while handling a parsed request is
/// logged and swallowed; neither ends the session. Only end-of-stream (clean
/// return) or an I/O failure on the streams themselves gets out of the loop.
pub async fn serve<R, W>(state: &AppState, mut reader: R, mut writer: W) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            info!("input stream closed, ending session");
            return Ok(());
        }

        let payload: Value = match serde_json::from_str(line.trim()) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "discarded input line that is not valid JSON");
                continue;
            }
        };

        let response = match handle_request(state, payload).await {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "request handling failed");
                continue;
            }
        };

        let mut serialized = serde_json::to_string(&response)?;
        serialized.push('\n');
        // Flush per response: the peer must see each reply before the next
        // line is read.
        writer.write_all(serialized.as_bytes()).await?;
        writer.flush().await?;
    }
}

pub async fn serve_stdio(state: &AppState) -> Result<(), AppError> {
    serve(
        state,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}
