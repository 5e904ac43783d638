//! stdio transport for MCP

use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info};

use crate::protocol::RequestHandler;

/// Responses waiting for the writer
const OUTBOX_CAPACITY: usize = 64;

/// Default cap on lines being handled at once
const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// stdio transport for MCP protocol
///
/// Each line is handled on its own task, so a slow tool call does not hold
/// up the requests behind it. Responses are written as they complete.
/// Reading pauses while `max_in_flight` lines are still being handled.
pub struct StdioTransport {
    handler: Arc<RequestHandler>,
    max_in_flight: usize,
}

impl StdioTransport {
    /// Create a new stdio transport
    pub fn new(handler: Arc<RequestHandler>) -> Self {
        Self {
            handler,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    /// Limit the number of lines handled concurrently (at least one)
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Run on the process's stdin/stdout until EOF
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        info!("Starting MCP server on stdio");

        let stdin = BufReader::new(tokio::io::stdin());
        self.serve(stdin, tokio::io::stdout()).await?;

        info!("EOF received, shutting down");
        Ok(())
    }

    /// Serve newline-delimited JSON from `reader` to `writer`
    ///
    /// Returns the writer once every in-flight request has been answered.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> std::io::Result<W>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<Vec<u8>>(OUTBOX_CAPACITY);

        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(bytes) = rx.recv().await {
                writer.write_all(&bytes).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            Ok::<W, std::io::Error>(writer)
        });

        let permits = Arc::new(Semaphore::new(self.max_in_flight));
        let mut reader = reader;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            // Raw bytes, so a non-UTF-8 line is answered with a parse error
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let line = trim_line(&buf).to_vec();
            if line.is_empty() {
                continue;
            }

            debug!("Received: {}", String::from_utf8_lossy(&line));

            let permit = match permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let handler = self.handler.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let _permit = permit;
                if let Some(response) = handler.handle_payload(&line).await {
                    debug!("Sending: {}", String::from_utf8_lossy(&response));
                    if tx.send(response).await.is_err() {
                        error!("Response dropped, writer has stopped");
                    }
                }
            });
        }

        // The writer finishes once the last in-flight task drops its sender
        drop(tx);
        writer_task
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?
    }
}

fn trim_line(line: &[u8]) -> &[u8] {
    let start = line
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(line.len());
    let end = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &line[start..end]
}
