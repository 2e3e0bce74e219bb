//! Agent side of the multiplexed stream transport.
//!
//! Each accepted connection carries newline-delimited [`StreamFrame`]s.
//! Frames are answered concurrently and replies are written back through a
//! single writer task, tagged with the request's correlation id.

use crate::agent::services::HandlerRegistry;
use crate::transport::adapters::stream::MAX_FRAME_BYTES;
use crate::transport::domain::StreamFrame;
use futures_util::{SinkExt, StreamExt};
use std::io;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tokio_util::sync::CancellationToken;

const OUTBOUND_QUEUE: usize = 64;

/// Accepts stream connections until `shutdown` is cancelled.
///
/// # Errors
///
/// Returns the listener's I/O error if accepting fails.
pub async fn serve_stream(
    listener: TcpListener,
    registry: Arc<HandlerRegistry>,
    shutdown: CancellationToken,
) -> io::Result<()> {
    tracing::info!(addr = ?listener.local_addr().ok(), "stream listener ready");
    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                tracing::info!("stream listener stopping");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (socket, peer) = accepted?;
                tracing::debug!(%peer, "stream connection accepted");
                tokio::spawn(serve_connection(socket, Arc::clone(&registry)));
            }
        }
    }
}

async fn serve_connection(socket: TcpStream, registry: Arc<HandlerRegistry>) {
    let (read_half, write_half) = socket.into_split();
    let mut frames = FramedRead::new(read_half, LinesCodec::new_with_max_length(MAX_FRAME_BYTES));
    let (outbound, mut queue) = mpsc::channel::<String>(OUTBOUND_QUEUE);

    let writer = tokio::spawn(async move {
        let mut sink = FramedWrite::new(write_half, LinesCodec::new_with_max_length(MAX_FRAME_BYTES));
        while let Some(line) = queue.recv().await {
            if let Err(err) = sink.send(line).await {
                tracing::warn!(error = %err, "stream write failed");
                break;
            }
        }
    });

    while let Some(next) = frames.next().await {
        let line = match next {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(error = %err, "stream read failed");
                break;
            }
        };
        let frame: StreamFrame = match serde_json::from_str(&line) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(error = %err, "dropping undecodable frame");
                continue;
            }
        };

        let handlers = Arc::clone(&registry);
        let replies = outbound.clone();
        tokio::spawn(async move {
            let answer = handlers.handle_value(frame.message).await;
            let encoded = serde_json::to_value(&answer).and_then(|message| {
                serde_json::to_string(&StreamFrame {
                    correlation_id: frame.correlation_id,
                    message,
                })
            });
            match encoded {
                Ok(reply) => {
                    if replies.send(reply).await.is_err() {
                        tracing::debug!(
                            correlation_id = frame.correlation_id,
                            "connection closed before reply"
                        );
                    }
                }
                Err(err) => tracing::error!(error = %err, "reply encoding failed"),
            }
        });
    }

    drop(outbound);
    if let Err(err) = writer.await {
        tracing::warn!(error = %err, "stream writer task failed");
    }
}
