//! Connection - the Client worker for one socket.
//!
//! ```text
//!   socket ──► FramedRead<LinesCodec> ──► Line events ──► Coordinator
//!   socket ◄── write loop ◄── outbound queue ◄── Coordinator / Rooms
//! ```
//!
//! Overlong lines are dropped by the codec and reading carries on. The
//! reader stops when the stream ends, a read fails, or the handle's close
//! token fires. It then reports a Disconnect; the coordinator and
//! rooms do the actual teardown. The write loop flushes whatever is still
//! queued before shutting the socket.

mod codec;

use codec::ClientCodec;

use crate::state::client::{ClientHandle, ClientRef};
use crate::state::coordinator::CoordinatorHandle;
use crate::state::event::{Event, EventKind};
use futures_util::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, WriteHalf};
use tokio::sync::mpsc;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Longest line accepted from a client, in bytes.
pub const MAX_LINE_LEN: usize = 4096;

/// A client connection handler.
pub struct Connection<S> {
    handle: ClientHandle,
    outbound: mpsc::Receiver<String>,
    stream: S,
    coordinator: CoordinatorHandle,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    pub fn new(
        handle: ClientHandle,
        outbound: mpsc::Receiver<String>,
        stream: S,
        coordinator: CoordinatorHandle,
    ) -> Self {
        Self {
            handle,
            outbound,
            stream,
            coordinator,
        }
    }

    /// Run until the client goes away. Never fails: connection errors are
    /// reported to the coordinator as a disconnect.
    #[instrument(skip(self), fields(client = self.handle.id(), addr = %self.handle.addr()), name = "connection")]
    pub async fn run(self) {
        let Self {
            handle,
            outbound,
            stream,
            coordinator,
        } = self;

        let (reader, writer) = tokio::io::split(stream);
        let closed = handle.closed_token();
        let writer_task = tokio::spawn(write_loop(writer, outbound, closed.clone()));

        let client = ClientRef::anonymous(handle.clone());
        coordinator.event(Event::new(client.clone(), EventKind::Connect, ""));

        let mut lines = FramedRead::new(reader, ClientCodec::new(MAX_LINE_LEN));
        loop {
            tokio::select! {
                _ = closed.cancelled() => break,
                next = lines.next() => match next {
                    Some(Ok(line)) => {
                        let line = line.trim_end_matches(['\r', '\n']);
                        if line.is_empty() {
                            continue;
                        }
                        if !coordinator.event(Event::new(client.clone(), EventKind::Line, line)) {
                            break;
                        }
                    }
                    // I/O failure or invalid UTF-8. The stream is done either way.
                    Some(Err(e)) => {
                        debug!(error = %e, "Read failed");
                        break;
                    }
                    None => break,
                },
            }
        }

        handle.close();
        coordinator.event(Event::new(client, EventKind::Disconnect, ""));
        let _ = writer_task.await;
        info!("Connection closed");
    }
}

/// Write queued lines until the connection closes, then flush the rest.
async fn write_loop<S>(mut writer: WriteHalf<S>, mut outbound: mpsc::Receiver<String>, closed: CancellationToken)
where
    S: AsyncRead + AsyncWrite,
{
    loop {
        tokio::select! {
            biased;
            line = outbound.recv() => match line {
                Some(line) => {
                    if let Err(e) = write_line(&mut writer, &line).await {
                        debug!(error = %e, "Write failed");
                        closed.cancel();
                        break;
                    }
                }
                None => break,
            },
            _ = closed.cancelled() => {
                while let Ok(line) = outbound.try_recv() {
                    if write_line(&mut writer, &line).await.is_err() {
                        break;
                    }
                }
                break;
            }
        }
    }
    let _ = writer.shutdown().await;
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\r\n").await
}
