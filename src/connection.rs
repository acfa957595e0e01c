// MIT License - Copyright (c) 2018 Nick Whyte
// Rust translation of src/connection.ts

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{NessError, Result};

/// Write half of the panel link, shared with the status polling task.
/// Empty while a reconnect is in progress.
pub(crate) type SharedWriter = Arc<Mutex<Option<OwnedWriteHalf>>>;

/// Write raw bytes to the panel, failing if the link is currently down.
pub(crate) async fn write_all(writer: &SharedWriter, payload: &[u8]) -> Result<()> {
    let mut guard = writer.lock().await;
    match guard.as_mut() {
        Some(write_half) => {
            write_half.write_all(payload).await?;
            Ok(())
        }
        None => Err(NessError::Disconnected),
    }
}

/// Line-oriented TCP link to the panel.
///
/// The panel delivers one frame per CRLF-terminated line. A spawned reader
/// task forwards complete lines and re-establishes the connection whenever
/// it drops, until shut down.
pub(crate) struct Connection {
    writer: SharedWriter,
    reader_handle: Option<tokio::task::JoinHandle<()>>,
}

impl Connection {
    /// Connect to the panel and spawn the reader task. Received lines are
    /// delivered on the returned channel.
    ///
    /// The initial connection attempt fails hard; later drops are retried
    /// forever with `reconnect_delay` between attempts.
    pub(crate) async fn open(
        host: &str,
        port: u16,
        reconnect_delay: Duration,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Result<(Connection, mpsc::Receiver<String>)> {
        let stream = TcpStream::connect((host, port)).await?;
        debug!("TCP socket connected");

        let (read_half, write_half) = stream.into_split();
        let writer: SharedWriter = Arc::new(Mutex::new(Some(write_half)));
        let (line_tx, line_rx) = mpsc::channel(64);

        let reader_handle = spawn_reader_task(
            host.to_string(),
            port,
            reconnect_delay,
            read_half,
            writer.clone(),
            line_tx,
            shutdown_rx,
        );

        Ok((
            Connection {
                writer,
                reader_handle: Some(reader_handle),
            },
            line_rx,
        ))
    }

    pub(crate) fn shared_writer(&self) -> SharedWriter {
        self.writer.clone()
    }

    pub(crate) async fn write(&self, payload: &[u8]) -> Result<()> {
        write_all(&self.writer, payload).await
    }

    /// Stop the reader task and close the link.
    pub(crate) async fn close(&mut self) {
        if let Some(handle) = self.reader_handle.take() {
            handle.abort();
        }
        // Dropping the write half sends FIN to the panel
        self.writer.lock().await.take();
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Some(handle) = self.reader_handle.take() {
            handle.abort();
        }
    }
}

/// Spawn the reader task that forwards panel lines and reconnects on loss.
fn spawn_reader_task(
    host: String,
    port: u16,
    reconnect_delay: Duration,
    read_half: OwnedReadHalf,
    writer: SharedWriter,
    line_tx: mpsc::Sender<String>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(read_half);
        loop {
            let mut line = String::new();
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
                read = reader.read_line(&mut line) => {
                    match read {
                        Ok(0) => {
                            warn!("Connection closed by panel");
                            match reconnect(&host, port, reconnect_delay, &writer, &shutdown_rx).await {
                                Some(new_reader) => reader = new_reader,
                                None => break,
                            }
                        }
                        Ok(_) => {
                            let trimmed = line.trim();
                            if trimmed.is_empty() {
                                continue;
                            }
                            if line_tx.send(trimmed.to_string()).await.is_err() {
                                // Receiving side is gone; nothing left to do
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("Read error: {}", e);
                            match reconnect(&host, port, reconnect_delay, &writer, &shutdown_rx).await {
                                Some(new_reader) => reader = new_reader,
                                None => break,
                            }
                        }
                    }
                }
            }
        }
    })
}

/// Re-establish the connection after a drop. Returns `None` once shutdown
/// has been signalled.
async fn reconnect(
    host: &str,
    port: u16,
    delay: Duration,
    writer: &SharedWriter,
    shutdown_rx: &watch::Receiver<bool>,
) -> Option<BufReader<OwnedReadHalf>> {
    // Drop the stale write half before retrying
    writer.lock().await.take();

    loop {
        if *shutdown_rx.borrow() {
            return None;
        }
        sleep(delay).await;
        match TcpStream::connect((host, port)).await {
            Ok(stream) => {
                info!("Reconnected to panel at {}:{}", host, port);
                let (read_half, write_half) = stream.into_split();
                *writer.lock().await = Some(write_half);
                return Some(BufReader::new(read_half));
            }
            Err(e) => {
                warn!("Reconnect attempt failed: {}", e);
            }
        }
    }
}
