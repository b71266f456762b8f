//! Output stream of a child process.
//!
//! A background task reads the raw stdout pipe and forwards every chunk it
//! gets over a channel. Receiving the first chunk is the "output available"
//! notification; whatever else is already queued can then be drained without
//! waiting. There is no framing: a chunk boundary carries no meaning.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use frotzer_core::{Error, Result};

const READ_BUFFER_SIZE: usize = 4096;

/// Notification-driven view of a process output pipe.
#[derive(Debug)]
pub struct OutputStream {
    /// Chunks read by the pump task
    chunks: mpsc::UnboundedReceiver<Vec<u8>>,
    /// Pump task, aborted on drop
    pump: JoinHandle<()>,
}

impl OutputStream {
    /// Start pumping `reader` in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let pump = tokio::spawn(pump(reader, tx));
        Self { chunks: rx, pump }
    }

    /// Wait for the next chunk of output.
    ///
    /// Fails with [`Error::ResponseTimeout`] if nothing arrives within
    /// `timeout`, and with [`Error::ProcessTerminated`] if the pipe closed and
    /// everything it delivered has been consumed.
    pub async fn readable(&mut self, timeout: Duration) -> Result<Vec<u8>> {
        match tokio::time::timeout(timeout, self.chunks.recv()).await {
            Ok(Some(chunk)) => Ok(chunk),
            Ok(None) => Err(Error::ProcessTerminated),
            Err(_) => Err(Error::ResponseTimeout(timeout.as_millis() as u64)),
        }
    }

    /// Take every chunk that is already queued, without waiting.
    pub fn drain(&mut self) -> Vec<u8> {
        let mut bytes = Vec::new();
        while let Ok(chunk) = self.chunks.try_recv() {
            bytes.extend_from_slice(&chunk);
        }
        bytes
    }

    /// Wait for output, then collect everything that belongs to the same burst.
    ///
    /// After the first chunk, queued chunks are drained, and collection goes
    /// on for as long as new chunks keep arriving less than `grace` apart.
    /// A zero `grace` drains only what is queued.
    pub async fn next_burst(&mut self, timeout: Duration, grace: Duration) -> Result<Vec<u8>> {
        let mut bytes = self.readable(timeout).await?;
        bytes.extend(self.drain());

        if !grace.is_zero() {
            while let Ok(Some(chunk)) = tokio::time::timeout(grace, self.chunks.recv()).await {
                bytes.extend(chunk);
                bytes.extend(self.drain());
            }
        }

        debug!("Collected output burst: {} bytes", bytes.len());
        Ok(bytes)
    }
}

impl Drop for OutputStream {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

async fn pump<R>(mut reader: R, tx: mpsc::UnboundedSender<Vec<u8>>)
where
    R: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];

    loop {
        match reader.read(&mut buffer).await {
            Ok(0) => {
                debug!("Output pipe reached EOF");
                break;
            }
            Ok(n) => {
                if tx.send(buffer[..n].to_vec()).is_err() {
                    break; // Receiver dropped
                }
            }
            Err(e) => {
                warn!("Failed to read output pipe: {}", e);
                break;
            }
        }
    }
}
