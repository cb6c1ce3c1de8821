use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::backend::{AudioChunk, CaptureBackend};

/// Live audio capture for one recording session.
///
/// Owns the device through its backend and buffers every chunk the device
/// produces, in arrival order. Nothing leaves the buffer until `stop`,
/// which flushes the whole ordered sequence exactly once — matching the
/// data model where the session's chunk list only fills during
/// finalization.
pub struct AudioCaptureStream {
    backend: Box<dyn CaptureBackend>,
    buffer: Arc<Mutex<Vec<AudioChunk>>>,
    buffer_task: Option<JoinHandle<()>>,
    started: bool,
}

impl AudioCaptureStream {
    pub fn new(backend: Box<dyn CaptureBackend>) -> Self {
        Self {
            backend,
            buffer: Arc::new(Mutex::new(Vec::new())),
            buffer_task: None,
            started: false,
        }
    }

    /// Opens the device and begins buffering chunks.
    pub async fn start(&mut self) -> Result<()> {
        let mut chunk_rx = self
            .backend
            .start()
            .await
            .context("failed to open the audio input device")?;

        let buffer = Arc::clone(&self.buffer);
        self.buffer_task = Some(tokio::spawn(async move {
            while let Some(chunk) = chunk_rx.recv().await {
                // Zero-size chunks are not buffered.
                if chunk.is_empty() {
                    continue;
                }
                buffer.lock().await.push(chunk);
            }
            debug!("capture buffer task finished");
        }));

        self.started = true;
        info!("audio capture started ({})", self.backend.name());
        Ok(())
    }

    /// Suspends chunk production. Chunks already buffered remain buffered.
    pub fn pause(&mut self) -> Result<()> {
        self.backend.pause()
    }

    pub fn resume(&mut self) -> Result<()> {
        self.backend.resume()
    }

    /// Stops the device and returns every buffered chunk in arrival order.
    ///
    /// When this returns the device has been released, even if zero chunks
    /// were captured. Calling `stop` on a stream that is not running
    /// returns an empty flush.
    pub async fn stop(&mut self) -> Result<Vec<AudioChunk>> {
        if !self.started {
            return Ok(Vec::new());
        }

        self.backend
            .stop()
            .await
            .context("failed to stop the capture backend")?;

        // The backend closed the chunk channel; once the buffer task joins,
        // every chunk the device ever produced is in the buffer.
        if let Some(task) = self.buffer_task.take() {
            if let Err(e) = task.await {
                error!("capture buffer task panicked: {}", e);
            }
        }

        self.started = false;
        let mut buffer = self.buffer.lock().await;
        let chunks = std::mem::take(&mut *buffer);
        info!("audio capture stopped, {} chunk(s) flushed", chunks.len());
        Ok(chunks)
    }

    pub fn is_capturing(&self) -> bool {
        self.started && self.backend.is_capturing()
    }
}
