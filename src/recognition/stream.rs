use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::backend::RecognizerBackend;

/// One incremental recognition result.
#[derive(Debug, Clone)]
pub struct TranscriptFragment {
    pub text: String,
    pub is_final: bool,
    /// Monotonically non-decreasing within one recognition session.
    pub sequence_index: u64,
}

/// Live incremental recognition for one recording session.
///
/// Restartable: each `start` begins a fresh sequence-index space. Fragment
/// ordering is arrival order; how fragments merge into a transcript is the
/// assembler's business, not this stream's.
pub struct TranscriptionStream {
    backend: Box<dyn RecognizerBackend>,
    forward_task: Option<JoinHandle<()>>,
    active: bool,
}

impl TranscriptionStream {
    pub fn new(backend: Box<dyn RecognizerBackend>) -> Self {
        Self {
            backend,
            forward_task: None,
            active: false,
        }
    }

    /// Starts a fresh recognition session and returns its fragment stream.
    pub async fn start(&mut self) -> Result<mpsc::Receiver<TranscriptFragment>> {
        let mut raw_rx = self
            .backend
            .start()
            .await
            .context("failed to start the recognition session")?;

        let (tx, rx) = mpsc::channel::<TranscriptFragment>(64);
        self.forward_task = Some(tokio::spawn(async move {
            let mut next_index = 0u64;
            while let Some(raw) = raw_rx.recv().await {
                let fragment = TranscriptFragment {
                    text: raw.text,
                    is_final: raw.is_final,
                    sequence_index: next_index,
                };
                next_index += 1;
                if tx.send(fragment).await.is_err() {
                    // Consumer is gone; drain quietly until the engine stops.
                    break;
                }
            }
            debug!("recognition forward task finished");
        }));

        self.active = true;
        info!("recognition session started ({})", self.backend.name());
        Ok(rx)
    }

    /// Ends the recognition session.
    ///
    /// Idempotent: stopping a stream that was never started, or stopping
    /// twice, is a no-op rather than an error.
    pub async fn stop(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }

        if let Err(e) = self.backend.stop().await {
            warn!("recognition backend refused to stop cleanly: {}", e);
        }

        if let Some(task) = self.forward_task.take() {
            if let Err(e) = task.await {
                warn!("recognition forward task panicked: {}", e);
            }
        }

        self.active = false;
        info!("recognition session stopped");
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
