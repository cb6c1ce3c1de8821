use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use super::voice::SynthesisVoice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtteranceStatus {
    Queued,
    Speaking,
    Cancelled,
    Completed,
}

/// One text-to-speech playback request and its lifecycle.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub id: Uuid,
    pub text: String,
    pub status: UtteranceStatus,
}

/// Replace-not-queue playback of utterances through a local synthesis
/// voice, independent of the recording subsystems.
///
/// At most one utterance is ever `Speaking`: submitting a new one while
/// another is in flight cancels the prior one first.
pub struct UtteranceQueue {
    voice: Box<dyn SynthesisVoice>,
    current: Option<Arc<Mutex<Utterance>>>,
    watcher: Option<JoinHandle<()>>,
    /// Draft text mirroring the input field this queue serves.
    draft: String,
}

impl UtteranceQueue {
    pub fn new(voice: Box<dyn SynthesisVoice>) -> Self {
        Self {
            voice,
            current: None,
            watcher: None,
            draft: String::new(),
        }
    }

    pub fn set_draft(&mut self, text: &str) {
        self.draft = text.to_string();
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Speaks `text`, cancelling any utterance still in flight first.
    ///
    /// Blank or whitespace-only input never creates an utterance; the call
    /// returns `Ok(None)`.
    pub async fn speak(&mut self, text: &str) -> Result<Option<Uuid>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        self.cancel_current().await;

        let mut utterance = Utterance {
            id: Uuid::new_v4(),
            text: text.to_string(),
            status: UtteranceStatus::Queued,
        };
        let done_rx = self.voice.speak(text)?;
        utterance.status = UtteranceStatus::Speaking;
        let id = utterance.id;
        info!("speaking utterance {}", id);

        let shared = Arc::new(Mutex::new(utterance));

        // Resolve Completed on engine completion or engine error; a
        // cancelled utterance is never overwritten.
        let watched = Arc::clone(&shared);
        self.watcher = Some(tokio::spawn(async move {
            if done_rx.await.is_ok() {
                let mut utterance = watched.lock().await;
                if utterance.status == UtteranceStatus::Speaking {
                    utterance.status = UtteranceStatus::Completed;
                    debug!("utterance {} completed", utterance.id);
                }
            }
            // A dropped sender means the voice was cancelled mid-utterance;
            // the status was already set.
        }));

        self.current = Some(shared);
        Ok(Some(id))
    }

    /// Speaks the draft text, if any.
    pub async fn speak_draft(&mut self) -> Result<Option<Uuid>> {
        let text = self.draft.clone();
        self.speak(&text).await
    }

    /// Cancels the current utterance if one is speaking; no-op otherwise.
    pub async fn stop(&mut self) {
        self.cancel_current().await;
    }

    /// `stop()` plus discarding the draft text.
    pub async fn clear(&mut self) {
        self.draft.clear();
        self.cancel_current().await;
    }

    /// Status of the most recent utterance, if any.
    pub async fn current_status(&self) -> Option<(Uuid, UtteranceStatus)> {
        match &self.current {
            Some(current) => {
                let utterance = current.lock().await;
                Some((utterance.id, utterance.status))
            }
            None => None,
        }
    }

    pub async fn is_speaking(&self) -> bool {
        matches!(
            self.current_status().await,
            Some((_, UtteranceStatus::Speaking))
        )
    }

    /// Waits until the current utterance has left the `Speaking` state.
    pub async fn wait_until_done(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            let _ = watcher.await;
        }
    }

    async fn cancel_current(&mut self) {
        if let Some(current) = &self.current {
            let mut utterance = current.lock().await;
            if utterance.status == UtteranceStatus::Speaking {
                self.voice.cancel();
                utterance.status = UtteranceStatus::Cancelled;
                info!("utterance {} cancelled", utterance.id);
            }
        }
        if let Some(watcher) = self.watcher.take() {
            let _ = watcher.await;
        }
    }
}
