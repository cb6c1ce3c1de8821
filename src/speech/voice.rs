use anyhow::{Context, Result};
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// How a spoken utterance ended, as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechOutcome {
    Finished,
    /// The engine failed mid-utterance. Treated like completion downstream.
    EngineError,
}

/// Local synthesis engine seam.
pub trait SynthesisVoice: Send {
    /// Begin speaking. The receiver resolves once the engine finishes or
    /// fails; it is dropped without resolving when `cancel` interrupts the
    /// utterance.
    fn speak(&mut self, text: &str) -> Result<oneshot::Receiver<SpeechOutcome>>;

    /// Interrupt the current utterance, if any.
    fn cancel(&mut self);
}

/// Synthesis through the system `espeak-ng` command.
///
/// Requires espeak-ng to be installed:
/// - macOS: `brew install espeak-ng`
/// - Linux: `apt-get install espeak-ng`
pub struct EspeakVoice {
    voice: String,
    cancel_tx: Option<oneshot::Sender<()>>,
}

impl EspeakVoice {
    /// `voice` is an espeak-ng voice code, e.g. "en-us" or "en-gb".
    pub fn new(voice: &str) -> Self {
        Self {
            voice: voice.to_string(),
            cancel_tx: None,
        }
    }
}

impl SynthesisVoice for EspeakVoice {
    fn speak(&mut self, text: &str) -> Result<oneshot::Receiver<SpeechOutcome>> {
        // One engine process at a time.
        self.cancel();

        let mut child = Command::new("espeak-ng")
            .args(["-v", &self.voice])
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context(
                "failed to run espeak-ng. Is it installed? \
                 Install with: brew install espeak-ng (macOS) or apt-get install espeak-ng (Linux)",
            )?;

        let (done_tx, done_rx) = oneshot::channel();
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        self.cancel_tx = Some(cancel_tx);

        tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => {
                    let outcome = match status {
                        Ok(status) if status.success() => SpeechOutcome::Finished,
                        Ok(status) => {
                            warn!("espeak-ng exited with {}", status);
                            SpeechOutcome::EngineError
                        }
                        Err(e) => {
                            warn!("failed to wait for espeak-ng: {}", e);
                            SpeechOutcome::EngineError
                        }
                    };
                    let _ = done_tx.send(outcome);
                }
                _ = cancel_rx => {
                    if let Err(e) = child.start_kill() {
                        warn!("failed to kill espeak-ng: {}", e);
                    }
                    let _ = child.wait().await;
                    debug!("espeak-ng interrupted");
                    // done_tx drops unresolved: cancellation is not completion.
                }
            }
        });

        Ok(done_rx)
    }

    fn cancel(&mut self) {
        if let Some(cancel_tx) = self.cancel_tx.take() {
            let _ = cancel_tx.send(());
        }
    }
}
