use anyhow::Result;
use tokio::sync::mpsc;

/// A piece of recognized text as produced by an engine, before the stream
/// stamps its sequence index.
#[derive(Debug, Clone)]
pub struct RecognizedText {
    pub text: String,
    /// Interim results are replaced by later ones; final results are kept.
    pub is_final: bool,
}

/// Live recognition engine seam.
///
/// A platform without an engine simply offers no backend; the session then
/// runs audio-only. Mirrors the capture seam in `audio::backend`.
#[async_trait::async_trait]
pub trait RecognizerBackend: Send {
    /// Begin a fresh continuous, interim-enabled recognition session.
    async fn start(&mut self) -> Result<mpsc::Receiver<RecognizedText>>;

    /// End the session. Calling this when not started is a no-op.
    async fn stop(&mut self) -> Result<()>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}
