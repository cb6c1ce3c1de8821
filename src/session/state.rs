use chrono::{DateTime, Utc};

use crate::audio::AudioChunk;

/// Lifecycle of one recording attempt.
///
/// `Idle → Recording → {Paused ⇄ Recording} → Finalizing → Stopped → Idle`
/// (on retry); device-acquisition failure moves any state to `Error`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Recording,
    Paused,
    Finalizing,
    Stopped,
    Error,
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Recording => "recording",
            SessionState::Paused => "paused",
            SessionState::Finalizing => "finalizing",
            SessionState::Stopped => "stopped",
            SessionState::Error => "error",
        }
    }
}

/// Aggregate for one recording attempt, owned exclusively by the
/// controller. At most one exists at a time.
#[derive(Debug, Default)]
pub struct RecordingSession {
    pub state: SessionState,

    /// Set on the transition into `Recording`.
    pub started_at: Option<DateTime<Utc>>,

    /// Ordered, append-only. Filled only during finalization: while the
    /// device is live, chunks stay buffered inside the capture stream.
    pub audio_chunks: Vec<AudioChunk>,

    /// Whether a recognition capability was available at acquisition time.
    pub recognition_enabled: bool,

    /// User-facing message, set only in `Error`.
    pub error_message: Option<String>,
}

impl RecordingSession {
    /// Clears every field back to a fresh idle session.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
