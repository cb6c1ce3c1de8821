pub mod audio;
pub mod config;
pub mod recognition;
pub mod remote;
pub mod session;
pub mod speech;

pub use audio::{
    ArtifactHandle, AudioArtifact, AudioCaptureStream, AudioChunk, CaptureBackend, CaptureConfig,
    MicrophoneBackend, ARTIFACT_MIME,
};
pub use config::Config;
pub use recognition::{
    RecognizedText, RecognizerBackend, TranscriptAssembler, TranscriptFragment,
    TranscriptionStream,
};
pub use remote::{AudioPlayer, RemoteSpeechClient};
pub use session::{DeviceAccess, PlatformDevices, RecordingSession, SessionController, SessionState};
pub use speech::{EspeakVoice, SpeechOutcome, SynthesisVoice, Utterance, UtteranceQueue, UtteranceStatus};
