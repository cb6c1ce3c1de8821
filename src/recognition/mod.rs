//! Live incremental speech recognition
//!
//! This module provides the recognition half of a recording session:
//! - `RecognizerBackend` — the engine seam (absence means audio-only)
//! - `TranscriptionStream` — restartable session emitting ordered fragments
//! - `TranscriptAssembler` — pure reducer producing (confirmed, partial)

pub mod assembler;
pub mod backend;
pub mod stream;

pub use assembler::TranscriptAssembler;
pub use backend::{RecognizedText, RecognizerBackend};
pub use stream::{TranscriptFragment, TranscriptionStream};
