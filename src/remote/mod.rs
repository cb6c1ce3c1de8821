//! Remote speech service boundary
//!
//! The two HTTP collaborators (speech-to-text, text-to-speech) and the
//! playback of fetched audio. Transport failures are recoverable here:
//! logged by the caller, never fatal to a session.

pub mod client;
pub mod playback;

pub use client::RemoteSpeechClient;
pub use playback::AudioPlayer;
