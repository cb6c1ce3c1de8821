use anyhow::Result;

use crate::audio::{CaptureBackend, CaptureConfig, MicrophoneBackend};
use crate::recognition::RecognizerBackend;

/// Platform seam for acquiring the capture device and the optional
/// recognition capability together, as one recording session.
pub trait DeviceAccess: Send {
    /// Request exclusive access to the audio input device.
    fn acquire_capture(&self, config: &CaptureConfig) -> Result<Box<dyn CaptureBackend>>;

    /// A recognition engine, if the platform has one. `None` is not an
    /// error — the session proceeds audio-only.
    fn acquire_recognizer(&self) -> Option<Box<dyn RecognizerBackend>>;
}

/// Stock device access: the cpal microphone, no local recognition engine.
///
/// Embedders with a streaming recognizer plug it in through their own
/// `DeviceAccess`; the stock build relies on the remote transcription path
/// for text.
pub struct PlatformDevices;

impl DeviceAccess for PlatformDevices {
    fn acquire_capture(&self, config: &CaptureConfig) -> Result<Box<dyn CaptureBackend>> {
        Ok(Box::new(MicrophoneBackend::new(config.clone())))
    }

    fn acquire_recognizer(&self) -> Option<Box<dyn RecognizerBackend>> {
        None
    }
}
