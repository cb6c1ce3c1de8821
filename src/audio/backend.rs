use anyhow::Result;
use tokio::sync::mpsc;

/// One buffered run of PCM samples from the input device (16-bit,
/// interleaved).
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Milliseconds since capture started
    pub timestamp_ms: u64,
}

impl AudioChunk {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Capture parameters requested from the device.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub sample_rate: u32,
    /// 1 = mono, 2 = stereo
    pub channels: u16,
    /// Buffer size in milliseconds (affects latency)
    pub buffer_duration_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            buffer_duration_ms: 100,
        }
    }
}

/// Audio input device seam.
///
/// The microphone implementation lives in `mic.rs`; tests drive scripted
/// implementations.
#[async_trait::async_trait]
pub trait CaptureBackend: Send {
    /// Open the device and begin producing chunks.
    ///
    /// Returns the receiving end of the chunk channel. The channel closes
    /// once `stop` has flushed the last buffered chunk.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioChunk>>;

    /// Stop producing chunks without releasing the device.
    fn pause(&mut self) -> Result<()>;

    /// Resume producing chunks after `pause`.
    fn resume(&mut self) -> Result<()>;

    /// Release the device. After this returns the chunk channel is closed
    /// and no further chunks will be produced.
    async fn stop(&mut self) -> Result<()>;

    /// Check if the backend currently holds the device
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}
