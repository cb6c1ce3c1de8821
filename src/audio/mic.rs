use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::backend::{AudioChunk, CaptureBackend, CaptureConfig};

/// Microphone capture backed by cpal.
///
/// The device is opened in `start` and released when `stop` drops the
/// stream. While paused the callback produces nothing, but the stream (and
/// the device with it) stays open so `resume` is instant.
pub struct MicrophoneBackend {
    config: CaptureConfig,
    stream: Option<cpal::Stream>,
    paused: Arc<AtomicBool>,
}

// SAFETY: cpal streams are not Send, but the backend is only ever driven
// from the single task that owns the session controller; it is never
// shared across threads concurrently.
unsafe impl Send for MicrophoneBackend {}

impl MicrophoneBackend {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            stream: None,
            paused: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for MicrophoneBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioChunk>> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow!("no default input device found"))?;
        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

        let supported = device
            .default_input_config()
            .context("failed to query input device configuration")?;

        let stream_config = cpal::StreamConfig {
            channels: self.config.channels,
            sample_rate: cpal::SampleRate(self.config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        info!(
            "opening input device '{}': {} Hz, {} channel(s), {:?}",
            device_name,
            self.config.sample_rate,
            self.config.channels,
            supported.sample_format()
        );

        let (tx, rx) = mpsc::channel::<AudioChunk>(64);
        let paused = Arc::clone(&self.paused);
        paused.store(false, Ordering::SeqCst);
        let sample_rate = self.config.sample_rate;
        let channels = self.config.channels;
        let started = Instant::now();

        let send_chunk = move |samples: Vec<i16>| {
            let chunk = AudioChunk {
                samples,
                sample_rate,
                channels,
                timestamp_ms: started.elapsed().as_millis() as u64,
            };
            if let Err(mpsc::error::TrySendError::Full(_)) = tx.try_send(chunk) {
                warn!("audio channel full, dropping captured chunk");
            }
        };

        let on_error = |err: cpal::StreamError| {
            warn!("input stream error: {}", err);
        };

        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => {
                let paused = Arc::clone(&paused);
                device.build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        if paused.load(Ordering::Relaxed) {
                            return;
                        }
                        let samples: Vec<i16> = data
                            .iter()
                            .map(|&s| (s * 32767.0).clamp(-32768.0, 32767.0) as i16)
                            .collect();
                        send_chunk(samples);
                    },
                    on_error,
                    None,
                )?
            }
            cpal::SampleFormat::I16 => {
                let paused = Arc::clone(&paused);
                device.build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        if paused.load(Ordering::Relaxed) {
                            return;
                        }
                        send_chunk(data.to_vec());
                    },
                    on_error,
                    None,
                )?
            }
            cpal::SampleFormat::U16 => {
                let paused = Arc::clone(&paused);
                device.build_input_stream(
                    &stream_config,
                    move |data: &[u16], _: &cpal::InputCallbackInfo| {
                        if paused.load(Ordering::Relaxed) {
                            return;
                        }
                        let samples: Vec<i16> =
                            data.iter().map(|&s| (s as i32 - 32768) as i16).collect();
                        send_chunk(samples);
                    },
                    on_error,
                    None,
                )?
            }
            other => {
                return Err(anyhow!("unsupported input sample format: {:?}", other));
            }
        };

        stream
            .play()
            .context("failed to start the input stream")?;
        self.stream = Some(stream);

        Ok(rx)
    }

    fn pause(&mut self) -> Result<()> {
        self.paused.store(true, Ordering::SeqCst);
        if let Some(stream) = &self.stream {
            // Not every host supports pausing; the callback gate above
            // guarantees silence either way.
            if let Err(e) = stream.pause() {
                warn!("input stream pause unsupported, gating in callback: {}", e);
            }
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.paused.store(false, Ordering::SeqCst);
        if let Some(stream) = &self.stream {
            stream
                .play()
                .context("failed to resume the input stream")?;
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        // Dropping the stream releases the device and drops the sender,
        // which closes the chunk channel.
        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("input device released");
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.stream.is_some()
    }

    fn name(&self) -> &str {
        "cpal-microphone"
    }
}
