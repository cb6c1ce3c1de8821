use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use super::backend::AudioChunk;

pub const ARTIFACT_MIME: &str = "audio/wav";

const FALLBACK_SAMPLE_RATE: u32 = 16000;
const FALLBACK_CHANNELS: u16 = 1;

/// Scoped handle to the spooled artifact file.
///
/// Created together with the artifact, addressable while held, and deleted
/// exactly once: `release` takes the path out, so a second call (or the
/// `Drop` backstop) finds nothing left to remove.
#[derive(Debug)]
pub struct ArtifactHandle {
    path: Option<PathBuf>,
}

impl ArtifactHandle {
    fn spool(bytes: &[u8]) -> Result<Self> {
        let path = std::env::temp_dir().join(format!("voice-session-{}.wav", Uuid::new_v4()));
        std::fs::write(&path, bytes)
            .with_context(|| format!("failed to spool artifact to {}", path.display()))?;
        debug!("artifact spooled to {}", path.display());
        Ok(Self { path: Some(path) })
    }

    /// Local address of the spool file, until released.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_released(&self) -> bool {
        self.path.is_none()
    }

    /// Deletes the spool file. Only the first call touches the filesystem.
    pub fn release(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("failed to remove artifact spool {}: {}", path.display(), e);
            } else {
                debug!("artifact spool {} released", path.display());
            }
        }
    }
}

impl Drop for ArtifactHandle {
    fn drop(&mut self) {
        if self.path.is_some() {
            warn!("artifact handle dropped without explicit release");
            self.release();
        }
    }
}

/// The finalized recording: one WAV blob built from the session's chunks,
/// plus the spooled handle that makes it locally addressable.
#[derive(Debug)]
pub struct AudioArtifact {
    bytes: Vec<u8>,
    mime_type: &'static str,
    pub handle: ArtifactHandle,
}

impl AudioArtifact {
    /// Encodes the chunks, in order, into a single WAV blob and spools it.
    ///
    /// An empty chunk list still produces a valid (silent) artifact; the
    /// WAV spec falls back to 16 kHz mono when no chunk names one.
    pub fn from_chunks(chunks: &[AudioChunk]) -> Result<Self> {
        let (sample_rate, channels) = chunks
            .first()
            .map(|c| (c.sample_rate, c.channels))
            .unwrap_or((FALLBACK_SAMPLE_RATE, FALLBACK_CHANNELS));

        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer =
                WavWriter::new(&mut cursor, spec).context("failed to create WAV writer")?;
            for chunk in chunks {
                for &sample in &chunk.samples {
                    writer
                        .write_sample(sample)
                        .context("failed to write sample to WAV artifact")?;
                }
            }
            writer
                .finalize()
                .context("failed to finalize WAV artifact")?;
        }

        let bytes = cursor.into_inner();
        let handle = ArtifactHandle::spool(&bytes)?;

        Ok(Self {
            bytes,
            mime_type: ARTIFACT_MIME,
            handle,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        self.mime_type
    }

    /// Total PCM samples across all encoded chunks.
    pub fn sample_count(&self) -> usize {
        // 44-byte canonical header, 2 bytes per sample.
        self.bytes.len().saturating_sub(44) / 2
    }
}
