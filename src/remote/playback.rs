use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, Sink};
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use tracing::debug;

/// Plays decoded audio to completion on the default output device.
///
/// Rodio playback blocks, so each call runs on a blocking task. The output
/// stream lives only for the clip being played, keeping the output device
/// handle scoped.
pub struct AudioPlayer;

impl AudioPlayer {
    /// Plays an in-memory clip (e.g. fetched synthesis audio) to
    /// completion.
    pub async fn play_bytes(bytes: Vec<u8>) -> Result<()> {
        debug!("playing {} bytes of audio", bytes.len());
        tokio::task::spawn_blocking(move || Self::play_source(Cursor::new(bytes)))
            .await
            .context("playback task failed")??;
        Ok(())
    }

    /// Plays an audio file (e.g. the spooled artifact) to completion.
    pub async fn play_file(path: &Path) -> Result<()> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let file = std::fs::File::open(&path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Self::play_source(BufReader::new(file))
        })
        .await
        .context("playback task failed")??;
        Ok(())
    }

    fn play_source<R>(reader: R) -> Result<()>
    where
        R: Read + Seek + Send + Sync + 'static,
    {
        let (_stream, handle) =
            OutputStream::try_default().context("no audio output device available")?;
        let sink = Sink::try_new(&handle).context("failed to open an audio sink")?;
        let source = Decoder::new(reader).context("failed to decode audio")?;
        sink.append(source);
        sink.sleep_until_end();
        Ok(())
    }
}
