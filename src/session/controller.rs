use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::devices::DeviceAccess;
use super::state::{RecordingSession, SessionState};
use crate::audio::{AudioArtifact, AudioCaptureStream, CaptureConfig};
use crate::recognition::{TranscriptAssembler, TranscriptionStream};

/// The top-level state machine for voice sessions.
///
/// Owns the capture stream and the recognition stream as a single
/// recording session, merges their events into one transcript, and is the
/// single place where the device, the recognition session and the artifact
/// spool file get released — on stop, retry, teardown and error alike.
pub struct SessionController {
    devices: Box<dyn DeviceAccess>,
    capture_config: CaptureConfig,
    session: RecordingSession,
    capture: Option<AudioCaptureStream>,
    recognition: Option<TranscriptionStream>,
    assembler: Arc<Mutex<TranscriptAssembler>>,
    fragment_task: Option<JoinHandle<()>>,
    artifact: Option<AudioArtifact>,
}

impl SessionController {
    pub fn new(devices: Box<dyn DeviceAccess>, capture_config: CaptureConfig) -> Self {
        Self {
            devices,
            capture_config,
            session: RecordingSession::default(),
            capture: None,
            recognition: None,
            assembler: Arc::new(Mutex::new(TranscriptAssembler::new())),
            fragment_task: None,
            artifact: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn error_message(&self) -> Option<&str> {
        self.session.error_message.as_deref()
    }

    pub fn recognition_enabled(&self) -> bool {
        self.session.recognition_enabled
    }

    pub fn started_at(&self) -> Option<chrono::DateTime<Utc>> {
        self.session.started_at
    }

    /// The finalized artifact, present from `Stopped` until retry/teardown.
    pub fn artifact(&self) -> Option<&AudioArtifact> {
        self.artifact.as_ref()
    }

    /// Current `(confirmed, partial)` transcript view.
    pub async fn transcript(&self) -> (String, String) {
        self.assembler.lock().await.snapshot()
    }

    /// Starts a new recording session.
    ///
    /// Valid from `Idle` or `Stopped`; starting from `Stopped` performs the
    /// retry cleanup first. Device denial is not a Rust error: it moves the
    /// session to `Error` with a user-facing message and holds nothing.
    pub async fn start(&mut self) -> Result<()> {
        match self.session.state {
            SessionState::Idle => {}
            SessionState::Stopped => {
                self.retry().await?;
            }
            other => bail!(
                "start() is only valid from idle or stopped, not {}",
                other.label()
            ),
        }

        self.session.reset();
        self.assembler.lock().await.reset();

        let backend = match self.devices.acquire_capture(&self.capture_config) {
            Ok(backend) => backend,
            Err(e) => {
                self.enter_error(format!(
                    "Could not access the input device. Please check that a microphone \
                     is connected and permitted: {}",
                    e
                ));
                return Ok(());
            }
        };

        let mut capture = AudioCaptureStream::new(backend);
        if let Err(e) = capture.start().await {
            // `capture` drops here; no partial resources are held.
            self.enter_error(format!(
                "Could not access the input device. Please check that a microphone \
                 is connected and permitted: {}",
                e
            ));
            return Ok(());
        }

        // Recognition is best-effort: a platform without an engine, or an
        // engine that fails to start, downgrades the session to audio-only.
        match self.devices.acquire_recognizer() {
            Some(recognizer) => {
                let mut stream = TranscriptionStream::new(recognizer);
                match stream.start().await {
                    Ok(mut fragment_rx) => {
                        let assembler = Arc::clone(&self.assembler);
                        self.fragment_task = Some(tokio::spawn(async move {
                            while let Some(fragment) = fragment_rx.recv().await {
                                assembler.lock().await.apply(&fragment);
                            }
                        }));
                        self.recognition = Some(stream);
                        self.session.recognition_enabled = true;
                    }
                    Err(e) => {
                        warn!("live recognition unavailable, continuing audio-only: {}", e);
                    }
                }
            }
            None => {
                info!("no recognition capability, session is audio-only");
            }
        }

        self.capture = Some(capture);
        self.session.state = SessionState::Recording;
        self.session.started_at = Some(Utc::now());
        info!(
            "recording session started (recognition: {})",
            self.session.recognition_enabled
        );
        Ok(())
    }

    /// Suspends audio capture. The recognition stream, if present, keeps
    /// listening: speech recognition has no pause primitive, and that
    /// asymmetry is part of the contract.
    pub fn pause(&mut self) -> Result<()> {
        if self.session.state != SessionState::Recording {
            bail!(
                "pause() is only valid while recording, not {}",
                self.session.state.label()
            );
        }
        self.capture
            .as_mut()
            .ok_or_else(|| anyhow!("no active capture stream"))?
            .pause()
            .context("failed to pause audio capture")?;
        self.session.state = SessionState::Paused;
        info!("recording paused");
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.session.state != SessionState::Paused {
            bail!(
                "resume() is only valid while paused, not {}",
                self.session.state.label()
            );
        }
        self.capture
            .as_mut()
            .ok_or_else(|| anyhow!("no active capture stream"))?
            .resume()
            .context("failed to resume audio capture")?;
        self.session.state = SessionState::Recording;
        info!("recording resumed");
        Ok(())
    }

    /// Finalizes the session: flushes and releases the capture device,
    /// stops recognition, builds the artifact, and lands in `Stopped`.
    ///
    /// This is the single point where device resources are released, and it
    /// completes before any consumer sees the artifact. Calling `stop` on
    /// an already-stopped session returns the existing artifact; the device
    /// is never released twice.
    pub async fn stop(&mut self) -> Result<&AudioArtifact> {
        match self.session.state {
            SessionState::Recording | SessionState::Paused => {}
            SessionState::Stopped => {
                return self
                    .artifact
                    .as_ref()
                    .ok_or_else(|| anyhow!("stopped session has no artifact"));
            }
            other => bail!(
                "stop() is only valid while recording or paused, not {}",
                other.label()
            ),
        }

        self.session.state = SessionState::Finalizing;

        let chunks = match self.capture.as_mut() {
            Some(capture) => match capture.stop().await {
                Ok(chunks) => chunks,
                Err(e) => {
                    // Even a failed flush must not strand the session:
                    // drop the stream, end recognition, land in Error.
                    self.capture = None;
                    self.stop_recognition().await;
                    self.enter_error(format!("Failed to stop the recording cleanly: {}", e));
                    return Err(e.context("failed to stop audio capture"));
                }
            },
            None => Vec::new(),
        };
        self.capture = None;

        self.stop_recognition().await;

        self.session.audio_chunks = chunks;
        let artifact = match AudioArtifact::from_chunks(&self.session.audio_chunks) {
            Ok(artifact) => artifact,
            Err(e) => {
                self.enter_error(format!("Failed to finalize the recording: {}", e));
                return Err(e);
            }
        };

        info!(
            "recording finalized: {} chunk(s), {} bytes",
            self.session.audio_chunks.len(),
            artifact.bytes().len()
        );
        self.session.state = SessionState::Stopped;
        Ok(&*self.artifact.insert(artifact))
    }

    /// Discards the finished (or failed) attempt and returns to `Idle`:
    /// releases the artifact handle and clears session fields and
    /// transcript.
    pub async fn retry(&mut self) -> Result<()> {
        match self.session.state {
            SessionState::Stopped | SessionState::Error => {}
            other => bail!(
                "retry() is only valid from stopped or error, not {}",
                other.label()
            ),
        }

        if let Some(mut artifact) = self.artifact.take() {
            artifact.handle.release();
        }
        self.session.reset();
        self.assembler.lock().await.reset();
        info!("session reset to idle");
        Ok(())
    }

    /// Unconditional cleanup, valid from any state: releases the device if
    /// still held, stops a still-listening recognition stream, and releases
    /// the artifact handle.
    pub async fn teardown(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            if let Err(e) = capture.stop().await {
                error!("failed to stop capture during teardown: {}", e);
            }
        }
        self.stop_recognition().await;
        if let Some(mut artifact) = self.artifact.take() {
            artifact.handle.release();
        }
        self.session.reset();
        self.assembler.lock().await.reset();
    }

    fn enter_error(&mut self, message: String) {
        error!("{}", message);
        self.session.state = SessionState::Error;
        self.session.error_message = Some(message);
    }

    async fn stop_recognition(&mut self) {
        if let Some(mut stream) = self.recognition.take() {
            if let Err(e) = stream.stop().await {
                warn!("failed to stop recognition stream: {}", e);
            }
        }
        // Joining the fragment task guarantees every fragment that arrived
        // before the stream closed has reached the assembler.
        if let Some(task) = self.fragment_task.take() {
            if let Err(e) = task.await {
                error!("fragment task panicked: {}", e);
            }
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        // `teardown` is the real cleanup path; this backstop still makes
        // sure the spool file goes away and background tasks stop.
        if let Some(task) = self.fragment_task.take() {
            task.abort();
        }
        if let Some(artifact) = self.artifact.as_mut() {
            artifact.handle.release();
        }
    }
}
