use anyhow::{bail, Context, Result};
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::audio::AudioArtifact;

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct SynthesisResponse {
    url: String,
}

/// RAII guard around the shared processing flag: engaged for a remote
/// call's duration, cleared on every exit path including unwinds.
struct ProcessingGuard {
    flag: Arc<AtomicBool>,
}

impl ProcessingGuard {
    fn engage(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self {
            flag: Arc::clone(flag),
        }
    }
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Client for the remote speech service.
///
/// Both calls are recoverable at this boundary: a transport failure or a
/// non-2xx status comes back as an error for the caller to log, with the
/// processing flag cleared and no state left behind.
pub struct RemoteSpeechClient {
    http: reqwest::Client,
    origin: String,
    processing: Arc<AtomicBool>,
}

impl RemoteSpeechClient {
    pub fn new(origin: &str, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(request_timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            origin: origin.trim_end_matches('/').to_string(),
            processing: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Whether a remote call is currently in flight. Shared by both the
    /// transcription and the synthesis path.
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Submits the finalized artifact for authoritative transcription.
    pub async fn transcribe(&self, artifact: &AudioArtifact) -> Result<String> {
        let _busy = ProcessingGuard::engage(&self.processing);

        let part = Part::bytes(artifact.bytes().to_vec())
            .file_name("recording.wav")
            .mime_str(artifact.mime_type())
            .context("failed to build the audio form part")?;
        let form = Form::new().part("audio", part);

        let url = format!("{}/api/speech-to-text", self.origin);
        debug!("submitting {} bytes to {}", artifact.bytes().len(), url);

        let response = self
            .http
            .post(&url)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .context("speech-to-text request failed")?;

        if !response.status().is_success() {
            bail!("speech-to-text request returned {}", response.status());
        }

        let body: TranscriptionResponse = response
            .json()
            .await
            .context("invalid speech-to-text response body")?;
        Ok(body.text)
    }

    /// Requests synthesis of `text` and fetches the resulting audio in
    /// full. The audio resource is requested exactly once per call.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let _busy = ProcessingGuard::engage(&self.processing);

        let url = format!("{}/api/text-to-speech", self.origin);
        let response = self
            .http
            .post(&url)
            .json(&SynthesisRequest { text })
            .send()
            .await
            .context("text-to-speech request failed")?;

        if !response.status().is_success() {
            bail!("text-to-speech request returned {}", response.status());
        }

        let body: SynthesisResponse = response
            .json()
            .await
            .context("invalid text-to-speech response body")?;

        let audio_url = self.resolve(&body.url);
        debug!("fetching synthesized audio from {}", audio_url);

        let audio = self
            .http
            .get(&audio_url)
            .send()
            .await
            .context("failed to fetch the synthesized audio")?;

        if !audio.status().is_success() {
            bail!("synthesized audio fetch returned {}", audio.status());
        }

        let bytes = audio
            .bytes()
            .await
            .context("failed to read the synthesized audio body")?;
        Ok(bytes.to_vec())
    }

    /// Pings the service health endpoint.
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/api/health", self.origin);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("health check request failed")?;
        if !response.status().is_success() {
            bail!("health check returned {}", response.status());
        }
        Ok(())
    }

    /// Resolves a server-relative path against the configured origin.
    fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.origin, path.trim_start_matches('/'))
    }
}
