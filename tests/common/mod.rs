// Scripted device and voice implementations shared by the integration
// tests. Probes stay on the test side and observe what the controller or
// queue did with the backend they were handed.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex};

use voice_session::{
    AudioChunk, CaptureBackend, CaptureConfig, DeviceAccess, RecognizedText, RecognizerBackend,
    SpeechOutcome, SynthesisVoice,
};

/// Test-side handle to a scripted capture device.
#[derive(Clone, Default)]
pub struct CaptureProbe {
    sender: Arc<Mutex<Option<mpsc::Sender<AudioChunk>>>>,
    pub paused: Arc<AtomicBool>,
    pub releases: Arc<AtomicUsize>,
}

impl CaptureProbe {
    pub fn chunk(samples: Vec<i16>) -> AudioChunk {
        AudioChunk {
            samples,
            sample_rate: 16000,
            channels: 1,
            timestamp_ms: 0,
        }
    }

    /// Emits a chunk the way the device would: nothing while paused,
    /// nothing once the device is released.
    pub async fn emit(&self, samples: Vec<i16>) -> bool {
        if self.paused.load(Ordering::SeqCst) {
            return false;
        }
        let guard = self.sender.lock().await;
        match guard.as_ref() {
            Some(tx) => tx.send(Self::chunk(samples)).await.is_ok(),
            None => false,
        }
    }

    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

pub struct ScriptedCapture {
    probe: CaptureProbe,
    capturing: bool,
}

impl ScriptedCapture {
    pub fn new(probe: CaptureProbe) -> Self {
        Self {
            probe,
            capturing: false,
        }
    }
}

#[async_trait]
impl CaptureBackend for ScriptedCapture {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioChunk>> {
        let (tx, rx) = mpsc::channel(64);
        *self.probe.sender.lock().await = Some(tx);
        self.probe.paused.store(false, Ordering::SeqCst);
        self.capturing = true;
        Ok(rx)
    }

    fn pause(&mut self) -> Result<()> {
        self.probe.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.probe.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        if self.capturing {
            // Dropping the sender closes the chunk channel.
            self.probe.sender.lock().await.take();
            self.probe.releases.fetch_add(1, Ordering::SeqCst);
            self.capturing = false;
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "scripted-capture"
    }
}

/// Test-side handle to a scripted recognition engine.
#[derive(Clone, Default)]
pub struct RecognizerProbe {
    sender: Arc<Mutex<Option<mpsc::Sender<RecognizedText>>>>,
    pub stops: Arc<AtomicUsize>,
}

impl RecognizerProbe {
    pub async fn emit(&self, text: &str, is_final: bool) -> bool {
        let guard = self.sender.lock().await;
        match guard.as_ref() {
            Some(tx) => tx
                .send(RecognizedText {
                    text: text.to_string(),
                    is_final,
                })
                .await
                .is_ok(),
            None => false,
        }
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

pub struct ScriptedRecognizer {
    probe: RecognizerProbe,
    active: bool,
}

impl ScriptedRecognizer {
    pub fn new(probe: RecognizerProbe) -> Self {
        Self {
            probe,
            active: false,
        }
    }
}

#[async_trait]
impl RecognizerBackend for ScriptedRecognizer {
    async fn start(&mut self) -> Result<mpsc::Receiver<RecognizedText>> {
        let (tx, rx) = mpsc::channel(64);
        *self.probe.sender.lock().await = Some(tx);
        self.active = true;
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if self.active {
            self.probe.sender.lock().await.take();
            self.probe.stops.fetch_add(1, Ordering::SeqCst);
            self.active = false;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted-recognizer"
    }
}

/// Scripted device access for controller tests.
pub struct ScriptedDevices {
    pub capture: CaptureProbe,
    pub recognizer: Option<RecognizerProbe>,
    pub deny_capture: bool,
}

impl ScriptedDevices {
    /// Capture plus recognition.
    pub fn new() -> Self {
        Self {
            capture: CaptureProbe::default(),
            recognizer: Some(RecognizerProbe::default()),
            deny_capture: false,
        }
    }

    /// Capture only; the platform offers no recognition capability.
    pub fn audio_only() -> Self {
        Self {
            capture: CaptureProbe::default(),
            recognizer: None,
            deny_capture: false,
        }
    }

    /// The user denied microphone access.
    pub fn denied() -> Self {
        Self {
            capture: CaptureProbe::default(),
            recognizer: None,
            deny_capture: true,
        }
    }
}

impl DeviceAccess for ScriptedDevices {
    fn acquire_capture(&self, _config: &CaptureConfig) -> Result<Box<dyn CaptureBackend>> {
        if self.deny_capture {
            return Err(anyhow!("microphone permission denied"));
        }
        Ok(Box::new(ScriptedCapture::new(self.capture.clone())))
    }

    fn acquire_recognizer(&self) -> Option<Box<dyn RecognizerBackend>> {
        self.recognizer
            .clone()
            .map(|probe| Box::new(ScriptedRecognizer::new(probe)) as Box<dyn RecognizerBackend>)
    }
}

/// Test-side handle to a scripted synthesis voice.
#[derive(Clone, Default)]
pub struct VoiceProbe {
    pub spoken: Arc<std::sync::Mutex<Vec<String>>>,
    pub cancels: Arc<AtomicUsize>,
    finish: Arc<std::sync::Mutex<Option<oneshot::Sender<SpeechOutcome>>>>,
}

impl VoiceProbe {
    /// Resolves the in-flight utterance the way the engine would.
    pub fn finish_current(&self, outcome: SpeechOutcome) -> bool {
        match self.finish.lock().unwrap().take() {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

pub struct ScriptedVoice {
    probe: VoiceProbe,
}

impl ScriptedVoice {
    pub fn new(probe: VoiceProbe) -> Self {
        Self { probe }
    }
}

impl SynthesisVoice for ScriptedVoice {
    fn speak(&mut self, text: &str) -> Result<oneshot::Receiver<SpeechOutcome>> {
        self.probe.spoken.lock().unwrap().push(text.to_string());
        let (tx, rx) = oneshot::channel();
        *self.probe.finish.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    fn cancel(&mut self) {
        self.probe.cancels.fetch_add(1, Ordering::SeqCst);
        // Dropping the sender mirrors an interrupted engine: the completion
        // signal never resolves.
        self.probe.finish.lock().unwrap().take();
    }
}

/// Polls `condition` until it holds or a second has passed.
pub async fn eventually<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..100 {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
