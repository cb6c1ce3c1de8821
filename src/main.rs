use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use voice_session::{
    AudioPlayer, Config, EspeakVoice, PlatformDevices, RemoteSpeechClient, SessionController,
    SessionState, UtteranceQueue,
};

#[derive(Parser)]
#[command(
    name = "voice-session",
    about = "Record speech, transcribe it, and speak text back"
)]
struct Cli {
    /// Path to the config file, without extension
    #[arg(long, default_value = "config/voice-session")]
    config: String,

    /// Remote speech service origin, overriding the config file
    #[arg(long)]
    origin: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record from the microphone until Enter, then transcribe remotely
    Record {
        /// Replay the captured audio after stopping
        #[arg(long)]
        playback: bool,
    },
    /// Speak text through the local synthesis voice
    Speak { text: String },
    /// Synthesize text with the remote voice service and play the result
    Synth { text: String },
    /// Check that the remote speech service is reachable
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut cfg = Config::load(&cli.config)?;
    if let Some(origin) = cli.origin {
        cfg.remote.origin = origin;
    }

    match cli.command {
        Command::Record { playback } => record(cfg, playback).await,
        Command::Speak { text } => speak(cfg, &text).await,
        Command::Synth { text } => synth(cfg, &text).await,
        Command::Health => health(cfg).await,
    }
}

async fn record(cfg: Config, playback: bool) -> Result<()> {
    let mut controller =
        SessionController::new(Box::new(PlatformDevices), cfg.capture.clone().into());

    controller.start().await?;
    if controller.state() == SessionState::Error {
        error!(
            "{}",
            controller
                .error_message()
                .unwrap_or("failed to start recording")
        );
        return Ok(());
    }

    info!("recording; press Enter to stop");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let _ = line;
                break;
            }
            _ = tokio::time::sleep(Duration::from_millis(500)) => {
                let (confirmed, partial) = controller.transcript().await;
                if !partial.is_empty() {
                    info!("listening: {}{}", confirmed, partial);
                }
            }
        }
    }

    controller.stop().await?;

    let (confirmed, _) = controller.transcript().await;
    if !confirmed.is_empty() {
        info!("live transcript: {}", confirmed);
    }

    let client = RemoteSpeechClient::new(&cfg.remote.origin, cfg.remote.request_timeout())?;
    if let Some(artifact) = controller.artifact() {
        info!(
            "submitting {} bytes of audio for transcription",
            artifact.bytes().len()
        );
        match client.transcribe(artifact).await {
            // A successful remote result supersedes the live transcript.
            Ok(text) => info!("transcript: {}", text),
            Err(e) => warn!("remote transcription failed, keeping live transcript: {:#}", e),
        }
    }

    if playback {
        if let Some(path) = controller.artifact().and_then(|a| a.handle.path()) {
            info!("replaying the captured audio");
            if let Err(e) = AudioPlayer::play_file(path).await {
                warn!("playback failed: {:#}", e);
            }
        }
    }

    controller.teardown().await;
    Ok(())
}

async fn speak(cfg: Config, text: &str) -> Result<()> {
    let voice = EspeakVoice::new(&cfg.speech.voice);
    let mut queue = UtteranceQueue::new(Box::new(voice));

    match queue.speak(text).await? {
        Some(_) => queue.wait_until_done().await,
        None => warn!("nothing to speak"),
    }
    Ok(())
}

async fn synth(cfg: Config, text: &str) -> Result<()> {
    let client = RemoteSpeechClient::new(&cfg.remote.origin, cfg.remote.request_timeout())?;
    match client.synthesize(text).await {
        Ok(audio) => {
            info!("received {} bytes of synthesized audio", audio.len());
            AudioPlayer::play_bytes(audio).await?;
        }
        Err(e) => warn!("remote synthesis failed: {:#}", e),
    }
    Ok(())
}

async fn health(cfg: Config) -> Result<()> {
    let client = RemoteSpeechClient::new(&cfg.remote.origin, cfg.remote.request_timeout())?;
    match client.health().await {
        Ok(()) => info!("remote speech service at {} is healthy", client.origin()),
        Err(e) => error!("remote speech service unreachable: {:#}", e),
    }
    Ok(())
}
