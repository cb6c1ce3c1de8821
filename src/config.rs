use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

use crate::audio::CaptureConfig;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub remote: RemoteConfig,
    pub capture: CaptureSettings,
    pub speech: SpeechSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
}

/// Where the remote speech service lives. The origin is the only external
/// configuration point; it is never hardcoded in the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub origin: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub sample_rate: u32,
    pub channels: u16,
    pub buffer_duration_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// Voice identifier passed to the local synthesis engine (espeak-ng).
    pub voice: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "voice-session".to_string(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:5000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            buffer_duration_ms: 100,
        }
    }
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            voice: "en-us".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            remote: RemoteConfig::default(),
            capture: CaptureSettings::default(),
            speech: SpeechSettings::default(),
        }
    }
}

impl Config {
    /// Loads configuration from `<path>.toml` (or any format the config
    /// crate recognizes). A missing file yields the defaults.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl RemoteConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl From<CaptureSettings> for CaptureConfig {
    fn from(settings: CaptureSettings) -> Self {
        Self {
            sample_rate: settings.sample_rate,
            channels: settings.channels,
            buffer_duration_ms: settings.buffer_duration_ms,
        }
    }
}
