//! Recording session management
//!
//! This module provides the `SessionController` state machine that owns:
//! - Audio capture (buffered chunks, pause/resume, flush on stop)
//! - Live incremental recognition feeding the transcript assembler
//! - The finalized audio artifact and its spooled resource handle
//! - Deterministic teardown on every exit path

mod controller;
mod devices;
mod state;

pub use controller::SessionController;
pub use devices::{DeviceAccess, PlatformDevices};
pub use state::{RecordingSession, SessionState};
