//! Game and relay settings
//!
//! Loaded from an optional JSON file; every field falls back to its default.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::TickTiming;

/// Where the relay listens and where clients find it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaySettings {
    /// Bind host for `pong-relay`
    pub host: String,
    /// Bind port for `pong-relay`
    pub port: u16,
    /// WebSocket URL the game client connects to
    pub url: String,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            host: RELAY_HOST.to_string(),
            port: RELAY_PORT,
            url: RELAY_URL.to_string(),
        }
    }
}

/// Settings shared by both binaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub relay: RelaySettings,

    // === Single player ===
    /// Directory holding progress records
    pub saves_dir: PathBuf,
    /// Tick pacing
    pub timing: TickTiming,
    /// Lives per session
    pub lives: u8,
    /// How long the game-over banner stays up (ms)
    pub game_over_pause_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            relay: RelaySettings::default(),
            saves_dir: PathBuf::from(SAVES_DIR),
            timing: TickTiming::default(),
            lives: START_LIVES,
            game_over_pause_ms: GAME_OVER_PAUSE_MS,
        }
    }
}

impl Settings {
    /// Load settings from `path`
    ///
    /// A missing file gives defaults quietly; an unreadable or invalid one
    /// gives defaults with a warning.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring invalid settings file {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Cannot read settings file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Relay bind address for `TcpListener::bind`
    pub fn bind_addr(&self) -> (String, u16) {
        (self.relay.host.clone(), self.relay.port)
    }
}
