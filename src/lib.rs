//! Term Pong - ping pong in the terminal
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball, paddle, scoring, lives)
//! - `session`: Tick loop, progression and persistence triggers
//! - `persistence`: Per-user progress records
//! - `platform`: Terminal input/painting and menus
//! - `net`: Invite relay and client

pub mod net;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;

pub use persistence::{JsonProfileStore, MemoryProfileStore, PlayerProfile, ProfileStore};
pub use session::{Command, Frontend, GameSession, Outcome, SessionPhase, SessionSummary};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Lives at the start of a session
    pub const START_LIVES: u8 = 3;

    /// Rows above and below the paddle center that still return the ball
    pub const PADDLE_HALF_HEIGHT: i32 = 2;
    /// Paddle center may not move above this row
    pub const PADDLE_TOP_MARGIN: i32 = 3;
    /// Paddle center may not move below `height - PADDLE_BOTTOM_MARGIN`
    pub const PADDLE_BOTTOM_MARGIN: i32 = 4;
    /// Paddle column, counted from the right edge
    pub const PADDLE_RIGHT_OFFSET: i32 = 3;

    /// A level is gained every time the score reaches a multiple of this
    pub const POINTS_PER_LEVEL: u32 = 10;

    /// Tick interval before any level reduction (ms)
    pub const BASE_TICK_MS: u64 = 80;
    /// Interval reduction per level (ms)
    pub const TICK_STEP_MS: u64 = 5;
    /// Default configured minimum interval (ms)
    pub const MIN_TICK_MS: u64 = 25;
    /// No configuration can go faster than this (ms)
    pub const HARD_FLOOR_TICK_MS: u64 = 10;

    /// How long the game-over banner stays up (ms)
    pub const GAME_OVER_PAUSE_MS: u64 = 2000;

    /// Relay defaults
    pub const RELAY_HOST: &str = "0.0.0.0";
    pub const RELAY_PORT: u16 = 8765;
    pub const RELAY_URL: &str = "ws://localhost:8765";

    /// Directory holding one progress file per username
    pub const SAVES_DIR: &str = "saves";
}
