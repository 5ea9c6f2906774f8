//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One grid cell of movement per tick
//! - Seeded RNG only
//! - No rendering, timing or storage dependencies

pub mod state;
pub mod tick;

pub use state::{Ball, GameEvent, Paddle, Playfield, SessionState, TickTiming, random_sign};
pub use tick::{PaddleInput, tick};
