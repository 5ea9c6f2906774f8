//! Game state and core simulation types
//!
//! Everything one tick reads or writes lives here, including the RNG, so a
//! session replays identically from the same seed and inputs.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::PlayerProfile;

/// Something a tick produced that the session has to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Ball returned by the paddle; carries the new score
    Scored { score: u32 },
    /// Score crossed a multiple of ten; carries the new level
    LevelUp { level: u32 },
    /// Ball got past the paddle; carries the lives left
    Missed { lives: u8 },
    /// Last life lost
    GameOver,
}

/// Character grid the game is played on, border included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playfield {
    pub width: i32,
    pub height: i32,
}

impl Playfield {
    /// Smallest grid that still fits the header and a movable paddle
    pub const MIN_WIDTH: i32 = 24;
    pub const MIN_HEIGHT: i32 = 10;

    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: i32::from(width).max(Self::MIN_WIDTH),
            height: i32::from(height).max(Self::MIN_HEIGHT),
        }
    }

    /// Ball bounces off the top once its row is at or above this
    pub fn top(&self) -> i32 {
        1
    }

    /// Ball bounces off the bottom once its row is at or below this
    pub fn bottom(&self) -> i32 {
        self.height - 2
    }

    /// The wall opposite the paddle
    pub fn left(&self) -> i32 {
        1
    }

    /// Reaching this column means the paddle missed
    pub fn far_edge(&self) -> i32 {
        self.width - 1
    }

    pub fn paddle_column(&self) -> i32 {
        self.width - PADDLE_RIGHT_OFFSET
    }

    pub fn center(&self) -> (i32, i32) {
        (self.width / 2, self.height / 2)
    }
}

/// The ball: a grid cell moving one step per tick along each axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ball {
    pub x: i32,
    pub y: i32,
    /// -1 toward the wall, +1 toward the paddle
    pub dx: i32,
    /// -1 up, +1 down
    pub dy: i32,
}

impl Ball {
    pub fn step(&mut self) {
        self.x += self.dx;
        self.y += self.dy;
    }
}

/// The player's paddle, fixed column, moving vertically within bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paddle {
    pub x: i32,
    /// Center row
    pub y: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl Paddle {
    pub fn new(field: &Playfield) -> Self {
        Self {
            x: field.paddle_column(),
            y: field.height / 2,
            min_y: PADDLE_TOP_MARGIN,
            max_y: field.height - PADDLE_BOTTOM_MARGIN,
        }
    }

    pub fn move_up(&mut self) {
        if self.y > self.min_y {
            self.y -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.y < self.max_y {
            self.y += 1;
        }
    }

    /// Whether a ball on `row` lines up with the paddle
    pub fn covers(&self, row: i32) -> bool {
        (row - self.y).abs() <= PADDLE_HALF_HEIGHT
    }
}

/// Level-dependent tick pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickTiming {
    pub base_ms: u64,
    pub step_ms: u64,
    /// Configured minimum; values below the hard floor are raised to it
    pub floor_ms: u64,
}

impl Default for TickTiming {
    fn default() -> Self {
        Self {
            base_ms: BASE_TICK_MS,
            step_ms: TICK_STEP_MS,
            floor_ms: MIN_TICK_MS,
        }
    }
}

impl TickTiming {
    /// Delay between ticks at `level`: shrinks with level, never below the floor
    pub fn interval(&self, level: u32) -> Duration {
        let reduction = self.step_ms.saturating_mul(u64::from(level));
        let floor = self.floor_ms.max(HARD_FLOOR_TICK_MS);
        Duration::from_millis(self.base_ms.saturating_sub(reduction).max(floor))
    }
}

/// Uniform pick from {-1, +1}
pub fn random_sign(rng: &mut impl Rng) -> i32 {
    if rng.random_bool(0.5) { 1 } else { -1 }
}

/// Complete single-player state
#[derive(Debug, Clone)]
pub struct SessionState {
    pub profile: PlayerProfile,
    pub field: Playfield,
    pub ball: Ball,
    pub paddle: Paddle,
    pub lives: u8,
    pub timing: TickTiming,
    /// Seed the RNG was created from
    seed: u64,
    rng: Pcg32,
}

impl SessionState {
    /// Fresh board for `profile`; the ball heads toward the paddle
    pub fn new(profile: PlayerProfile, field: Playfield, timing: TickTiming, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let ball = Ball {
            x: field.width / 3,
            y: field.height / 2,
            dx: 1,
            dy: random_sign(&mut rng),
        };
        Self {
            profile,
            field,
            ball,
            paddle: Paddle::new(&field),
            lives: START_LIVES,
            timing,
            seed,
            rng,
        }
    }

    /// Override the starting lives (settings)
    pub fn with_lives(mut self, lives: u8) -> Self {
        self.lives = lives.max(1);
        self
    }

    /// Seed the serves are drawn from; replaying it reproduces the session
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tick_interval(&self) -> Duration {
        self.timing.interval(self.profile.level)
    }

    /// Put the ball back in the middle, heading for the wall
    pub fn respawn_ball(&mut self) {
        let (x, y) = self.field.center();
        self.ball = Ball {
            x,
            y,
            dx: -1,
            dy: random_sign(&mut self.rng),
        };
    }

    pub fn is_over(&self) -> bool {
        self.lives == 0
    }
}
