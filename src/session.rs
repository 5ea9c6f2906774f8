//! Single-player session
//!
//! Owns the simulation state and the tick loop, turns tick events into
//! progression, and saves progress exactly once when the session ends.
//!
//! Running -> (quit | last life lost) -> Terminating (save) -> Ended

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::persistence::{PlayerProfile, ProfileError, ProfileStore};
use crate::settings::Settings;
use crate::sim::{GameEvent, PaddleInput, Playfield, SessionState, tick};

/// Player command read from the input collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Up,
    Down,
    Quit,
}

/// Render/input collaborator driven once per tick
pub trait Frontend {
    /// Grid the game is played on
    fn playfield(&self) -> Playfield;

    /// Next pending command; must not block
    fn poll_command(&mut self) -> io::Result<Option<Command>>;

    /// Paint border, header, paddle and ball
    fn render(&mut self, state: &SessionState) -> io::Result<()>;

    fn show_game_over(&mut self, state: &SessionState) -> io::Result<()>;
}

impl<F: Frontend + ?Sized> Frontend for &mut F {
    fn playfield(&self) -> Playfield {
        (**self).playfield()
    }

    fn poll_command(&mut self) -> io::Result<Option<Command>> {
        (**self).poll_command()
    }

    fn render(&mut self, state: &SessionState) -> io::Result<()> {
        (**self).render(state)
    }

    fn show_game_over(&mut self, state: &SessionState) -> io::Result<()> {
        (**self).show_game_over(state)
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    /// Terminal input or painting failed.
    #[error("frontend: {0}")]
    Frontend(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Running,
    Terminating,
    Ended,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Quit,
    GameOver,
}

/// Final report handed back to the caller
#[derive(Debug)]
pub struct SessionSummary {
    pub profile: PlayerProfile,
    pub outcome: Outcome,
    /// Set when the final save failed; the session still ended normally
    pub save_error: Option<ProfileError>,
}

pub struct GameSession<F, S> {
    state: SessionState,
    frontend: F,
    store: S,
    phase: SessionPhase,
    outcome: Option<Outcome>,
    save_error: Option<ProfileError>,
    game_over_pause: Duration,
}

impl<F: Frontend, S: ProfileStore> GameSession<F, S> {
    /// Set up a session for `username`
    ///
    /// `resumed` loads stored progress (defaults if absent or unreadable);
    /// otherwise the player starts at score 0, level 1.
    pub fn start(
        username: &str,
        resumed: bool,
        seed: u64,
        settings: &Settings,
        frontend: F,
        store: S,
    ) -> Self {
        let profile = if resumed {
            store.load_profile(username).unwrap_or_else(|e| {
                log::warn!("Could not load progress for {username}, starting fresh: {e}");
                PlayerProfile::new(username)
            })
        } else {
            PlayerProfile::new(username)
        };
        log::info!(
            "Session start for {} (score {}, level {}, seed {seed})",
            profile.username,
            profile.score,
            profile.level
        );

        let state = SessionState::new(profile, frontend.playfield(), settings.timing, seed)
            .with_lives(settings.lives);

        Self {
            state,
            frontend,
            store,
            phase: SessionPhase::Running,
            outcome: None,
            save_error: None,
            game_over_pause: Duration::from_millis(settings.game_over_pause_ms),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn save_error(&self) -> Option<&ProfileError> {
        self.save_error.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// One step: poll input, advance physics, redraw
    pub fn tick(&mut self) -> Result<SessionPhase, SessionError> {
        if self.phase != SessionPhase::Running {
            return Ok(self.phase);
        }

        let input = match self.frontend.poll_command()? {
            Some(Command::Quit) => return Ok(self.quit()),
            Some(Command::Up) => PaddleInput::Up,
            Some(Command::Down) => PaddleInput::Down,
            None => PaddleInput::None,
        };

        let events = tick(&mut self.state, input);
        let mut game_over = false;
        for event in events {
            match event {
                GameEvent::LevelUp { level } => log::debug!(
                    "Level {level}, tick interval now {:?}",
                    self.state.tick_interval()
                ),
                GameEvent::Missed { lives } => log::debug!("Missed, {lives} lives left"),
                GameEvent::GameOver => game_over = true,
                GameEvent::Scored { .. } => {}
            }
        }

        self.frontend.render(&self.state)?;

        if game_over {
            self.finish(Outcome::GameOver);
            self.frontend.show_game_over(&self.state)?;
        }
        Ok(self.phase)
    }

    /// End the session at the player's request, saving progress
    pub fn quit(&mut self) -> SessionPhase {
        self.finish(Outcome::Quit)
    }

    fn finish(&mut self, outcome: Outcome) -> SessionPhase {
        if self.phase != SessionPhase::Running {
            return self.phase;
        }
        self.phase = SessionPhase::Terminating;
        self.outcome = Some(outcome);

        let profile = &self.state.profile;
        if let Err(e) = self.store.save(profile) {
            log::warn!("Failed to save progress for {}: {e}", profile.username);
            self.save_error = Some(e);
        }

        self.phase = SessionPhase::Ended;
        log::info!(
            "Session ended ({outcome:?}) for {}: score {}, level {} (seed {})",
            profile.username,
            profile.score,
            profile.level,
            self.state.seed()
        );
        self.phase
    }

    /// Drive the tick loop until the session ends
    ///
    /// The delay between ticks is the only suspension point. A frontend
    /// failure still saves progress before the error is returned.
    pub async fn run(mut self) -> Result<SessionSummary, SessionError> {
        loop {
            match self.tick() {
                Ok(SessionPhase::Running) => {
                    tokio::time::sleep(self.state.tick_interval()).await;
                }
                Ok(_) => break,
                Err(e) => {
                    self.quit();
                    return Err(e);
                }
            }
        }

        if self.outcome == Some(Outcome::GameOver) {
            tokio::time::sleep(self.game_over_pause).await;
        }

        Ok(SessionSummary {
            outcome: self.outcome.unwrap_or(Outcome::Quit),
            profile: self.state.profile,
            save_error: self.save_error,
        })
    }
}
