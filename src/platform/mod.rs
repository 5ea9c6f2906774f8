//! Terminal platform layer
//!
//! Handles everything that touches the real terminal:
//! - Raw mode / alternate screen lifetime
//! - Key events (non-blocking during play, blocking in menus)
//! - Painting the playfield and menus

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use crate::consts::PADDLE_HALF_HEIGHT;
use crate::session::{Command, Frontend};
use crate::sim::{Playfield, SessionState};

/// Raw-mode terminal; restored when dropped
pub struct Terminal {
    out: Stdout,
}

impl Terminal {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, Hide)?;
        Ok(Self { out })
    }

    /// Blocking vertical menu; returns the chosen index
    ///
    /// Esc picks the last entry (Quit/Back).
    pub fn menu(&mut self, title: &str, options: &[&str]) -> io::Result<usize> {
        let mut selected = 0;
        loop {
            queue!(
                self.out,
                Clear(ClearType::All),
                MoveTo(4, 2),
                SetAttribute(Attribute::Bold),
                Print(title),
                SetAttribute(Attribute::Reset)
            )?;
            for (i, option) in options.iter().enumerate() {
                let attr = if i == selected {
                    Attribute::Reverse
                } else {
                    Attribute::Reset
                };
                queue!(
                    self.out,
                    MoveTo(6, 4 + i as u16),
                    SetAttribute(attr),
                    Print(option),
                    SetAttribute(Attribute::Reset)
                )?;
            }
            self.out.flush()?;

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Up => selected = (selected + options.len() - 1) % options.len(),
                    KeyCode::Down => selected = (selected + 1) % options.len(),
                    KeyCode::Enter => return Ok(selected),
                    KeyCode::Esc => return Ok(options.len() - 1),
                    _ => {}
                }
            }
        }
    }

    fn put(&mut self, row: i32, col: i32, text: &str) -> io::Result<()> {
        if row < 0 || col < 0 {
            return Ok(());
        }
        queue!(self.out, MoveTo(col as u16, row as u16), Print(text))
    }

    fn border(&mut self, field: &Playfield) -> io::Result<()> {
        let (w, h) = (field.width, field.height);
        let horizontal = "─".repeat((w - 2).max(0) as usize);
        self.put(0, 0, &format!("┌{horizontal}┐"))?;
        self.put(h - 1, 0, &format!("└{horizontal}┘"))?;
        for row in 1..h - 1 {
            self.put(row, 0, "│")?;
            self.put(row, w - 1, "│")?;
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn command_for(key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Up => Some(Command::Up),
        KeyCode::Down => Some(Command::Down),
        KeyCode::Char('q') => Some(Command::Quit),
        _ => None,
    }
}

impl Frontend for Terminal {
    fn playfield(&self) -> Playfield {
        let (w, h) = terminal::size().unwrap_or((80, 24));
        Playfield::new(w, h)
    }

    fn poll_command(&mut self) -> io::Result<Option<Command>> {
        // Drain whatever is queued; the first game key wins this tick
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if let Some(command) = command_for(key) {
                    return Ok(Some(command));
                }
            }
        }
        Ok(None)
    }

    fn render(&mut self, state: &SessionState) -> io::Result<()> {
        let field = state.field;
        queue!(self.out, Clear(ClearType::All))?;
        self.border(&field)?;

        let profile = &state.profile;
        self.put(
            0,
            2,
            &format!(
                "Score: {}  Level: {}  Lives: {}",
                profile.score, profile.level, state.lives
            ),
        )?;
        self.put(0, field.width - 20, &format!("Player: {}", profile.username))?;

        let paddle = state.paddle;
        for dy in -PADDLE_HALF_HEIGHT..=PADDLE_HALF_HEIGHT {
            let row = paddle.y + dy;
            if 0 < row && row < field.height - 1 {
                self.put(row, paddle.x, "|")?;
            }
        }

        let ball = state.ball;
        if 0 < ball.x && ball.x < field.width - 1 && 0 < ball.y && ball.y < field.height - 1 {
            self.put(ball.y, ball.x, "O")?;
        }
        self.out.flush()
    }

    fn show_game_over(&mut self, state: &SessionState) -> io::Result<()> {
        let (x, y) = state.field.center();
        self.put(y, x - 5, "GAME OVER!")?;
        self.out.flush()
    }
}
