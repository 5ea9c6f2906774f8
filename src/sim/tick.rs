//! One simulation step
//!
//! Paddle input, ball movement, wall bounces, paddle returns and misses,
//! applied in that order.

use super::state::{GameEvent, SessionState};
use crate::consts::POINTS_PER_LEVEL;

/// Paddle movement requested for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaddleInput {
    #[default]
    None,
    Up,
    Down,
}

/// Advance the game state by one tick
///
/// Returns what happened so the caller can persist or level up. Once the
/// last life is gone the state is terminal and further ticks do nothing.
pub fn tick(state: &mut SessionState, input: PaddleInput) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.is_over() {
        return events;
    }

    match input {
        PaddleInput::Up => state.paddle.move_up(),
        PaddleInput::Down => state.paddle.move_down(),
        PaddleInput::None => {}
    }

    let field = state.field;
    let ball = &mut state.ball;
    ball.step();

    if ball.y <= field.top() || ball.y >= field.bottom() {
        ball.dy = -ball.dy;
    }

    if ball.x <= field.left() {
        ball.dx = -ball.dx;
    }

    // Exact column: a ball that skips this column is a miss
    if ball.x == state.paddle.x - 1 && state.paddle.covers(ball.y) {
        ball.dx = -ball.dx;
        let profile = &mut state.profile;
        profile.score = profile.score.saturating_add(1);
        events.push(GameEvent::Scored {
            score: profile.score,
        });
        if profile.score % POINTS_PER_LEVEL == 0 {
            profile.level = profile.level.saturating_add(1);
            events.push(GameEvent::LevelUp {
                level: profile.level,
            });
        }
    }

    if state.ball.x >= field.far_edge() {
        state.lives = state.lives.saturating_sub(1);
        events.push(GameEvent::Missed { lives: state.lives });
        if state.lives == 0 {
            events.push(GameEvent::GameOver);
        } else {
            state.respawn_ball();
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{PlayerProfile, SavedProgress};
    use crate::sim::state::{Ball, Playfield, TickTiming};
    use proptest::prelude::*;

    fn state_with(width: u16, height: u16, seed: u64) -> SessionState {
        SessionState::new(
            PlayerProfile::new("Player1234"),
            Playfield::new(width, height),
            TickTiming::default(),
            seed,
        )
    }

    /// Ball one step away from the paddle's return column, on the paddle row
    fn about_to_return(state: &mut SessionState) {
        state.ball = Ball {
            x: state.paddle.x - 2,
            y: state.paddle.y,
            dx: 1,
            dy: 1,
        };
    }

    /// Ball one step away from the far edge, well clear of the paddle
    fn about_to_miss(state: &mut SessionState) {
        state.ball = Ball {
            x: state.field.far_edge() - 1,
            y: state.paddle.y - 6,
            dx: 1,
            dy: 1,
        };
    }

    #[test]
    fn test_paddle_input_moves_one_row() {
        let mut state = state_with(80, 24, 1);
        let y = state.paddle.y;
        tick(&mut state, PaddleInput::Up);
        assert_eq!(state.paddle.y, y - 1);
        tick(&mut state, PaddleInput::Down);
        tick(&mut state, PaddleInput::Down);
        assert_eq!(state.paddle.y, y + 1);
        tick(&mut state, PaddleInput::None);
        assert_eq!(state.paddle.y, y + 1);
    }

    #[test]
    fn test_paddle_input_ignored_at_bounds() {
        let mut state = state_with(80, 24, 1);
        state.paddle.y = state.paddle.min_y;
        tick(&mut state, PaddleInput::Up);
        assert_eq!(state.paddle.y, state.paddle.min_y);
    }

    #[test]
    fn test_top_then_bottom_restores_direction() {
        let mut state = state_with(400, 10, 1);
        state.ball = Ball {
            x: 200,
            y: 2,
            dx: 1,
            dy: -1,
        };

        tick(&mut state, PaddleInput::None);
        assert_eq!(state.ball.y, 1);
        assert_eq!(state.ball.dy, 1);

        for _ in 0..7 {
            tick(&mut state, PaddleInput::None);
        }
        assert_eq!(state.ball.y, 8);
        assert_eq!(state.ball.dy, -1);

        for _ in 0..6 {
            tick(&mut state, PaddleInput::None);
        }
        assert_eq!(state.ball.y, 2);
        assert_eq!(state.ball.dy, -1);
    }

    #[test]
    fn test_left_wall_bounce() {
        let mut state = state_with(80, 24, 1);
        state.ball = Ball {
            x: 2,
            y: 10,
            dx: -1,
            dy: 1,
        };
        let events = tick(&mut state, PaddleInput::None);
        assert!(events.is_empty());
        assert_eq!(state.ball.x, 1);
        assert_eq!(state.ball.dx, 1);
    }

    #[test]
    fn test_paddle_return_scores() {
        let mut state = state_with(80, 24, 1);
        about_to_return(&mut state);
        let events = tick(&mut state, PaddleInput::None);
        assert_eq!(events, vec![GameEvent::Scored { score: 1 }]);
        assert_eq!(state.ball.dx, -1);
        assert_eq!(state.profile.level, 1);
    }

    #[test]
    fn test_tenth_point_levels_up() {
        let mut state = state_with(80, 24, 1);
        state.profile.score = 9;
        about_to_return(&mut state);
        let events = tick(&mut state, PaddleInput::None);
        assert_eq!(
            events,
            vec![GameEvent::Scored { score: 10 }, GameEvent::LevelUp { level: 2 }]
        );
        assert_eq!(state.tick_interval(), TickTiming::default().interval(2));
    }

    #[test]
    fn test_return_at_max_score_saturates() {
        let mut state = state_with(80, 24, 1);
        state.profile = PlayerProfile::with_progress(
            "Player123",
            SavedProgress {
                score: u32::MAX,
                level: 3,
            },
        );
        about_to_return(&mut state);
        let events = tick(&mut state, PaddleInput::None);
        assert_eq!(events, vec![GameEvent::Scored { score: u32::MAX }]);
        assert_eq!(state.profile.score, u32::MAX);
        assert_eq!(state.profile.level, 3);
        assert_eq!(state.ball.dx, -1);
    }

    #[test]
    fn test_ball_past_return_column_is_missed() {
        let mut state = state_with(80, 24, 1);
        state.ball = Ball {
            x: state.paddle.x - 1,
            y: state.paddle.y,
            dx: 1,
            dy: 1,
        };
        // Paddle column and the one after it; neither counts as a return
        assert!(tick(&mut state, PaddleInput::None).is_empty());
        assert!(tick(&mut state, PaddleInput::None).is_empty());
        let events = tick(&mut state, PaddleInput::None);
        assert_eq!(events, vec![GameEvent::Missed { lives: 2 }]);
        assert_eq!(state.profile.score, 0);
    }

    #[test]
    fn test_miss_respawns_ball() {
        let mut state = state_with(80, 24, 1);
        about_to_miss(&mut state);
        let events = tick(&mut state, PaddleInput::None);
        assert_eq!(events, vec![GameEvent::Missed { lives: 2 }]);
        assert_eq!((state.ball.x, state.ball.y), state.field.center());
        assert_eq!(state.ball.dx, -1);
        assert!(state.ball.dy == 1 || state.ball.dy == -1);
    }

    #[test]
    fn test_last_miss_ends_game() {
        let mut state = state_with(80, 24, 1);
        for expected in [2, 1] {
            about_to_miss(&mut state);
            let events = tick(&mut state, PaddleInput::None);
            assert_eq!(events, vec![GameEvent::Missed { lives: expected }]);
        }
        about_to_miss(&mut state);
        let events = tick(&mut state, PaddleInput::None);
        assert_eq!(events, vec![GameEvent::Missed { lives: 0 }, GameEvent::GameOver]);
        assert!(state.is_over());

        // Terminal: nothing moves any more
        let ball = state.ball;
        assert!(tick(&mut state, PaddleInput::Up).is_empty());
        assert_eq!(state.ball, ball);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = state_with(80, 24, 99999);
        let mut state2 = state_with(80, 24, 99999);
        let inputs = [PaddleInput::Up, PaddleInput::None, PaddleInput::Down];

        for i in 0..2000 {
            let input = inputs[i % inputs.len()];
            let e1 = tick(&mut state1, input);
            let e2 = tick(&mut state2, input);
            assert_eq!(e1, e2);
        }

        assert_eq!(state1.ball, state2.ball);
        assert_eq!(state1.paddle, state2.paddle);
        assert_eq!(state1.lives, state2.lives);
        assert_eq!(state1.profile, state2.profile);
    }

    proptest! {
        #[test]
        fn prop_free_flight_moves_by_direction(
            x in 3i32..=74,
            y in 3i32..=20,
            dx in prop::sample::select(vec![-1i32, 1]),
            dy in prop::sample::select(vec![-1i32, 1]),
        ) {
            let mut state = state_with(80, 24, 5);
            state.ball = Ball { x, y, dx, dy };
            let events = tick(&mut state, PaddleInput::None);
            prop_assert!(events.is_empty());
            prop_assert_eq!(state.ball, Ball { x: x + dx, y: y + dy, dx, dy });
        }

        #[test]
        fn prop_boundary_inverts_vertical(
            x in 10i32..=60,
            dx in prop::sample::select(vec![-1i32, 1]),
            top in any::<bool>(),
        ) {
            let mut state = state_with(80, 24, 5);
            let (y, dy) = if top { (2, -1) } else { (state.field.bottom() - 1, 1) };
            state.ball = Ball { x, y, dx, dy };
            tick(&mut state, PaddleInput::None);
            prop_assert_eq!(state.ball.dy, -dy);
            prop_assert_eq!(state.ball.dx, dx);
        }

        #[test]
        fn prop_return_scores_one_and_levels_on_tens(start in 0u32..500) {
            let mut state = state_with(80, 24, 5);
            state.profile.score = start;
            let level = state.profile.level;
            about_to_return(&mut state);
            let events = tick(&mut state, PaddleInput::None);

            let score = start + 1;
            prop_assert_eq!(state.profile.score, score);
            let levelled = events.contains(&GameEvent::LevelUp { level: level + 1 });
            prop_assert_eq!(levelled, score % POINTS_PER_LEVEL == 0);
            let expected_level = if score % POINTS_PER_LEVEL == 0 { level + 1 } else { level };
            prop_assert_eq!(state.profile.level, expected_level);
        }

        #[test]
        fn prop_miss_costs_exactly_one_life(lives in 1u8..=9) {
            let mut state = state_with(80, 24, 5).with_lives(lives);
            about_to_miss(&mut state);
            let events = tick(&mut state, PaddleInput::None);
            prop_assert_eq!(state.lives, lives - 1);
            prop_assert_eq!(events.contains(&GameEvent::GameOver), lives == 1);
        }
    }
}
