use crate::physics::launch_vector;
use log::info;
use pong_shared::{BallState, Position, Scores, Vector2, COURT_CENTER, PADDLE_START_Y};
use rand::Rng;

/// One of the two fixed player positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Left,
    Right,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Left, Slot::Right];

    /// Player number used on the wire: 1 for left, 2 for right.
    pub fn number(self) -> u8 {
        match self {
            Slot::Left => 1,
            Slot::Right => 2,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Slot::Left => 0,
            Slot::Right => 1,
        }
    }

    pub fn opponent(self) -> Slot {
        match self {
            Slot::Left => Slot::Right,
            Slot::Right => Slot::Left,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Top edge of the paddle.
    pub paddle_y: f32,
    pub score: u32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            paddle_y: PADDLE_START_Y,
            score: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    /// Direction of travel, always unit length.
    pub velocity: Vector2,
}

impl Ball {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            x: COURT_CENTER.x,
            y: COURT_CENTER.y,
            velocity: launch_vector(rng),
        }
    }

    /// Re-centres the ball with a freshly randomized direction.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.x = COURT_CENTER.x;
        self.y = COURT_CENTER.y;
        self.velocity = launch_vector(rng);
    }

    pub fn position(&self) -> Position {
        Position {
            x: self.x,
            y: self.y,
        }
    }

    pub fn snapshot(&self) -> BallState {
        BallState {
            x: self.x,
            y: self.y,
            velocity: self.velocity,
        }
    }
}

/// Authoritative state of the single match: both players and the ball.
///
/// Entities live for the whole process and are only ever mutated in place.
#[derive(Debug, Clone)]
pub struct MatchState {
    pub players: [Player; 2],
    pub ball: Ball,
}

impl MatchState {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            players: [Player::default(), Player::default()],
            ball: Ball::new(rng),
        }
    }

    pub fn player(&self, slot: Slot) -> &Player {
        &self.players[slot.index()]
    }

    pub fn player_mut(&mut self, slot: Slot) -> &mut Player {
        &mut self.players[slot.index()]
    }

    /// Re-centres both paddles, zeroes both scores and resets the ball.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for player in &mut self.players {
            player.paddle_y = PADDLE_START_Y;
            player.score = 0;
        }
        self.reset_ball(rng);
    }

    /// Ball-only reset used between rallies; scores are kept.
    pub fn reset_ball<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.ball.reset(rng);
    }

    /// Overwrites a paddle position. Values are taken as reported.
    pub fn set_paddle(&mut self, slot: Slot, y: f32) {
        self.player_mut(slot).paddle_y = y;
    }

    pub fn award_point(&mut self, slot: Slot) {
        let player = self.player_mut(slot);
        player.score += 1;
        info!("Player {} scored ({} points)", slot.number(), player.score);
    }

    pub fn scores(&self) -> Scores {
        Scores {
            p1: self.player(Slot::Left).score,
            p2: self.player(Slot::Right).score,
        }
    }

    /// Returns the winning slot once either score has reached `win_score`.
    ///
    /// The winner is whoever holds the strictly higher score; a tie goes to
    /// the right slot.
    pub fn winner(&self, win_score: u32) -> Option<Slot> {
        let Scores { p1, p2 } = self.scores();
        if p1 < win_score && p2 < win_score {
            return None;
        }
        if p1 > p2 {
            Some(Slot::Left)
        } else {
            Some(Slot::Right)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state() -> (MatchState, StdRng) {
        let mut rng = StdRng::seed_from_u64(7);
        (MatchState::new(&mut rng), rng)
    }

    #[test]
    fn test_initial_state() {
        let (state, _) = state();
        assert_eq!(state.player(Slot::Left).paddle_y, 165.0);
        assert_eq!(state.player(Slot::Right).paddle_y, 165.0);
        assert_eq!(state.scores(), Scores { p1: 0, p2: 0 });
        assert_eq!(state.ball.position(), COURT_CENTER);
        assert!(state.ball.velocity.is_unit(1e-5));
    }

    #[test]
    fn test_slot_numbers() {
        assert_eq!(Slot::Left.number(), 1);
        assert_eq!(Slot::Right.number(), 2);
        assert_eq!(Slot::Left.opponent(), Slot::Right);
        assert_eq!(Slot::Right.opponent(), Slot::Left);
    }

    #[test]
    fn test_reset_restores_everything() {
        let (mut state, mut rng) = state();
        state.player_mut(Slot::Left).score = 4;
        state.player_mut(Slot::Right).score = 6;
        state.set_paddle(Slot::Left, 12.0);
        state.set_paddle(Slot::Right, 300.0);
        state.ball.x = 17.0;
        state.ball.y = 333.0;

        state.reset(&mut rng);

        assert_eq!(state.scores(), Scores { p1: 0, p2: 0 });
        assert_eq!(state.player(Slot::Left).paddle_y, 165.0);
        assert_eq!(state.player(Slot::Right).paddle_y, 165.0);
        assert_eq!(state.ball.position(), Position { x: 300.0, y: 200.0 });
        assert!(state.ball.velocity.is_unit(1e-5));
    }

    #[test]
    fn test_reset_ball_keeps_scores_and_paddles() {
        let (mut state, mut rng) = state();
        state.player_mut(Slot::Left).score = 2;
        state.set_paddle(Slot::Right, 50.0);
        state.ball.x = 599.0;

        state.reset_ball(&mut rng);

        assert_eq!(state.scores(), Scores { p1: 2, p2: 0 });
        assert_eq!(state.player(Slot::Right).paddle_y, 50.0);
        assert_eq!(state.ball.position(), COURT_CENTER);
    }

    #[test]
    fn test_set_paddle_accepts_any_value() {
        let (mut state, _) = state();
        state.set_paddle(Slot::Left, -500.0);
        assert_eq!(state.player(Slot::Left).paddle_y, -500.0);
    }

    #[test]
    fn test_winner() {
        let (mut state, _) = state();
        assert_eq!(state.winner(7), None);

        state.player_mut(Slot::Left).score = 6;
        state.player_mut(Slot::Right).score = 6;
        assert_eq!(state.winner(7), None);

        state.award_point(Slot::Left);
        assert_eq!(state.winner(7), Some(Slot::Left));

        state.player_mut(Slot::Left).score = 3;
        state.player_mut(Slot::Right).score = 7;
        assert_eq!(state.winner(7), Some(Slot::Right));
    }
}
