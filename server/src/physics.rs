//! Ball collision resolution against the court walls and paddles.

use crate::game::{MatchState, Slot};
use pong_shared::{
    normalize, reflect, Vector2, CANVAS_HEIGHT, CANVAS_WIDTH, PADDLE_HEIGHT, PADDLE_WIDTH,
};
use rand::Rng;
use std::f32::consts::FRAC_PI_4;

/// What a single resolver pass did to the ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    None,
    /// Bounced off the top or bottom wall.
    Wall,
    /// Bounced off this slot's paddle.
    Paddle(Slot),
    /// The ball left the court and this slot was awarded a point.
    Scored(Slot),
}

/// Random launch direction at most 45 degrees from horizontal, with
/// independent random horizontal and vertical signs.
pub fn launch_vector<R: Rng + ?Sized>(rng: &mut R) -> Vector2 {
    let angle = rng.gen_range(0.0..FRAC_PI_4);
    let sx = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let sy = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    Vector2::new(angle.cos() * sx, angle.sin() * sy)
}

/// Re-normalizes `v`, falling back to a fresh launch direction when it has
/// collapsed to zero.
fn renormalize<R: Rng + ?Sized>(v: Vector2, rng: &mut R) -> Vector2 {
    normalize(v).unwrap_or_else(|| launch_vector(rng))
}

fn touches_paddle(paddle_y: f32, ball_y: f32) -> bool {
    paddle_y <= ball_y && ball_y < paddle_y + PADDLE_HEIGHT
}

/// Resolves at most one contact for the ball's current position.
///
/// Checks run in priority order and the first match wins: top/bottom walls,
/// then the side walls (scoring), then the paddles. Scoring resets only the
/// ball; the caller is responsible for telling clients.
pub fn resolve_collision<R: Rng + ?Sized>(state: &mut MatchState, rng: &mut R) -> Collision {
    let ball = &mut state.ball;

    if ball.y <= 0.0 || ball.y >= CANVAS_HEIGHT {
        ball.y = ball.y.clamp(0.0, CANVAS_HEIGHT);
        ball.velocity = renormalize(reflect(ball.velocity, Vector2::HORIZONTAL_WALL), rng);
        return Collision::Wall;
    }

    if ball.x >= CANVAS_WIDTH || ball.x <= 0.0 {
        // The ball escaped past one side; the player defending the other side scores.
        let scorer = if ball.x >= CANVAS_WIDTH {
            Slot::Left
        } else {
            Slot::Right
        };
        state.award_point(scorer);
        state.reset_ball(rng);
        return Collision::Scored(scorer);
    }

    let paddle = if ball.x <= PADDLE_WIDTH
        && touches_paddle(state.players[Slot::Left.index()].paddle_y, ball.y)
    {
        Some(Slot::Left)
    } else if ball.x >= CANVAS_WIDTH - PADDLE_WIDTH
        && touches_paddle(state.players[Slot::Right.index()].paddle_y, ball.y)
    {
        Some(Slot::Right)
    } else {
        None
    };

    match paddle {
        Some(slot) => {
            ball.x = ball.x.clamp(PADDLE_WIDTH, CANVAS_WIDTH - PADDLE_WIDTH);
            ball.velocity = renormalize(reflect(ball.velocity, Vector2::VERTICAL_WALL), rng);
            Collision::Paddle(slot)
        }
        None => Collision::None,
    }
}
