//! Types shared between the pong server and its clients: court geometry,
//! 2D vector math and the JSON event protocol.

pub mod math;
pub mod protocol;

pub use math::{dot, normalize, reflect, Vector2};
pub use protocol::{BallState, ClientEvent, Position, ProtocolError, Scores, ServerEvent};

pub const CANVAS_WIDTH: f32 = 600.0;
pub const CANVAS_HEIGHT: f32 = 400.0;
pub const PADDLE_WIDTH: f32 = 10.0;
pub const PADDLE_HEIGHT: f32 = 70.0;
/// Ball travel in pixels per second.
pub const BALL_SPEED: f32 = 400.0;
pub const WIN_SCORE: u32 = 7;
/// Upper bound on simulation ticks per second.
pub const MAX_TICK_RATE: u32 = 100;

/// Top edge of a paddle centred vertically on the court.
pub const PADDLE_START_Y: f32 = (CANVAS_HEIGHT - PADDLE_HEIGHT) / 2.0;

/// Geometric centre of the court, where every rally starts.
pub const COURT_CENTER: Position = Position {
    x: CANVAS_WIDTH / 2.0,
    y: CANVAS_HEIGHT / 2.0,
};
