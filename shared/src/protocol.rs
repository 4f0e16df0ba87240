//! JSON event protocol spoken over each client connection.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}` where
//! the payload is omitted for events that carry none.

use crate::math::Vector2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point on the court.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// Current score line, `p1` for the left slot and `p2` for the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scores {
    pub p1: u32,
    pub p2: u32,
}

/// Full ball snapshot sent at the start of every rally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub x: f32,
    pub y: f32,
    pub velocity: Vector2,
}

/// Events sent from a client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// New top-edge y coordinate of the sender's paddle.
    Move(f32),
    RestartGame,
}

/// Events sent from the server to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Slot handed to the receiving connection: 1 (left) or 2 (right).
    PlayerSelected(u8),
    /// The opponent moved their paddle to this y.
    UpdatePaddle(f32),
    GameStart(Position),
    BallMove(Position),
    ScoreChange(Scores),
    NewRound(BallState),
    /// Winning slot: 1 or 2.
    GameEnd(u8),
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed event: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported frame type: {0}")]
    UnsupportedFrame(&'static str),
}

impl ClientEvent {
    /// Parses a text frame. Non-numeric `move` payloads are rejected here so
    /// they never reach the match state.
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        let event: ClientEvent = serde_json::from_str(text)?;
        match event {
            ClientEvent::Move(y) if !y.is_finite() => Err(ProtocolError::Malformed(
                serde::de::Error::custom("paddle position must be finite"),
            )),
            event => Ok(event),
        }
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ServerEvent {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Wire name of the event, used for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::PlayerSelected(_) => "playerSelected",
            ServerEvent::UpdatePaddle(_) => "updatePaddle",
            ServerEvent::GameStart(_) => "gameStart",
            ServerEvent::BallMove(_) => "ballMove",
            ServerEvent::ScoreChange(_) => "scoreChange",
            ServerEvent::NewRound(_) => "newRound",
            ServerEvent::GameEnd(_) => "gameEnd",
        }
    }
}
