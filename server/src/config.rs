//! Runtime tunables for a match. Defaults mirror the court constants in
//! `pong_shared`; the binary overrides them from command-line flags.

use pong_shared::{BALL_SPEED, MAX_TICK_RATE, WIN_SCORE};
use std::time::Duration;

/// What happens to a player slot when its connection goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisconnectPolicy {
    /// The slot becomes free and the next connection can take it.
    #[default]
    FreeSlot,
    /// The slot stays bound to the closed connection until the process
    /// restarts.
    KeepSlot,
}

#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Ball travel in pixels per second.
    pub ball_speed: f32,
    /// Score that ends the match.
    pub win_score: u32,
    /// Maximum simulation ticks per second.
    pub tick_rate: u32,
    pub disconnect_policy: DisconnectPolicy,
    /// Fixed RNG seed for reproducible launch directions.
    pub seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            ball_speed: BALL_SPEED,
            win_score: WIN_SCORE,
            tick_rate: MAX_TICK_RATE,
            disconnect_policy: DisconnectPolicy::default(),
            seed: None,
        }
    }
}

impl MatchConfig {
    /// Target duration of one tick.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate.max(1) as f64)
    }
}
