//! Fixed-cadence match simulation.
//!
//! The simulation is a small state machine (`Idle -> Running -> Ended`) that
//! is advanced by its owner, one tick at a time. It never sleeps or touches
//! the network itself: every step returns the events that must be broadcast,
//! and the owner decides when the next step happens (see [`throttle_delay`]).

use crate::config::MatchConfig;
use crate::game::{MatchState, Slot};
use crate::physics::{resolve_collision, Collision};
use log::info;
use pong_shared::ServerEvent;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

/// Shortest pause between two ticks.
pub const MIN_TICK_SLEEP: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No match has been started yet.
    Idle,
    Running,
    /// The last match finished with this winner.
    Ended(Slot),
}

pub struct Simulation {
    state: MatchState,
    phase: Phase,
    config: MatchConfig,
    rng: StdRng,
    last_tick: Instant,
    tick: u64,
}

impl Simulation {
    pub fn new(config: MatchConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state: MatchState::new(&mut rng),
            phase: Phase::Idle,
            config,
            rng,
            last_tick: Instant::now(),
            tick: 0,
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut MatchState {
        &mut self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Ticks simulated since the process started.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Full match reset: paddles, scores and ball.
    pub fn reset(&mut self) {
        self.state.reset(&mut self.rng);
    }

    /// Abandons the current match and returns to `Idle` with a fresh state.
    pub fn stop(&mut self) {
        if self.phase == Phase::Running {
            info!("Match abandoned");
        }
        self.phase = Phase::Idle;
        self.reset();
    }

    /// Enters the running phase from any phase and returns the `gameStart`
    /// announcement. Starting while already running restarts the phase in
    /// place; there is only ever one simulation.
    pub fn start(&mut self, now: Instant) -> ServerEvent {
        self.phase = Phase::Running;
        self.last_tick = now;
        info!(
            "Match started, ball at ({:.1}, {:.1})",
            self.state.ball.x, self.state.ball.y
        );
        ServerEvent::GameStart(self.state.ball.position())
    }

    /// Advances one tick and returns the events to broadcast, in order.
    ///
    /// The win condition is checked before anything moves. Otherwise the
    /// collision resolver runs first, then the ball is integrated over the
    /// wall-clock time since the previous tick, then its position is
    /// reported, so clients never see an uncorrected position.
    pub fn step(&mut self, now: Instant) -> Vec<ServerEvent> {
        if self.phase != Phase::Running {
            return Vec::new();
        }

        if let Some(winner) = self.state.winner(self.config.win_score) {
            self.phase = Phase::Ended(winner);
            let scores = self.state.scores();
            info!(
                "Match over: player {} wins {}-{}",
                winner.number(),
                scores.p1,
                scores.p2
            );
            return vec![ServerEvent::GameEnd(winner.number())];
        }

        let mut events = Vec::with_capacity(3);

        if let Collision::Scored(_) = resolve_collision(&mut self.state, &mut self.rng) {
            events.push(ServerEvent::ScoreChange(self.state.scores()));
            events.push(ServerEvent::NewRound(self.state.ball.snapshot()));
        }

        let delta = now.saturating_duration_since(self.last_tick).as_secs_f32();
        let travel = delta * self.config.ball_speed;
        let ball = &mut self.state.ball;
        ball.x += ball.velocity.x * travel;
        ball.y += ball.velocity.y * travel;

        events.push(ServerEvent::BallMove(ball.position()));

        self.last_tick = now;
        self.tick += 1;
        events
    }

    /// Marks the end of the current tick. The next step integrates from here,
    /// so time spent broadcasting does not count as ball travel.
    pub fn finish_tick(&mut self, now: Instant) {
        if self.phase == Phase::Running {
            self.last_tick = now;
        }
    }
}

/// Time to wait before the next tick so the loop stays under the target
/// rate. Never shorter than [`MIN_TICK_SLEEP`].
pub fn throttle_delay(target_interval: Duration, tick_duration: Duration) -> Duration {
    target_interval
        .saturating_sub(tick_duration)
        .max(MIN_TICK_SLEEP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use pong_shared::{
        Position, Scores, Vector2, CANVAS_HEIGHT, CANVAS_WIDTH, COURT_CENTER, PADDLE_START_Y,
    };

    fn seeded() -> Simulation {
        Simulation::new(MatchConfig {
            seed: Some(11),
            ..MatchConfig::default()
        })
    }

    #[test]
    fn test_starts_idle() {
        let sim = seeded();
        assert_eq!(sim.phase(), Phase::Idle);
        assert!(!sim.is_running());
        assert_eq!(sim.tick(), 0);
    }

    #[test]
    fn test_step_does_nothing_until_started() {
        let mut sim = seeded();
        assert!(sim.step(Instant::now()).is_empty());
        assert_eq!(sim.state().ball.position(), COURT_CENTER);
    }

    #[test]
    fn test_start_announces_ball_position() {
        let mut sim = seeded();
        let event = sim.start(Instant::now());
        assert_eq!(event, ServerEvent::GameStart(COURT_CENTER));
        assert!(sim.is_running());
    }

    #[test]
    fn test_step_integrates_by_elapsed_time() {
        let mut sim = seeded();
        let t0 = Instant::now();
        sim.start(t0);
        sim.state_mut().ball.velocity = Vector2::new(1.0, 0.0);

        let events = sim.step(t0 + Duration::from_millis(10));

        assert_eq!(events.len(), 1);
        match events[0] {
            ServerEvent::BallMove(Position { x, y }) => {
                assert_approx_eq!(x, 304.0, 1e-3);
                assert_approx_eq!(y, 200.0, 1e-3);
            }
            ref other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(sim.tick(), 1);
    }

    #[test]
    fn test_delta_is_measured_from_tick_completion() {
        let mut sim = seeded();
        let t0 = Instant::now();
        sim.start(t0);
        sim.state_mut().ball.velocity = Vector2::new(1.0, 0.0);

        sim.step(t0);
        sim.finish_tick(t0 + Duration::from_millis(3));
        let events = sim.step(t0 + Duration::from_millis(10));

        // 7ms at 400 px/s.
        match events[0] {
            ServerEvent::BallMove(Position { x, .. }) => assert_approx_eq!(x, 302.8, 1e-3),
            ref other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_stop_returns_to_idle_with_fresh_state() {
        let mut sim = seeded();
        sim.start(Instant::now());
        sim.state_mut().player_mut(Slot::Left).score = 5;
        sim.state_mut().set_paddle(Slot::Right, 12.0);

        sim.stop();

        assert_eq!(sim.phase(), Phase::Idle);
        assert_eq!(sim.state().scores(), Scores { p1: 0, p2: 0 });
        assert_eq!(sim.state().player(Slot::Right).paddle_y, PADDLE_START_Y);
        assert!(sim.step(Instant::now()).is_empty());
    }

    #[test]
    fn test_collision_runs_before_integration() {
        let mut sim = seeded();
        let t0 = Instant::now();
        sim.start(t0);
        {
            let state = sim.state_mut();
            state.ball.x = 5.0;
            state.ball.y = 100.0;
            state.ball.velocity = Vector2::new(-1.0, 0.0);
            state.set_paddle(Slot::Left, 70.0);
        }

        let events = sim.step(t0 + Duration::from_millis(10));

        // Bounced to x = 10, then moved 4px to the right.
        assert_eq!(events.len(), 1);
        match events[0] {
            ServerEvent::BallMove(Position { x, y }) => {
                assert_approx_eq!(x, 14.0, 1e-3);
                assert_approx_eq!(y, 100.0, 1e-3);
            }
            ref other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(sim.state().ball.velocity, Vector2::new(1.0, 0.0));
    }

    #[test]
    fn test_scoring_emits_score_change_then_new_round() {
        let mut sim = seeded();
        let t0 = Instant::now();
        sim.start(t0);
        {
            let state = sim.state_mut();
            state.player_mut(Slot::Left).score = 3;
            state.player_mut(Slot::Right).score = 2;
            state.set_paddle(Slot::Right, 0.0);
            state.ball.x = 598.0;
            state.ball.y = 200.0;
            state.ball.velocity = Vector2::new(1.0, 0.0);
        }

        // First tick carries the ball past the right edge.
        let events = sim.step(t0 + Duration::from_millis(10));
        assert_eq!(events.len(), 1);
        assert!(sim.state().ball.x > CANVAS_WIDTH);

        let events = sim.step(t0 + Duration::from_millis(20));
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], ServerEvent::ScoreChange(Scores { p1: 4, p2: 2 }));
        match events[1] {
            ServerEvent::NewRound(ball) => {
                assert_eq!(ball.x, 300.0);
                assert_eq!(ball.y, 200.0);
                assert!(ball.velocity.is_unit(1e-5));
            }
            ref other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(events[2], ServerEvent::BallMove(_)));
    }

    #[test]
    fn test_match_ends_when_score_reaches_threshold() {
        let mut sim = seeded();
        let t0 = Instant::now();
        sim.start(t0);
        sim.state_mut().player_mut(Slot::Left).score = 4;
        sim.state_mut().player_mut(Slot::Right).score = 7;

        let events = sim.step(t0 + Duration::from_millis(10));

        assert_eq!(events, vec![ServerEvent::GameEnd(2)]);
        assert_eq!(sim.phase(), Phase::Ended(Slot::Right));
        assert!(sim.step(t0 + Duration::from_millis(20)).is_empty());
    }

    #[test]
    fn test_match_does_not_end_below_threshold() {
        let mut sim = seeded();
        let t0 = Instant::now();
        sim.start(t0);
        sim.state_mut().player_mut(Slot::Left).score = 6;
        sim.state_mut().player_mut(Slot::Right).score = 6;

        let events = sim.step(t0 + Duration::from_millis(10));
        assert!(matches!(events.last(), Some(ServerEvent::BallMove(_))));
        assert!(sim.is_running());
    }

    #[test]
    fn test_full_match_terminates_with_higher_scorer() {
        let mut sim = seeded();
        let mut now = Instant::now();
        sim.start(now);
        // Paddles parked off-court so every rally ends in a point.
        sim.state_mut().set_paddle(Slot::Left, -1000.0);
        sim.state_mut().set_paddle(Slot::Right, -1000.0);

        let mut result = None;
        for _ in 0..100_000 {
            now += Duration::from_millis(10);
            let events = sim.step(now);
            for event in &events {
                if let ServerEvent::ScoreChange(scores) = event {
                    assert!(scores.p1 <= 7 && scores.p2 <= 7);
                }
                if let ServerEvent::GameEnd(winner) = event {
                    result = Some(*winner);
                }
            }
            if result.is_some() {
                break;
            }
            let ball = &sim.state().ball;
            assert!(ball.velocity.is_unit(1e-4));
            // Overshoot is bounded by two ticks of travel (a corner needs two passes).
            assert!(ball.y >= -8.5 && ball.y <= CANVAS_HEIGHT + 8.5);
            assert!(ball.x >= -8.5 && ball.x <= CANVAS_WIDTH + 8.5);
        }

        let winner = result.expect("match never ended");
        let Scores { p1, p2 } = sim.state().scores();
        assert_eq!(p1.max(p2), 7);
        assert_eq!(winner, if p1 > p2 { 1 } else { 2 });
    }

    #[test]
    fn test_restart_after_reset() {
        let mut sim = seeded();
        let t0 = Instant::now();
        sim.start(t0);
        sim.state_mut().player_mut(Slot::Left).score = 4;
        sim.state_mut().player_mut(Slot::Right).score = 6;
        sim.state_mut().set_paddle(Slot::Left, 20.0);

        sim.reset();
        let event = sim.start(t0 + Duration::from_millis(5));

        assert_eq!(event, ServerEvent::GameStart(COURT_CENTER));
        assert_eq!(sim.state().scores(), Scores { p1: 0, p2: 0 });
        assert_eq!(sim.state().player(Slot::Left).paddle_y, PADDLE_START_Y);
        assert_eq!(sim.state().player(Slot::Right).paddle_y, PADDLE_START_Y);
    }

    #[test]
    fn test_throttle_delay() {
        let target = Duration::from_millis(10);
        assert_eq!(throttle_delay(target, Duration::from_millis(3)), Duration::from_millis(7));
        assert_eq!(throttle_delay(target, Duration::from_millis(10)), MIN_TICK_SLEEP);
        assert_eq!(throttle_delay(target, Duration::from_millis(25)), MIN_TICK_SLEEP);
        assert_eq!(throttle_delay(target, Duration::ZERO), target);
    }
}
