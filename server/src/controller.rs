//! Match controller: turns connection events and timer ticks into state
//! changes and outbound messages.
//!
//! The controller is owned by the server task and is the only code that
//! mutates the match, which keeps every change serialized without locks.

use crate::config::MatchConfig;
use crate::network::GameMessage;
use crate::session::{ConnectionId, SessionError, SessionManager};
use crate::simulation::{Phase, Simulation};
use log::{debug, info};
use pong_shared::{ClientEvent, ServerEvent};
use std::time::Instant;

pub struct MatchController {
    sessions: SessionManager,
    simulation: Simulation,
}

fn broadcast(event: ServerEvent) -> GameMessage {
    GameMessage::BroadcastEvent {
        event,
        exclude: None,
    }
}

impl MatchController {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            sessions: SessionManager::new(config.disconnect_policy),
            simulation: Simulation::new(config),
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }

    pub fn is_running(&self) -> bool {
        self.simulation.is_running()
    }

    /// Seats a new connection.
    ///
    /// The connection learns its slot first. Once both slots are taken and
    /// no match is in progress, a fresh match starts for everyone.
    pub fn on_connect(
        &mut self,
        client_id: ConnectionId,
        now: Instant,
    ) -> Result<Vec<GameMessage>, SessionError> {
        let slot = self.sessions.assign(client_id)?;

        let mut messages = vec![GameMessage::SendEvent {
            client_id,
            event: ServerEvent::PlayerSelected(slot.number()),
        }];

        if self.sessions.is_full() && !self.simulation.is_running() {
            if self.simulation.phase() != Phase::Idle {
                self.simulation.reset();
            }
            messages.push(broadcast(self.simulation.start(now)));
        }

        Ok(messages)
    }

    /// Applies an inbound event. Events from connections without a slot are
    /// ignored.
    pub fn on_event(
        &mut self,
        client_id: ConnectionId,
        event: ClientEvent,
        now: Instant,
    ) -> Vec<GameMessage> {
        let Some(slot) = self.sessions.slot_of(client_id) else {
            debug!("Ignoring {:?} from unseated connection {}", event, client_id);
            return Vec::new();
        };

        match event {
            ClientEvent::Move(y) => {
                self.simulation.state_mut().set_paddle(slot, y);
                vec![GameMessage::BroadcastEvent {
                    event: ServerEvent::UpdatePaddle(y),
                    exclude: Some(client_id),
                }]
            }
            ClientEvent::RestartGame => {
                info!("Player {} requested a restart", slot.number());
                self.simulation.reset();
                vec![broadcast(self.simulation.start(now))]
            }
        }
    }

    /// Handles a closed connection. The match keeps running while anyone is
    /// still seated; once every slot is free it is stopped and reset.
    pub fn on_disconnect(&mut self, client_id: ConnectionId) {
        if let Err(e) = self.sessions.release(client_id) {
            debug!("Disconnect of {}: {}", client_id, e);
            return;
        }
        if self.sessions.is_empty() {
            self.simulation.stop();
        }
    }

    /// Runs one simulation tick and wraps its events for broadcast.
    pub fn on_tick(&mut self, now: Instant) -> Vec<GameMessage> {
        self.simulation.step(now).into_iter().map(broadcast).collect()
    }

    /// Records when the current tick's events were handed off.
    pub fn finish_tick(&mut self, now: Instant) {
        self.simulation.finish_tick(now);
    }
}
