//! Player slot management for the two-seat match.
//!
//! This module binds incoming connections to the two fixed player slots:
//! - First free slot wins, left before right
//! - A third connection is refused while both slots are bound
//! - Disconnects either free the slot or leave it bound, per [`DisconnectPolicy`]
//!
//! The session manager never touches the match state itself; the controller
//! uses the slot it reports to route paddle moves.

use crate::config::DisconnectPolicy;
use crate::game::Slot;
use log::{info, warn};
use thiserror::Error;

/// Identifier handed out by the network layer to each accepted socket.
pub type ConnectionId = u32;

/// Binding of one player slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotState {
    #[default]
    Unassigned,
    Occupied(ConnectionId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Both slots are bound; the connection must be closed.
    #[error("both player slots are taken")]
    Full,
    #[error("connection {0} holds no player slot")]
    UnknownConnection(ConnectionId),
}

/// Tracks which connection plays which slot.
pub struct SessionManager {
    slots: [SlotState; 2],
    policy: DisconnectPolicy,
}

impl SessionManager {
    pub fn new(policy: DisconnectPolicy) -> Self {
        Self {
            slots: [SlotState::Unassigned; 2],
            policy,
        }
    }

    /// Binds `connection` to the first free slot, left before right.
    pub fn assign(&mut self, connection: ConnectionId) -> Result<Slot, SessionError> {
        if let Some(slot) = self.slot_of(connection) {
            return Ok(slot);
        }

        let slot = Slot::ALL
            .into_iter()
            .find(|slot| self.slots[slot.index()] == SlotState::Unassigned)
            .ok_or(SessionError::Full)?;

        self.slots[slot.index()] = SlotState::Occupied(connection);
        info!(
            "Connection {} assigned to player {}",
            connection,
            slot.number()
        );
        Ok(slot)
    }

    /// Handles a closed connection according to the disconnect policy.
    ///
    /// Returns the slot the connection held, whether or not it was freed.
    pub fn release(&mut self, connection: ConnectionId) -> Result<Slot, SessionError> {
        let slot = self
            .slot_of(connection)
            .ok_or(SessionError::UnknownConnection(connection))?;

        match self.policy {
            DisconnectPolicy::FreeSlot => {
                self.slots[slot.index()] = SlotState::Unassigned;
                info!("Player {} left, slot is open", slot.number());
            }
            DisconnectPolicy::KeepSlot => {
                warn!(
                    "Player {} left, slot stays bound to closed connection {}",
                    slot.number(),
                    connection
                );
            }
        }
        Ok(slot)
    }

    pub fn slot_of(&self, connection: ConnectionId) -> Option<Slot> {
        Slot::ALL
            .into_iter()
            .find(|slot| self.slots[slot.index()] == SlotState::Occupied(connection))
    }

    /// Connection bound to the other slot, if any.
    pub fn opponent_of(&self, connection: ConnectionId) -> Option<ConnectionId> {
        let slot = self.slot_of(connection)?;
        match self.slots[slot.opponent().index()] {
            SlotState::Occupied(id) => Some(id),
            SlotState::Unassigned => None,
        }
    }

    pub fn state(&self, slot: Slot) -> SlotState {
        self.slots[slot.index()]
    }

    /// True once both slots are bound.
    pub fn is_full(&self) -> bool {
        self.slots
            .iter()
            .all(|state| matches!(state, SlotState::Occupied(_)))
    }

    /// True when no slot is bound to any connection.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|state| *state == SlotState::Unassigned)
    }

    pub fn policy(&self) -> DisconnectPolicy {
        self.policy
    }
}
