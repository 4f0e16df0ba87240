//! # Pong Match Server Library
//!
//! This library provides the authoritative server for a two-player pong
//! match. It owns the canonical ball and paddle state, resolves collisions,
//! advances the simulation on a fixed cadence and streams the results to
//! both connected clients.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! The server runs the only copy of the ball physics. Clients render what
//! the server reports and only ever contribute their own paddle position.
//!
//! ### Session Management
//! Incoming connections are seated in one of two fixed slots (left, then
//! right). A third connection is closed straight away. Paddle moves from a
//! seated connection are applied as reported and relayed to the opponent.
//!
//! ### State Broadcasting
//! Every tick the ball position is sent to all clients; scoring, new
//! rounds, match start and match end are announced as separate events.
//!
//! ## Architecture Design
//!
//! ### Single Owner Task
//! The match state, the slot table and the simulation live inside one task
//! (`Server::run`). Connection tasks talk to it over channels, so every
//! mutation is serialized without locks around the game state.
//!
//! ### WebSocket Transport
//! Each client gets one WebSocket connection carrying JSON text frames of
//! the form `{"event": name, "data": payload}`; see `pong_shared::protocol`.
//!
//! ## Module Organization
//!
//! - `config`: runtime tunables and the disconnect policy
//! - `game`: match state, players, ball and reset semantics
//! - `physics`: launch directions and the collision resolver
//! - `simulation`: the tick state machine and loop throttling
//! - `session`: slot assignment for the two seats
//! - `controller`: glue between sessions, simulation and outbound events
//! - `network`: sockets, per-connection tasks and the server loop
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use pong_server::config::MatchConfig;
//! use pong_server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     // Bind the listener; the match starts once two clients have joined.
//!     let mut server = Server::new("127.0.0.1:3000", MatchConfig::default()).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod controller;
pub mod game;
pub mod network;
pub mod physics;
pub mod session;
pub mod simulation;
