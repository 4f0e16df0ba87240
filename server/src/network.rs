//! Server network layer handling WebSocket connections and game loop coordination

use crate::config::MatchConfig;
use crate::controller::MatchController;
use crate::session::ConnectionId;
use crate::simulation::throttle_delay;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use pong_shared::{ClientEvent, ProtocolError, ServerEvent};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::time::{sleep_until, Instant};
use tokio_tungstenite::tungstenite::Message;

pub type ServerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Messages sent from network tasks to main server loop
#[derive(Debug)]
pub enum ServerMessage {
    /// A WebSocket handshake completed. The server answers on `admit` with
    /// whether the connection got a player slot.
    Connected {
        client_id: ConnectionId,
        addr: SocketAddr,
        outbound: mpsc::UnboundedSender<Message>,
        admit: oneshot::Sender<bool>,
    },
    EventReceived {
        client_id: ConnectionId,
        event: ClientEvent,
    },
    Disconnected {
        client_id: ConnectionId,
    },
}

/// Messages sent from game loop to network tasks
#[derive(Debug)]
pub enum GameMessage {
    SendEvent {
        client_id: ConnectionId,
        event: ServerEvent,
    },
    BroadcastEvent {
        event: ServerEvent,
        exclude: Option<ConnectionId>,
    },
}

/// Outbound mailboxes of every admitted connection.
#[derive(Default)]
pub struct PeerRegistry {
    peers: HashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
}

impl PeerRegistry {
    pub fn insert(&mut self, client_id: ConnectionId, outbound: mpsc::UnboundedSender<Message>) {
        self.peers.insert(client_id, outbound);
    }

    pub fn remove(&mut self, client_id: ConnectionId) -> bool {
        self.peers.remove(&client_id).is_some()
    }

    /// Queues a frame for one connection. Returns false if it is gone.
    pub fn send_to(&self, client_id: ConnectionId, frame: Message) -> bool {
        match self.peers.get(&client_id) {
            Some(outbound) => outbound.send(frame).is_ok(),
            None => false,
        }
    }

    /// Queues a frame for every connection except `exclude`. Returns the
    /// number of connections reached.
    pub fn broadcast(&self, frame: &Message, exclude: Option<ConnectionId>) -> usize {
        let mut reached = 0;
        for (id, outbound) in &self.peers {
            if Some(*id) == exclude {
                continue;
            }
            if outbound.send(frame.clone()).is_ok() {
                reached += 1;
            } else {
                debug!("Mailbox of connection {} is closed", id);
            }
        }
        reached
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

/// Main server coordinating networking and game simulation
pub struct Server {
    listener: Option<TcpListener>,
    local_addr: SocketAddr,
    peers: Arc<RwLock<PeerRegistry>>,
    controller: MatchController,
    tick_duration: Duration,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    game_tx: mpsc::UnboundedSender<GameMessage>,
    game_rx: Option<mpsc::UnboundedReceiver<GameMessage>>,
}

impl Server {
    pub async fn new(addr: &str, config: MatchConfig) -> ServerResult<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Server listening on {}", local_addr);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (game_tx, game_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener: Some(listener),
            local_addr,
            peers: Arc::new(RwLock::new(PeerRegistry::default())),
            tick_duration: config.tick_interval(),
            controller: MatchController::new(config),
            server_tx,
            server_rx,
            game_tx,
            game_rx: Some(game_rx),
        })
    }

    /// Address the server is actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Spawns task that accepts TCP connections and upgrades them
    fn spawn_acceptor(&mut self) -> ServerResult<()> {
        let listener = self
            .listener
            .take()
            .ok_or("acceptor already running")?;
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut next_client_id: ConnectionId = 1;

            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        let client_id = next_client_id;
                        next_client_id = next_client_id.wrapping_add(1);
                        tokio::spawn(handle_connection(
                            stream,
                            addr,
                            client_id,
                            server_tx.clone(),
                        ));
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
                if server_tx.is_closed() {
                    break;
                }
            }
        });
        Ok(())
    }

    /// Spawns task that processes the outgoing event queue
    fn spawn_network_sender(&mut self) -> ServerResult<()> {
        let peers = Arc::clone(&self.peers);
        let mut game_rx = self.game_rx.take().ok_or("sender already running")?;

        tokio::spawn(async move {
            while let Some(message) = game_rx.recv().await {
                match message {
                    GameMessage::SendEvent { client_id, event } => {
                        let Some(frame) = encode(&event) else { continue };
                        if !peers.read().await.send_to(client_id, frame) {
                            warn!("Dropped {} for connection {}", event.name(), client_id);
                        }
                    }
                    GameMessage::BroadcastEvent { event, exclude } => {
                        let Some(frame) = encode(&event) else { continue };
                        peers.read().await.broadcast(&frame, exclude);
                    }
                }
            }
        });
        Ok(())
    }

    fn dispatch(&self, messages: Vec<GameMessage>) {
        for message in messages {
            if let Err(e) = self.game_tx.send(message) {
                error!("Failed to queue outbound event: {}", e);
            }
        }
    }

    /// Processes messages from connection tasks
    async fn handle_message(&mut self, message: ServerMessage) {
        let now = std::time::Instant::now();
        match message {
            ServerMessage::Connected {
                client_id,
                addr,
                outbound,
                admit,
            } => match self.controller.on_connect(client_id, now) {
                Ok(messages) => {
                    info!("Client {} connected from {}", client_id, addr);
                    self.peers.write().await.insert(client_id, outbound);
                    let _ = admit.send(true);
                    self.dispatch(messages);
                }
                Err(e) => {
                    warn!("Rejecting client {} from {}: {}", client_id, addr, e);
                    let _ = admit.send(false);
                }
            },

            ServerMessage::EventReceived { client_id, event } => {
                let messages = self.controller.on_event(client_id, event, now);
                self.dispatch(messages);
            }

            ServerMessage::Disconnected { client_id } => {
                if self.peers.write().await.remove(client_id) {
                    info!("Client {} disconnected", client_id);
                    self.controller.on_disconnect(client_id);
                }
            }
        }
    }

    /// Main server loop coordinating all operations
    pub async fn run(&mut self) -> ServerResult<()> {
        // Initialize concurrent tasks
        self.spawn_acceptor()?;
        self.spawn_network_sender()?;

        let mut next_tick = Instant::now();

        info!("Server started successfully");

        loop {
            let running = self.controller.is_running();

            tokio::select! {
                // Handle network events
                message = self.server_rx.recv() => {
                    match message {
                        None => {
                            info!("Server shutting down");
                            break;
                        }
                        Some(message) => {
                            let was_running = running;
                            self.handle_message(message).await;
                            if !was_running && self.controller.is_running() {
                                next_tick = Instant::now();
                            }
                        }
                    }
                },

                // Handle server tick events
                _ = sleep_until(next_tick), if running => {
                    let started = Instant::now();
                    let messages = self.controller.on_tick(started.into_std());
                    self.dispatch(messages);
                    self.controller.finish_tick(std::time::Instant::now());

                    let tick = self.controller.simulation().tick();
                    if tick % 500 == 0 {
                        let client_count = self.peers.read().await.len();
                        let scores = self.controller.simulation().state().scores();
                        debug!("Tick {}: {} clients, score {}-{}",
                               tick, client_count, scores.p1, scores.p2);
                    }

                    next_tick = Instant::now() + throttle_delay(self.tick_duration, started.elapsed());
                },
            }
        }

        Ok(())
    }
}

fn encode(event: &ServerEvent) -> Option<Message> {
    match event.to_json() {
        Ok(text) => Some(Message::Text(text)),
        Err(e) => {
            error!("Failed to encode {}: {}", event.name(), e);
            None
        }
    }
}

fn decode(frame: &Message) -> Result<Option<ClientEvent>, ProtocolError> {
    match frame {
        Message::Text(text) => ClientEvent::from_json(text).map(Some),
        Message::Binary(_) => Err(ProtocolError::UnsupportedFrame("binary")),
        _ => Ok(None),
    }
}

/// Per-connection task: handshake, admission, then pumps frames both ways
/// until either side closes.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    client_id: ConnectionId,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
) {
    let ws = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake with {} failed: {}", addr, e);
            return;
        }
    };
    let (mut sink, mut frames) = ws.split();

    let (outbound, mut mailbox) = mpsc::unbounded_channel::<Message>();
    let (admit, admitted) = oneshot::channel();
    let connected = ServerMessage::Connected {
        client_id,
        addr,
        outbound,
        admit,
    };
    if server_tx.send(connected).is_err() {
        return;
    }

    if !admitted.await.unwrap_or(false) {
        let _ = sink.close().await;
        return;
    }

    let writer = tokio::spawn(async move {
        while let Some(frame) = mailbox.recv().await {
            if sink.send(frame).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(frame) = frames.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                debug!("Connection {} read error: {}", client_id, e);
                break;
            }
        };
        if frame.is_close() {
            break;
        }
        match decode(&frame) {
            Ok(Some(event)) => {
                if server_tx
                    .send(ServerMessage::EventReceived { client_id, event })
                    .is_err()
                {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Dropping message from client {}: {}", client_id, e),
        }
    }

    let _ = server_tx.send(ServerMessage::Disconnected { client_id });
    writer.abort();
}
