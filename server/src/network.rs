//! Server network layer handling WebSocket sessions and game loop coordination

use crate::connections::{ConnectionRegistry, ConnectionSender};
use crate::game::GameWorld;
use crate::router;
use crate::utils::now_ms;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::ClientEvent;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

/// Messages sent from connection tasks to the main server loop
#[derive(Debug)]
pub enum SessionMessage {
    Connected {
        id: String,
        sender: ConnectionSender,
    },
    Inbound {
        id: String,
        event: ClientEvent,
    },
    Closed {
        id: String,
    },
}

/// Counters the auxiliary HTTP surface reads. The game loop refreshes them;
/// nothing else writes.
#[derive(Debug, Default)]
pub struct ServerStats {
    pub players: AtomicUsize,
    pub projectiles: AtomicUsize,
    pub started_at_ms: AtomicU64,
}

/// Main server coordinating session handling and the fixed-rate simulation.
///
/// The world state and connection registry are owned by this struct and only
/// ever touched from [`Server::run`]'s loop: connection tasks funnel joins,
/// inbound events and disconnects through one queue, and the tick interval
/// fires on the same `select!`. No lock is held anywhere, and a disconnect
/// cannot race the collision scan.
pub struct Server {
    listener: Arc<TcpListener>,
    world: GameWorld,
    registry: ConnectionRegistry,
    tick_duration: Duration,
    max_clients: usize,
    stats: Arc<ServerStats>,

    session_tx: mpsc::UnboundedSender<SessionMessage>,
    session_rx: mpsc::UnboundedReceiver<SessionMessage>,
}

impl Server {
    pub async fn bind(
        addr: &str,
        tick_duration: Duration,
        max_clients: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = Arc::new(TcpListener::bind(addr).await?);
        info!("Server listening on {}", listener.local_addr()?);

        let (session_tx, session_rx) = mpsc::unbounded_channel();
        let world = GameWorld::new(now_ms());
        let stats = Arc::new(ServerStats::default());
        stats.started_at_ms.store(world.started_at, Ordering::Relaxed);

        Ok(Server {
            listener,
            world,
            registry: ConnectionRegistry::new(),
            tick_duration,
            max_clients,
            stats,
            session_tx,
            session_rx,
        })
    }

    /// Address the game socket actually bound to (useful with port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle for the HTTP surface.
    pub fn stats(&self) -> Arc<ServerStats> {
        Arc::clone(&self.stats)
    }

    /// Spawns the task that accepts sockets and hands each one a session task.
    fn spawn_acceptor(&self) {
        let listener = Arc::clone(&self.listener);
        let session_tx = self.session_tx.clone();
        let stats = Arc::clone(&self.stats);
        let max_clients = self.max_clients;

        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        if stats.players.load(Ordering::Relaxed) >= max_clients {
                            warn!("Refusing connection from {}: server full", addr);
                            continue;
                        }
                        tokio::spawn(handle_connection(stream, addr, session_tx.clone()));
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Main server loop coordinating session traffic and simulation ticks
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_acceptor();

        let mut tick_interval = interval(self.tick_duration);
        // A slow tick delays the next one; two ticks never run back-to-back
        // in the same period, let alone concurrently.
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Server started successfully");

        loop {
            tokio::select! {
                message = self.session_rx.recv() => {
                    match message {
                        Some(message) => self.handle_session_message(message),
                        None => {
                            info!("Session channel closed, shutting down");
                            break;
                        }
                    }
                },
                _ = tick_interval.tick() => {
                    self.run_tick();
                },
            }
        }

        Ok(())
    }

    fn handle_session_message(&mut self, message: SessionMessage) {
        let now = now_ms();
        let outbound = match message {
            SessionMessage::Connected { id, sender } => {
                self.registry.insert(&id, sender);
                router::on_join(&mut self.world, &id, now)
            }
            SessionMessage::Inbound { id, event } => {
                router::on_client_event(&mut self.world, &id, event, now)
            }
            SessionMessage::Closed { id } => {
                self.registry.remove(&id);
                router::on_disconnect(&mut self.world, &id)
            }
        };

        for item in &outbound {
            self.registry.dispatch(item);
        }
        self.refresh_stats();
    }

    /// One simulation step: delta events first, then the unconditional
    /// snapshot, so a hit is never heard after the state that reflects it.
    fn run_tick(&mut self) {
        let now = now_ms();
        for event in self.world.tick(now) {
            self.registry.broadcast(&event);
        }
        self.registry.broadcast(&self.world.snapshot(now));
        self.refresh_stats();
    }

    fn refresh_stats(&self) {
        self.stats
            .players
            .store(self.world.players.len(), Ordering::Relaxed);
        self.stats
            .projectiles
            .store(self.world.projectiles.len(), Ordering::Relaxed);
    }
}

/// Per-connection task: WebSocket handshake, session id assignment, then a
/// read loop feeding the session queue while a writer task drains outbound
/// messages. Malformed frames are dropped where they land; only socket
/// close or error ends the session.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    session_tx: mpsc::UnboundedSender<SessionMessage>,
) {
    let ws = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake failed for {}: {}", addr, e);
            return;
        }
    };

    let id = Uuid::new_v4().to_string();
    info!("Player connected: {} ({})", id, addr);

    let (mut sink, mut ws_stream) = ws.split();
    let (sender, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    let writer_id = id.clone();
    let writer = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if let Err(e) = sink.send(message).await {
                debug!("Writer for session {} stopped: {}", writer_id, e);
                break;
            }
        }
    });

    if session_tx
        .send(SessionMessage::Connected {
            id: id.clone(),
            sender,
        })
        .is_err()
    {
        writer.abort();
        return;
    }

    while let Some(frame) = ws_stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => {
                    if session_tx
                        .send(SessionMessage::Inbound {
                            id: id.clone(),
                            event,
                        })
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Ignoring malformed event from {}: {}", id, e);
                }
            },
            Ok(Message::Close(_)) => break,
            // Pings are answered by tungstenite itself; binary is not part
            // of the protocol.
            Ok(_) => {}
            Err(e) => {
                debug!("Connection error for {}: {}", id, e);
                break;
            }
        }
    }

    let _ = session_tx.send(SessionMessage::Closed { id: id.clone() });
    writer.abort();
    info!("Player disconnected: {}", id);
}
