//! Live connection bookkeeping and broadcast fan-out.

use crate::router::{Outbound, Target};
use log::{debug, warn};
use shared::ServerEvent;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Sender half of a connection's outbound queue. The queue drains in a
/// per-connection writer task, so pushing here never blocks the game loop.
pub type ConnectionSender = mpsc::UnboundedSender<Message>;

/// The live set of connections keyed by session id.
///
/// Sends are best-effort: a recipient that disconnected mid-broadcast just
/// has its closed channel skipped, and the fan-out continues. Stale registry
/// entries are cleaned up when the session's `Closed` message arrives.
pub struct ConnectionRegistry {
    connections: HashMap<String, ConnectionSender>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    pub fn insert(&mut self, session_id: &str, sender: ConnectionSender) {
        self.connections.insert(session_id.to_string(), sender);
    }

    pub fn remove(&mut self, session_id: &str) -> bool {
        self.connections.remove(session_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Routes one outbound item to its target set.
    pub fn dispatch(&self, outbound: &Outbound) {
        match &outbound.target {
            Target::All => self.broadcast(&outbound.event),
            Target::AllExcept(id) => self.broadcast_except(id, &outbound.event),
            Target::One(id) => self.send_to(id, &outbound.event),
        }
    }

    pub fn send_to(&self, session_id: &str, event: &ServerEvent) {
        let Some(text) = encode(event) else { return };
        if let Some(sender) = self.connections.get(session_id) {
            push(session_id, sender, &text);
        }
    }

    pub fn broadcast(&self, event: &ServerEvent) {
        let Some(text) = encode(event) else { return };
        for (session_id, sender) in &self.connections {
            push(session_id, sender, &text);
        }
    }

    pub fn broadcast_except(&self, exclude: &str, event: &ServerEvent) {
        let Some(text) = encode(event) else { return };
        for (session_id, sender) in &self.connections {
            if session_id == exclude {
                continue;
            }
            push(session_id, sender, &text);
        }
    }
}

fn encode(event: &ServerEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("Failed to serialize event: {}", e);
            None
        }
    }
}

fn push(session_id: &str, sender: &ConnectionSender, text: &str) {
    if sender.send(Message::Text(text.to_string())).is_err() {
        debug!("Skipping send to closed session {}", session_id);
    }
}
