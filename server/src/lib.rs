//! # Arena Game Server Library
//!
//! Authoritative server for the multiplayer arena shooter. It owns the
//! canonical world state (players and in-flight projectiles), resolves hits,
//! deaths and respawns on a fixed simulation tick, and keeps every connected
//! client synchronized through full snapshots and targeted delta events.
//!
//! ## Architecture
//!
//! ### Single-Writer Game Loop
//! All world mutation happens on one task. Connection tasks never touch
//! state directly: joins, inbound events and disconnects travel through a
//! single message queue into the main loop, which also drives the tick
//! interval from the same `select!`. There are no locks to hold and no
//! ordering hazards between a disconnect and an in-progress collision scan.
//!
//! ### WebSocket Communication
//! Each client holds one persistent WebSocket connection carrying JSON
//! events in both directions. Outbound traffic goes through an unbounded
//! per-connection queue drained by a dedicated writer task, so a slow or
//! vanished client never stalls the simulation or the rest of a broadcast.
//!
//! ### Trust Model
//! Movement is client-reported and overwritten verbatim; combat is not.
//! Hits, damage, deaths, kill/death counters and respawns are computed
//! exclusively by the server's tick, and projectile ids are assigned
//! server-side from a monotonic counter.
//!
//! ## Module Organization
//!
//! - [`game`]: world state and the simulation tick (projectile expiry,
//!   collision resolution, death transitions, respawns, snapshots)
//! - [`router`]: pure handlers mapping each inbound message kind to world
//!   mutations plus the outbound events and their targets
//! - [`connections`]: live connection registry and best-effort broadcast
//!   fan-out
//! - [`network`]: WebSocket accept loop, per-session tasks, and the main
//!   server loop coordinating queue traffic with the tick interval
//! - [`http`]: auxiliary liveness/stats endpoints
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 60 Hz simulation, up to 32 concurrent players
//!     let mut server = Server::bind(
//!         "127.0.0.1:8080",
//!         Duration::from_secs_f64(1.0 / 60.0),
//!         32,
//!     ).await?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod connections;
pub mod game;
pub mod http;
pub mod network;
pub mod router;
pub mod utils;
