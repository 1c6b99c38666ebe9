//! Translates inbound session traffic into world mutations and outbound events.
//!
//! One function per inbound message kind; each returns the set of events to
//! dispatch together with their targets. The handlers never touch a socket.

use crate::game::GameWorld;
use shared::{ClientEvent, ServerEvent, Vec3};

/// Who an outbound event is addressed to.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    All,
    AllExcept(String),
    One(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub target: Target,
    pub event: ServerEvent,
}

/// A new session: allocate the player, send the joiner the full snapshot,
/// and tell everyone else about the new arrival.
pub fn on_join(world: &mut GameWorld, session_id: &str, now: u64) -> Vec<Outbound> {
    let player = world.add_player(session_id, now);
    vec![
        Outbound {
            target: Target::One(session_id.to_string()),
            event: world.snapshot(now),
        },
        Outbound {
            target: Target::AllExcept(session_id.to_string()),
            event: ServerEvent::PlayerJoined { player },
        },
    ]
}

pub fn on_client_event(
    world: &mut GameWorld,
    session_id: &str,
    event: ClientEvent,
    now: u64,
) -> Vec<Outbound> {
    match event {
        ClientEvent::PlayerUpdate { position, rotation } => {
            on_player_update(world, session_id, position, rotation, now)
        }
        ClientEvent::Shoot {
            position,
            direction,
            speed,
        } => on_shoot(world, session_id, position, direction, speed, now),
    }
}

/// Movement is rebroadcast to everyone but the sender; never echoed.
fn on_player_update(
    world: &mut GameWorld,
    session_id: &str,
    position: Option<Vec3>,
    rotation: Option<Vec3>,
    now: u64,
) -> Vec<Outbound> {
    match world.apply_movement(session_id, position, rotation, now) {
        Some((position, rotation)) => vec![Outbound {
            target: Target::AllExcept(session_id.to_string()),
            event: ServerEvent::PlayerUpdate {
                id: session_id.to_string(),
                position,
                rotation,
            },
        }],
        None => Vec::new(),
    }
}

/// Shots go to everyone including the shooter, carrying the server-assigned
/// projectile id the later hit event will reference.
fn on_shoot(
    world: &mut GameWorld,
    session_id: &str,
    position: Option<Vec3>,
    direction: Option<Vec3>,
    speed: Option<f32>,
    now: u64,
) -> Vec<Outbound> {
    let projectile = world.spawn_projectile(
        session_id,
        position.unwrap_or([0.0, 0.0, 0.0]),
        direction.unwrap_or([0.0, 0.0, 0.0]),
        speed.unwrap_or(0.0),
        now,
    );
    match projectile {
        Some(projectile) => vec![Outbound {
            target: Target::All,
            event: ServerEvent::BulletFired { projectile },
        }],
        None => Vec::new(),
    }
}

/// The record goes away immediately; in-flight projectiles it owned are left
/// to the lifetime cutoff.
pub fn on_disconnect(world: &mut GameWorld, session_id: &str) -> Vec<Outbound> {
    if world.remove_player(session_id) {
        vec![Outbound {
            target: Target::All,
            event: ServerEvent::PlayerLeft {
                id: session_id.to_string(),
            },
        }]
    } else {
        Vec::new()
    }
}
