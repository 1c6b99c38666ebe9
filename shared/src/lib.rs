use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const TICK_RATE: u32 = 60;
pub const MAX_HEALTH: i32 = 100;
pub const HIT_DAMAGE: i32 = 25;
pub const HIT_RADIUS: f32 = 1.0;
pub const PROJECTILE_LIFETIME_MS: u64 = 5000;
pub const RESPAWN_DELAY_MS: u64 = 3000;
pub const SPAWN_EXTENT: f32 = 15.0;
pub const SPAWN_HEIGHT: f32 = 1.0;

/// Positions, rotations and directions travel as plain JSON arrays.
pub type Vec3 = [f32; 3];

pub fn distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

pub fn normalize(v: Vec3) -> Vec3 {
    let magnitude = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if magnitude > 0.0 {
        [v[0] / magnitude, v[1] / magnitude, v[2] / magnitude]
    } else {
        [0.0, 0.0, 0.0]
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub health: i32,
    pub kills: u32,
    pub deaths: u32,
    pub is_alive: bool,
    pub last_update: u64,
}

impl Player {
    pub fn new(id: String, position: Vec3, now: u64) -> Self {
        Self {
            id,
            position,
            rotation: [0.0, 0.0, 0.0],
            health: MAX_HEALTH,
            kills: 0,
            deaths: 0,
            is_alive: true,
            last_update: now,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Projectile {
    pub id: u64,
    pub position: Vec3,
    pub direction: Vec3,
    pub player_id: String,
    pub speed: f32,
    pub created_at: u64,
}

impl Projectile {
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }
}

/// Messages a client may send. Every field is optional on the wire; absent
/// values fall back to the previous state (updates) or to zero (shots).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    PlayerUpdate {
        #[serde(default)]
        position: Option<Vec3>,
        #[serde(default)]
        rotation: Option<Vec3>,
    },
    Shoot {
        #[serde(default)]
        position: Option<Vec3>,
        #[serde(default)]
        direction: Option<Vec3>,
        #[serde(default)]
        speed: Option<f32>,
    },
}

/// Messages the server emits: the periodic snapshot plus targeted deltas
/// for joins, leaves, movement, shots, hits, deaths and respawns.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    GameState {
        players: HashMap<String, Player>,
        projectile_count: usize,
        timestamp: u64,
    },
    PlayerJoined {
        player: Player,
    },
    PlayerLeft {
        id: String,
    },
    PlayerUpdate {
        id: String,
        position: Vec3,
        rotation: Vec3,
    },
    BulletFired {
        projectile: Projectile,
    },
    #[serde(rename_all = "camelCase")]
    BulletHit {
        bullet_id: u64,
        player_id: String,
        new_health: i32,
        damage: i32,
    },
    #[serde(rename_all = "camelCase")]
    PlayerDied {
        player_id: String,
        killer_id: String,
        kills: u32,
        deaths: u32,
    },
    #[serde(rename_all = "camelCase")]
    PlayerRespawned {
        id: String,
        position: Vec3,
        health: i32,
        is_alive: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_distance() {
        assert_approx_eq!(distance([0.0, 0.0, 0.0], [0.0, 0.0, 0.5]), 0.5);
        assert_approx_eq!(distance([1.0, 2.0, 3.0], [1.0, 2.0, 3.0]), 0.0);
        assert_approx_eq!(distance([0.0, 0.0, 0.0], [1.0, 2.0, 2.0]), 3.0);
    }

    #[test]
    fn test_normalize() {
        let n = normalize([0.0, 0.0, 10.0]);
        assert_approx_eq!(n[2], 1.0);

        let n = normalize([3.0, 0.0, 4.0]);
        assert_approx_eq!(n[0], 0.6);
        assert_approx_eq!(n[2], 0.8);
    }

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(normalize([0.0, 0.0, 0.0]), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_player_starts_alive_with_full_health() {
        let player = Player::new("abc".to_string(), [1.0, 1.0, -3.0], 1000);
        assert_eq!(player.health, MAX_HEALTH);
        assert!(player.is_alive);
        assert_eq!(player.kills, 0);
        assert_eq!(player.deaths, 0);
        assert_eq!(player.last_update, 1000);
    }

    #[test]
    fn test_projectile_age() {
        let projectile = Projectile {
            id: 1,
            position: [0.0, 1.0, 0.0],
            direction: [0.0, 0.0, 1.0],
            player_id: "abc".to_string(),
            speed: 50.0,
            created_at: 2000,
        };
        assert_eq!(projectile.age_ms(7001), 5001);
        // A clock that moved backwards must not underflow.
        assert_eq!(projectile.age_ms(1000), 0);
    }

    #[test]
    fn test_player_wire_format_is_camel_case() {
        let player = Player::new("p1".to_string(), [1.0, 1.0, 0.0], 42);
        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json["isAlive"], true);
        assert_eq!(json["lastUpdate"], 42);
        assert_eq!(json["position"][0], 1.0);
    }

    #[test]
    fn test_bullet_hit_wire_format() {
        let event = ServerEvent::BulletHit {
            bullet_id: 7,
            player_id: "victim".to_string(),
            new_health: 75,
            damage: 25,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "bulletHit");
        assert_eq!(json["data"]["bulletId"], 7);
        assert_eq!(json["data"]["playerId"], "victim");
        assert_eq!(json["data"]["newHealth"], 75);
        assert_eq!(json["data"]["damage"], 25);
    }

    #[test]
    fn test_player_died_wire_format() {
        let event = ServerEvent::PlayerDied {
            player_id: "victim".to_string(),
            killer_id: "shooter".to_string(),
            kills: 3,
            deaths: 1,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "playerDied");
        assert_eq!(json["data"]["killerId"], "shooter");
        assert_eq!(json["data"]["kills"], 3);
    }

    #[test]
    fn test_game_state_wire_format() {
        let mut players = HashMap::new();
        players.insert(
            "p1".to_string(),
            Player::new("p1".to_string(), [0.0, 1.0, 0.0], 5),
        );
        let event = ServerEvent::GameState {
            players,
            projectile_count: 2,
            timestamp: 99,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "gameState");
        assert_eq!(json["data"]["projectileCount"], 2);
        assert_eq!(json["data"]["players"]["p1"]["health"], 100);
    }

    #[test]
    fn test_client_event_round_trip() {
        let text = r#"{"event":"playerUpdate","data":{"position":[1.0,2.0,3.0],"rotation":[0.0,0.5,0.0]}}"#;
        let event: ClientEvent = serde_json::from_str(text).unwrap();
        assert_eq!(
            event,
            ClientEvent::PlayerUpdate {
                position: Some([1.0, 2.0, 3.0]),
                rotation: Some([0.0, 0.5, 0.0]),
            }
        );
    }

    #[test]
    fn test_client_event_missing_fields_default() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"shoot","data":{}}"#).unwrap();
        assert_eq!(
            event,
            ClientEvent::Shoot {
                position: None,
                direction: None,
                speed: None,
            }
        );
    }

    #[test]
    fn test_client_event_unknown_fields_ignored() {
        // The original client attaches its own id and owner to shot payloads;
        // the server assigns both and must not choke on the extras.
        let text = r#"{"event":"shoot","data":{"id":1723.55,"playerId":"x","position":[0.0,1.5,0.0],"direction":[0.0,0.0,1.0],"speed":50.0}}"#;
        let event: ClientEvent = serde_json::from_str(text).unwrap();
        assert_eq!(
            event,
            ClientEvent::Shoot {
                position: Some([0.0, 1.5, 0.0]),
                direction: Some([0.0, 0.0, 1.0]),
                speed: Some(50.0),
            }
        );
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        assert!(serde_json::from_str::<ClientEvent>(r#"{"event":"teleport","data":{}}"#).is_err());
    }
}
