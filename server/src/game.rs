use log::info;
use rand::Rng;
use shared::{
    distance, normalize, Player, Projectile, ServerEvent, Vec3, HIT_DAMAGE, HIT_RADIUS,
    MAX_HEALTH, PROJECTILE_LIFETIME_MS, RESPAWN_DELAY_MS, SPAWN_EXTENT, SPAWN_HEIGHT,
};
use std::collections::HashMap;

/// Authoritative world state: the player map and the in-flight projectiles.
///
/// Exactly one task owns a `GameWorld`; clients only ever see serialized
/// snapshots and deltas. Position and rotation are last-writer-wins
/// overwrites from client updates, while health and the kill/death counters
/// change only inside [`GameWorld::tick`].
///
/// Every time-dependent method takes `now` (unix milliseconds) as a
/// parameter, so tests drive the clock explicitly.
#[derive(Debug)]
pub struct GameWorld {
    pub players: HashMap<String, Player>,
    pub projectiles: Vec<Projectile>,
    pub started_at: u64,
    next_projectile_id: u64,
}

impl GameWorld {
    pub fn new(now: u64) -> Self {
        Self {
            players: HashMap::new(),
            projectiles: Vec::new(),
            started_at: now,
            next_projectile_id: 1,
        }
    }

    /// Uniform over a square of ±`SPAWN_EXTENT` on x/z, at ground height.
    pub fn random_spawn_position() -> Vec3 {
        let mut rng = rand::thread_rng();
        [
            rng.gen_range(-SPAWN_EXTENT..=SPAWN_EXTENT),
            SPAWN_HEIGHT,
            rng.gen_range(-SPAWN_EXTENT..=SPAWN_EXTENT),
        ]
    }

    pub fn add_player(&mut self, id: &str, now: u64) -> Player {
        let player = Player::new(id.to_string(), Self::random_spawn_position(), now);
        info!(
            "Added player {} at ({:.1}, {:.1}, {:.1})",
            id, player.position[0], player.position[1], player.position[2]
        );
        self.players.insert(id.to_string(), player.clone());
        player
    }

    /// Removes the player record immediately. Projectiles owned by the
    /// departed player stay in flight but are inert (see [`Self::find_victim`])
    /// until the lifetime cutoff collects them.
    pub fn remove_player(&mut self, id: &str) -> bool {
        if self.players.remove(id).is_some() {
            info!("Removed player {}", id);
            true
        } else {
            false
        }
    }

    /// Overwrites position/rotation verbatim from a client update. The caller
    /// is trusted on values; only existence and the alive flag gate it.
    /// Absent fields keep their previous value. Returns the applied pair for
    /// rebroadcast, or `None` if the update was dropped.
    pub fn apply_movement(
        &mut self,
        id: &str,
        position: Option<Vec3>,
        rotation: Option<Vec3>,
        now: u64,
    ) -> Option<(Vec3, Vec3)> {
        let player = self.players.get_mut(id)?;
        if !player.is_alive {
            return None;
        }
        if let Some(position) = position {
            player.position = position;
        }
        if let Some(rotation) = rotation {
            player.rotation = rotation;
        }
        player.last_update = now;
        Some((player.position, player.rotation))
    }

    /// Creates a projectile for a validated fire request. Ids come from a
    /// monotonic counter so two projectiles never alias. Returns `None` when
    /// the shooter is missing or dead.
    pub fn spawn_projectile(
        &mut self,
        owner: &str,
        position: Vec3,
        direction: Vec3,
        speed: f32,
        now: u64,
    ) -> Option<Projectile> {
        let player = self.players.get(owner)?;
        if !player.is_alive {
            return None;
        }
        let id = self.next_projectile_id;
        self.next_projectile_id += 1;
        let projectile = Projectile {
            id,
            position,
            direction: normalize(direction),
            player_id: owner.to_string(),
            speed,
            created_at: now,
        };
        self.projectiles.push(projectile.clone());
        Some(projectile)
    }

    /// One simulation step: expire old projectiles, resolve collisions into
    /// hit/death events, then respawn eligible dead players. Returns the
    /// delta events to broadcast; the caller follows up with [`Self::snapshot`].
    pub fn tick(&mut self, now: u64) -> Vec<ServerEvent> {
        let mut events = Vec::new();

        let projectiles = std::mem::take(&mut self.projectiles);
        for projectile in projectiles {
            if projectile.age_ms(now) > PROJECTILE_LIFETIME_MS {
                continue;
            }
            match self.find_victim(&projectile) {
                Some(victim_id) => self.resolve_hit(&projectile, &victim_id, now, &mut events),
                None => self.projectiles.push(projectile),
            }
        }

        self.respawn_eligible_players(now, &mut events);
        events
    }

    /// Full-state snapshot: the player map plus a projectile count (the full
    /// projectile list never goes on the wire).
    pub fn snapshot(&self, now: u64) -> ServerEvent {
        ServerEvent::GameState {
            players: self.players.clone(),
            projectile_count: self.projectiles.len(),
            timestamp: now,
        }
    }

    /// Scans living players (excluding the owner) for one within the hit
    /// radius. Candidates are visited in ascending id order so the
    /// several-players-in-radius case resolves deterministically; at most one
    /// victim is ever returned per projectile. A projectile whose owner no
    /// longer exists is inert: there is no record to credit the hit to.
    fn find_victim(&self, projectile: &Projectile) -> Option<String> {
        if !self.players.contains_key(&projectile.player_id) {
            return None;
        }
        let mut ids: Vec<&String> = self.players.keys().collect();
        ids.sort();
        for id in ids {
            let player = &self.players[id];
            if player.id == projectile.player_id || !player.is_alive {
                continue;
            }
            if distance(projectile.position, player.position) < HIT_RADIUS {
                return Some(player.id.clone());
            }
        }
        None
    }

    fn resolve_hit(
        &mut self,
        projectile: &Projectile,
        victim_id: &str,
        now: u64,
        events: &mut Vec<ServerEvent>,
    ) {
        let Some(victim) = self.players.get_mut(victim_id) else {
            return;
        };
        victim.health = (victim.health - HIT_DAMAGE).max(0);
        victim.last_update = now;
        let new_health = victim.health;

        events.push(ServerEvent::BulletHit {
            bullet_id: projectile.id,
            player_id: victim_id.to_string(),
            new_health,
            damage: HIT_DAMAGE,
        });

        if new_health == 0 {
            victim.is_alive = false;
            victim.deaths += 1;
            let deaths = victim.deaths;

            let mut kills = 0;
            if let Some(shooter) = self.players.get_mut(&projectile.player_id) {
                shooter.kills += 1;
                kills = shooter.kills;
            }

            events.push(ServerEvent::PlayerDied {
                player_id: victim_id.to_string(),
                killer_id: projectile.player_id.clone(),
                kills,
                deaths,
            });
            info!("Player {} killed by {}", victim_id, projectile.player_id);
        }
    }

    /// Dead players whose last update is older than the respawn delay come
    /// back at full health on a fresh spawn point. The alive flag guards the
    /// transition, so a tick can never respawn the same life twice.
    fn respawn_eligible_players(&mut self, now: u64, events: &mut Vec<ServerEvent>) {
        for player in self.players.values_mut() {
            if player.is_alive || now.saturating_sub(player.last_update) <= RESPAWN_DELAY_MS {
                continue;
            }
            player.health = MAX_HEALTH;
            player.is_alive = true;
            player.position = Self::random_spawn_position();
            player.last_update = now;

            events.push(ServerEvent::PlayerRespawned {
                id: player.id.clone(),
                position: player.position,
                health: player.health,
                is_alive: true,
            });
            info!("Player {} respawned", player.id);
        }
    }
}
