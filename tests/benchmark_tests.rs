//! Performance benchmarks for critical game systems

use server::game::GameWorld;
use shared::{distance, Player};
use std::time::Instant;

fn crowded_world(players: usize, projectiles: usize) -> GameWorld {
    let mut world = GameWorld::new(0);
    for i in 0..players {
        let id = format!("player-{:03}", i);
        // Spread players out so nothing collides during the benchmark.
        world.players.insert(
            id.clone(),
            Player::new(id, [i as f32 * 10.0, 1.0, 0.0], 0),
        );
    }
    for i in 0..projectiles {
        world
            .spawn_projectile(
                "player-000",
                [1000.0 + i as f32 * 10.0, 1.0, 1000.0],
                [0.0, 0.0, 1.0],
                50.0,
                0,
            )
            .expect("Benchmark shooter missing");
    }
    world
}

/// Benchmarks the raw distance check underlying hit detection
#[test]
fn benchmark_distance_checks() {
    let a = [0.3, 1.0, -4.2];
    let b = [7.7, 1.0, 12.9];

    let iterations = 100_000;
    let start = Instant::now();

    let mut hits = 0u32;
    for _ in 0..iterations {
        if distance(a, b) < 1.0 {
            hits += 1;
        }
    }

    let duration = start.elapsed();
    println!(
        "Distance checks: {} iterations in {:?} ({:.2} ns/iter, {} hits)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64,
        hits
    );

    // Should complete in under 100ms for 100k iterations
    assert!(duration.as_millis() < 100);
}

/// Benchmarks a full tick over a crowded but collision-free world
#[test]
fn benchmark_tick_with_crowded_world() {
    let mut world = crowded_world(64, 128);

    let iterations = 1000;
    let start = Instant::now();

    for _ in 0..iterations {
        // Age stays at zero, so nothing expires and nothing hits: the cost
        // measured is the scan itself.
        let events = world.tick(0);
        assert!(events.is_empty());
    }

    let duration = start.elapsed();
    println!(
        "Tick: 64 players x 128 projectiles, {} ticks in {:?} ({:.2} µs/tick)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Far looser than the 16.67ms budget of a 60 Hz tick
    assert!(duration.as_millis() < 5000);
    assert_eq!(world.projectiles.len(), 128);
}

/// Benchmarks combat resolution: every projectile lands on a target
#[test]
fn benchmark_combat_resolution() {
    let iterations = 1000;
    let start = Instant::now();

    for _ in 0..iterations {
        let mut world = GameWorld::new(0);
        for i in 0..8 {
            let id = format!("player-{}", i);
            world
                .players
                .insert(id.clone(), Player::new(id, [i as f32 * 10.0, 1.0, 0.0], 0));
        }
        for i in 1..8 {
            world
                .spawn_projectile("player-0", [i as f32 * 10.0, 1.0, 0.3], [0.0, 0.0, 1.0], 50.0, 0)
                .expect("Benchmark shooter missing");
        }

        let events = world.tick(16);
        // One hit per projectile, no deaths at full health.
        assert_eq!(events.len(), 7);
    }

    let duration = start.elapsed();
    println!(
        "Combat: {} worlds resolved in {:?} ({:.2} µs/world)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 5000);
}

/// Benchmarks snapshot serialization, the per-tick broadcast payload
#[test]
fn benchmark_snapshot_serialization() {
    let world = crowded_world(50, 20);

    let iterations = 10_000;
    let start = Instant::now();

    let mut bytes = 0usize;
    for _ in 0..iterations {
        let snapshot = world.snapshot(123_456);
        let text = serde_json::to_string(&snapshot).expect("Serialization failed");
        bytes += text.len();
    }

    let duration = start.elapsed();
    println!(
        "Snapshot serialization: {} iterations in {:?} ({:.2} µs/iter, {} bytes each)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64,
        bytes / iterations
    );

    // Should comfortably fit inside the tick budget
    assert!(duration.as_millis() < 5000);
}
