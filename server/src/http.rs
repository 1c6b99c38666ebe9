//! Auxiliary HTTP surface: liveness and stats.
//!
//! Both handlers read a couple of atomic counters the game loop refreshes;
//! neither touches world state or holds a lock.

use crate::network::ServerStats;
use crate::utils::now_ms;
use axum::{extract::State, response::Json, routing::get, Router};
use log::info;
use serde::Serialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    uptime_secs: u64,
    players: usize,
    projectiles: usize,
}

pub fn router(stats: Arc<ServerStats>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/stats", get(stats_summary))
        .layer(CorsLayer::permissive())
        .with_state(stats)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: now_ms(),
    })
}

async fn stats_summary(State(stats): State<Arc<ServerStats>>) -> Json<StatsResponse> {
    let started = stats.started_at_ms.load(Ordering::Relaxed);
    Json(StatsResponse {
        uptime_secs: now_ms().saturating_sub(started) / 1000,
        players: stats.players.load(Ordering::Relaxed),
        projectiles: stats.projectiles.load(Ordering::Relaxed),
    })
}

pub async fn serve(addr: &str, stats: Arc<ServerStats>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);
    axum::serve(listener, router(stats)).await
}
