use clap::Parser;
use log::{error, info};
use server::http;
use server::network::Server;
use std::time::Duration;

/// Main-method of the application.
/// Parses command-line arguments, starts the auxiliary HTTP surface and runs
/// the game server until Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        /// WebSocket port for game traffic
        #[clap(short, long, default_value = "8080")]
        port: u16,
        /// Port for the health/stats HTTP endpoints
        #[clap(long, default_value = "3000")]
        http_port: u16,
        /// Tick rate (simulation updates per second)
        #[clap(short, long, default_value = "60")]
        tick_rate: u32,
        /// Maximum number of concurrent players
        #[clap(short, long, default_value = "32")]
        max_clients: usize,
    }

    env_logger::init();
    let args = Args::parse();

    let tick_duration = Duration::from_secs_f64(1.0 / args.tick_rate.max(1) as f64);
    let addr = format!("{}:{}", args.host, args.port);
    let mut server = Server::bind(&addr, tick_duration, args.max_clients).await?;

    // Health/stats endpoints run beside the game socket, sharing only a few
    // atomic counters with it.
    let http_addr = format!("{}:{}", args.host, args.http_port);
    let stats = server.stats();
    let http_handle = tokio::spawn(async move {
        if let Err(e) = http::serve(&http_addr, stats).await {
            error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        result = http_handle => {
            if let Err(e) = result {
                error!("HTTP task panicked: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
