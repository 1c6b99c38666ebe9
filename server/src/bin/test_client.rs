use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

// Manual smoke-test client: join, move around, fire once, read a few frames.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://127.0.0.1:8080".to_string());

    let (ws, _) = connect_async(&url).await?;
    println!("Connected to {}", url);
    let (mut sink, mut stream) = ws.split();

    // First frame is the full snapshot for this session
    if let Some(Ok(Message::Text(text))) = stream.next().await {
        println!("Snapshot: {}", text);
    }

    // Walk along the x axis
    for i in 0..5 {
        let update = json!({
            "event": "playerUpdate",
            "data": {
                "position": [i as f32, 1.0, 0.0],
                "rotation": [0.0, 0.0, 0.0],
            }
        });
        sink.send(Message::Text(update.to_string())).await?;
        sleep(Duration::from_millis(50)).await;
    }

    // Fire straight ahead
    let shot = json!({
        "event": "shoot",
        "data": {
            "position": [4.0, 1.5, 0.0],
            "direction": [0.0, 0.0, 1.0],
            "speed": 50.0,
        }
    });
    sink.send(Message::Text(shot.to_string())).await?;
    println!("Shot fired");

    // Drain a few broadcast frames before leaving
    for _ in 0..5 {
        match timeout(Duration::from_millis(500), stream.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => println!("Received: {}", text),
            _ => break,
        }
    }

    sink.send(Message::Close(None)).await?;
    println!("Disconnected");
    Ok(())
}
