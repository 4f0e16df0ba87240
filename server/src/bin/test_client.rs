//! Headless client that joins a match, prints every event and steers its
//! paddle towards the ball.

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use pong_shared::{ClientEvent, ServerEvent, PADDLE_HEIGHT};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless pong test client", long_about = None)]
struct Args {
    /// Server WebSocket URL
    #[arg(short, long, default_value = "ws://127.0.0.1:3000")]
    server: String,

    /// Ask for a new match when one ends
    #[arg(long)]
    rematch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    println!("Connecting to {}", args.server);
    let (ws, _) = connect_async(args.server.as_str()).await?;
    let (mut sink, mut frames) = ws.split();

    let mut slot = None;
    let mut paddle_y = None;

    while let Some(frame) = frames.next().await {
        let text = match frame? {
            Message::Text(text) => text,
            Message::Close(_) => {
                println!("Server closed the connection");
                break;
            }
            _ => continue,
        };

        let event = match ServerEvent::from_json(&text) {
            Ok(event) => event,
            Err(e) => {
                println!("Unreadable frame {:?}: {}", text, e);
                continue;
            }
        };

        match event {
            ServerEvent::PlayerSelected(number) => {
                println!("Playing as player {}", number);
                slot = Some(number);
            }
            ServerEvent::BallMove(ball) => {
                // Keep the paddle centred on the ball, sending only whole-pixel changes.
                let target = (ball.y - PADDLE_HEIGHT / 2.0).round();
                if paddle_y != Some(target) {
                    paddle_y = Some(target);
                    let text = ClientEvent::Move(target).to_json()?;
                    sink.send(Message::Text(text)).await?;
                }
            }
            ServerEvent::GameEnd(winner) => {
                let outcome = if slot == Some(winner) { "won" } else { "lost" };
                println!("Match over, player {} wins (we {})", winner, outcome);
                if args.rematch {
                    let text = ClientEvent::RestartGame.to_json()?;
                    sink.send(Message::Text(text)).await?;
                }
            }
            other => println!("{:?}", other),
        }
    }

    Ok(())
}
