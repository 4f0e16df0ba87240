use clap::Parser;
use log::{error, info};
use pong_server::config::{DisconnectPolicy, MatchConfig};
use pong_server::network::Server;
use pong_shared::{BALL_SPEED, MAX_TICK_RATE, WIN_SCORE};

#[derive(Parser, Debug)]
#[command(author, version, about = "Authoritative two-player pong server", long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Maximum simulation ticks per second
    #[arg(short, long, default_value_t = MAX_TICK_RATE,
          value_parser = clap::value_parser!(u32).range(1..=1000))]
    tick_rate: u32,

    /// Ball speed in pixels per second
    #[arg(long, default_value_t = BALL_SPEED)]
    ball_speed: f32,

    /// Score that wins the match
    #[arg(long, default_value_t = WIN_SCORE)]
    win_score: u32,

    /// Keep a slot bound to its connection after disconnect instead of
    /// opening it for a new player
    #[arg(long)]
    keep_slots_on_disconnect: bool,

    /// Seed for ball launch directions
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn match_config(&self) -> MatchConfig {
        MatchConfig {
            ball_speed: self.ball_speed,
            win_score: self.win_score,
            tick_rate: self.tick_rate,
            disconnect_policy: if self.keep_slots_on_disconnect {
                DisconnectPolicy::KeepSlot
            } else {
                DisconnectPolicy::FreeSlot
            },
            seed: self.seed,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let config = args.match_config();

    info!(
        "Starting server: {} Hz, ball speed {}, first to {}",
        config.tick_rate, config.ball_speed, config.win_score
    );

    let address = format!("{}:{}", args.host, args.port);
    let mut server = Server::new(&address, config).await?;

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
