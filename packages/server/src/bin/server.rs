//! WebSocket game room server.
//!
//! Hosts a single room. Every message a player sends is relayed to all
//! players, tagged with the sender's name.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin gameroom-server
//! cargo run --bin gameroom-server -- --host 0.0.0.0 --port 3000 --max-players 8
//! ```

use std::time::Duration;

use clap::Parser;
use gameroom_server::{Relay, Room, RoomConfig, config, ui::Server};
use gameroom_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "gameroom-server")]
#[command(about = "WebSocket game room server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Largest accepted message from a player, in bytes
    #[arg(long, default_value_t = config::DEFAULT_MAX_MESSAGE_SIZE)]
    max_message_size: usize,

    /// How long a player's message may wait for room to accept it
    #[arg(long, default_value_t = config::DEFAULT_READ_WAIT.as_millis() as u64)]
    read_wait_ms: u64,

    /// Deadline for a single write to a player
    #[arg(long, default_value_t = config::DEFAULT_WRITE_WAIT.as_millis() as u64)]
    write_wait_ms: u64,

    /// A player silent for this long is disconnected
    #[arg(long, default_value_t = config::DEFAULT_PONG_WAIT.as_millis() as u64)]
    pong_wait_ms: u64,

    /// Keepalive ping interval; must be shorter than the pong wait
    #[arg(long, default_value_t = config::DEFAULT_PING_PERIOD.as_millis() as u64)]
    ping_period_ms: u64,

    /// Queued messages per player before it is dropped as too slow
    #[arg(long, default_value_t = config::DEFAULT_MAILBOX_CAPACITY)]
    mailbox_capacity: usize,

    /// Room-wide inbound queue capacity
    #[arg(long, default_value_t = config::DEFAULT_INBOUND_CAPACITY)]
    inbound_capacity: usize,

    /// Maximum number of players (unlimited when omitted)
    #[arg(long)]
    max_players: Option<usize>,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, default_value = "debug")]
    log_level: String,
}

impl Args {
    fn room_config(&self) -> RoomConfig {
        RoomConfig {
            max_message_size: self.max_message_size,
            read_wait: Duration::from_millis(self.read_wait_ms),
            write_wait: Duration::from_millis(self.write_wait_ms),
            pong_wait: Duration::from_millis(self.pong_wait_ms),
            ping_period: Duration::from_millis(self.ping_period_ms),
            mailbox_capacity: self.mailbox_capacity,
            inbound_capacity: self.inbound_capacity,
            max_players: self.max_players,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(
        "gameroom_server",
        env!("CARGO_BIN_NAME"),
        &args.log_level,
    );

    if let Err(e) = run(args).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Room
    let room = Room::new(args.room_config())?;
    let channels = room.start().await?;
    tracing::info!("Room {} created!", room.id());

    // 2. Game logic
    tokio::spawn(Relay::new(room.clone()).run(channels));

    // 3. Server
    Server::new(room).run(args.host, args.port).await
}
