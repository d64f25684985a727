//! Line-oriented chat relay server.
//!
//! Each client sends its username as the first line, then chats:
//! plain lines are broadcast, `@user text` is delivered to one user and
//! `/history` replays recent broadcasts and join/leave notices.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin linechat-server
//! cargo run --bin linechat-server -- --host 0.0.0.0 --port 3000 --admin-port 3001
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use linechat_server::{
    ServerConfig, ServerError,
    config::{
        DEFAULT_HOST, DEFAULT_MAX_CONNECTIONS, DEFAULT_MAX_LINE_LENGTH,
        DEFAULT_OUTBOUND_QUEUE_DEPTH, DEFAULT_PORT,
    },
    domain::DEFAULT_HISTORY_CAPACITY,
    ui::{Server, state::AppState},
};
use linechat_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "linechat-server")]
#[command(about = "Line-oriented chat relay with direct messages and history", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port number for chat connections
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Port number for the admin HTTP API (disabled if omitted)
    #[arg(long)]
    admin_port: Option<u16>,

    /// Number of broadcast/system messages kept for `/history`
    #[arg(long, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    history_size: usize,

    /// Maximum number of concurrent connections
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    max_connections: usize,

    /// Tell senders when a direct message is malformed or its recipient is unknown
    #[arg(long)]
    notify_rejections: bool,

    /// Close connections that stay silent for this many seconds
    #[arg(long)]
    idle_timeout_secs: Option<u64>,

    /// Longest accepted line in bytes; longer lines are dropped
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LENGTH)]
    max_line_length: usize,

    /// Lines queued for a slow client before it is disconnected
    #[arg(long, default_value_t = DEFAULT_OUTBOUND_QUEUE_DEPTH)]
    outbound_queue_depth: usize,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            admin_port: self.admin_port,
            history_capacity: self.history_size,
            max_connections: self.max_connections,
            notify_rejections: self.notify_rejections,
            idle_timeout: self.idle_timeout_secs.map(Duration::from_secs),
            max_line_length: self.max_line_length,
            outbound_queue_depth: self.outbound_queue_depth,
        }
    }
}

async fn run(args: Args) -> Result<(), ServerError> {
    let config = args.into_config().validate()?;
    let state = Arc::new(AppState::in_memory(&config, Arc::new(SystemClock))?);
    tracing::info!(
        "History capacity {}, connection limit {}",
        config.history_capacity,
        config.max_connections
    );

    Server::new(state, config).run().await
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger("linechat_server", env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
