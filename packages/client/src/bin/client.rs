//! Terminal chat client for the linechat relay server.
//!
//! Sends the username as the first line, then every line typed at the prompt.
//! Prints everything the server sends.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin linechat-client -- --username alice
//! cargo run --bin linechat-client -- -H 127.0.0.1 -p 8080
//! ```

use clap::Parser;

use linechat_client::{ClientError, run_client_session, ui::ask_username};
use linechat_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "linechat-client")]
#[command(about = "Terminal client for the linechat relay server", long_about = None)]
struct Args {
    /// Server host
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short = 'p', long, default_value_t = 8080)]
    port: u16,

    /// Username to chat as (prompted if omitted)
    #[arg(short = 'u', long)]
    username: Option<String>,
}

async fn run(args: Args) -> Result<(), ClientError> {
    let username = match args.username {
        Some(username) if !username.trim().is_empty() => username.trim().to_string(),
        Some(_) => return Err(ClientError::EmptyUsername),
        None => ask_username()?,
    };

    let addr = format!("{}:{}", args.host, args.port);
    run_client_session(&addr, &username).await
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger("linechat_client", env!("CARGO_BIN_NAME"), "warn");

    let args = Args::parse();

    let code = match run(args).await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("Client error: {}", e);
            1
        }
    };
    // The input thread may still be blocked in readline
    std::process::exit(code);
}
