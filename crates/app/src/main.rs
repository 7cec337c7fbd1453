//! Parley - minimal framed chat client
//!
//! Interactive by default: reads stdin lines and submits each one to
//! the connection loop. The `bot` subcommand runs a scripted persona
//! instead.

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parley_net::{ChatClient, ClientConfig, DEFAULT_PORT};

mod script;

#[derive(Parser)]
#[command(name = "parley", about = "Minimal framed chat client")]
struct Args {
    /// Chat server host
    #[arg(long, env = "PARLEY_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Chat server port
    #[arg(long, env = "PARLEY_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a scripted bot instead of the interactive prompt
    Bot {
        #[arg(value_enum)]
        persona: script::Persona,
    },
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let client = ChatClient::new(ClientConfig::new(args.host, args.port));

    // Connect failure is fatal: no retry, no backoff
    if let Err(e) = client.start().await {
        tracing::error!(error = %e, "Unable to connect to server");
        std::process::exit(1);
    }

    match args.command {
        Some(Command::Bot { persona }) => script::run(&client, persona).await,
        None => run_interactive(&client).await,
    }
}

/// Feed stdin lines into the client until EOF.
async fn run_interactive(client: &ChatClient) {
    println!("Client is running. Please input your nickname :)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => client.submit_message(line),
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read input");
                break;
            }
        }
    }

    client.stop();
}
