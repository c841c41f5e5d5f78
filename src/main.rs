use std::path::PathBuf;

use clap::{Parser, Subcommand};

use concierge::cli;

#[derive(Parser)]
#[command(name = "concierge", version, about = "Privacy-preserving conversational concierge backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP façade.
    Serve {
        /// Listen address, overriding config.
        #[arg(long)]
        addr: Option<String>,
        /// Path to a config file (default: .concierge/config.yml).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Mask a text and print the result.
    Mask {
        text: String,
        /// Emit masked text and mapping as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Run one chat turn locally, without the HTTP façade.
    Chat {
        message: String,
        #[arg(long, default_value = "demo_user")]
        user: String,
        #[arg(long)]
        lat: Option<f64>,
        #[arg(long)]
        lng: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Serve { addr, config } => cli::serve::run(addr, config).await?,
        Command::Mask { text, json } => cli::mask::run(&text, json)?,
        Command::Chat {
            message,
            user,
            lat,
            lng,
        } => cli::chat::run(&message, &user, lat, lng).await?,
    }
    Ok(())
}
