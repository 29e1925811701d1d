use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use receipt_bot::api::{ApiServer, ApiState};
use receipt_bot::{Config, FirebaseStore, ReceiptStore};

/// Receipt Bot - LINE webhook bot for scanning and querying receipts
#[derive(Parser)]
#[command(name = "receipt-bot", version, about)]
struct Cli {
    /// Port to listen on (overrides PORT and the config file)
    #[arg(long)]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print a user's stored receipts as JSON
    Receipts {
        /// LINE user ID
        #[arg(short, long)]
        user: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter = match cli.verbose {
        0 => "info,receipt_bot=info",
        1 => "info,receipt_bot=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    tracing::debug!(?config, "loaded configuration");

    if let Some(Command::Receipts { user }) = cli.command {
        return print_receipts(&config, &user).await;
    }

    tracing::info!(
        port = config.server.port,
        text_model = %config.gemini.text_model,
        vision_model = %config.gemini.vision_model,
        "starting receipt bot"
    );

    let port = config.server.port;
    let webhook_path = config.server.webhook_path.clone();
    let state = ApiState::from_config(config)?;

    ApiServer::new(state, port, webhook_path).run().await?;

    Ok(())
}

async fn print_receipts(config: &Config, user: &str) -> anyhow::Result<()> {
    let store = FirebaseStore::new(
        &config.firebase.database_url,
        config.firebase.credentials.as_ref(),
    )?;
    let receipts = store.load(user).await?;
    println!("{}", serde_json::to_string_pretty(&receipts)?);
    Ok(())
}
