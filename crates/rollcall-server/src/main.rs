use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rollcall_server::config::ServerConfig;
use rollcall_server::directory::Directory;
use rollcall_server::router::Router;
use rollcall_server::telegram::TelegramTransport;
use rollcall_server::{server, show};
use rollcall_store::Database;

#[derive(Parser)]
#[command(name = "rollcall", version, about = "Per-chat participant roster bot")]
struct Cli {
    /// Bot API token (overrides TELEGRAM_TOKEN)
    #[arg(long, global = true, value_name = "TOKEN")]
    telegram_token: Option<String>,

    /// Roster database file (overrides STORE_PATH)
    #[arg(long, global = true, value_name = "FILE")]
    store_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Run the bot
    Server,
    /// Print every stored participant
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("info,rollcall_server=debug,rollcall_store=debug")
            }),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ServerConfig::from_env();
    if let Some(token) = cli.telegram_token {
        config.telegram_token = Some(token);
    }
    if let Some(path) = cli.store_path {
        config.store_path = Some(path);
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        os = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        "Starting rollcall"
    );
    info!(?config, "Loaded configuration");

    let db = open_store(&config).context("failed to open roster store")?;

    match cli.command {
        Command::Server => run_server(config, db).await,
        Command::Show => {
            let count = show::run(&db, &mut std::io::stdout().lock())?;
            info!(count, "participants listed");
            db.close()?;
            Ok(())
        }
    }
}

fn open_store(config: &ServerConfig) -> rollcall_store::Result<Database> {
    match &config.store_path {
        Some(path) => Database::open_at(path),
        None => Database::new(),
    }
}

async fn run_server(config: ServerConfig, db: Database) -> anyhow::Result<()> {
    let token = config
        .telegram_token
        .as_deref()
        .context("TELEGRAM_TOKEN is not set")?;

    let mut transport = TelegramTransport::new(&config.api_url, token, config.poll_timeout_secs)?;
    transport.authorize().await?;

    let directory = Directory::new(db, config.max_participants);
    info!(max_participants = directory.max_participants(), "Directory ready");
    let mut router = Router::new(directory, env!("CARGO_PKG_VERSION"));

    let result = tokio::select! {
        result = server::run(&mut transport, &mut router) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
            Ok(())
        }
    };

    router.into_directory().into_database().close()?;
    result
}
