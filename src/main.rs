use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use todod::{config::ServerConfig, rest, storage::Storage, tasks::TaskStore, AppContext};

#[derive(Parser)]
#[command(
    name = "todod",
    about = "todod — anonymous multi-user to-do list web service",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP listen port
    #[arg(long, env = "TODOD_PORT")]
    port: Option<u16>,

    /// Bind address (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "TODOD_BIND")]
    bind_address: Option<String>,

    /// Database connection string (default: sqlite://todos.db)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TODOD_LOG")]
    log: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the web server (default when no subcommand given).
    Serve,
    /// Run database migrations and exit.
    ///
    /// Intended for deployment tooling that wants the schema brought up to
    /// date before the service starts. Failures exit non-zero.
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Init once — must happen before any tracing calls.
    let log_level = args.log.as_deref().unwrap_or("info").to_owned();
    let log_format = std::env::var("TODOD_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    setup_logging(&log_level, &log_format);

    let config = Arc::new(ServerConfig::new(
        args.port,
        args.bind_address,
        args.database_url,
        args.log,
    ));

    match args.command {
        Some(Command::Migrate) => {
            let storage = Storage::new(&config.database_url).await?;
            drop(storage);
            info!("migrations applied");
        }
        None | Some(Command::Serve) => run_server(config).await?,
    }

    Ok(())
}

async fn run_server(config: Arc<ServerConfig>) -> Result<()> {
    // Schema work happens here, before the listener is opened: no request
    // is ever served against an unmigrated database.
    let storage = Arc::new(Storage::new(&config.database_url).await?);
    let tasks = Arc::new(TaskStore::new(storage.pool()));

    let ctx = Arc::new(AppContext {
        config,
        storage,
        tasks,
        started_at: std::time::Instant::now(),
    });

    rest::start_server(ctx).await
}

/// Initialize the tracing subscriber.
///
/// `log_format` may be `"pretty"` (default, human-readable compact format)
/// or `"json"` (structured JSON for log aggregators).
fn setup_logging(log_level: &str, log_format: &str) {
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(log_level)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(log_level)
            .compact()
            .init();
    }
}
