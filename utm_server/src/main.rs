//! Card-game HTTP server.
//!
//! Serves the game lifecycle API backed by PostgreSQL, with optional push
//! notification delivery through a OneSignal-compatible gateway.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use log::info;
use pico_args::Arguments;
use up_to_me::{
    db::Database,
    games::GameManager,
    notify::{NoopNotifier, Notifier, PushGateway},
};
use utm_server::{api, config::ServerConfig};

const HELP: &str = "\
Run the card-game API server

USAGE:
  utm_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8000]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/up_to_me]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8000)
  DATABASE_URL             PostgreSQL connection string
  API_SECRET               Shared secret required on mutating endpoints
  PUSH_APP_ID              Push gateway application id (optional)
  PUSH_API_KEY             Push gateway REST key (optional)
  PUSH_API_URL             Push gateway endpoint override (optional)
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let db_url_override: Option<String> = pargs.opt_value_from_str("--db-url")?;

    env_logger::builder().format_target(false).init();

    let config = ServerConfig::from_env(bind_override, db_url_override)
        .map_err(|e| anyhow::anyhow!("Configuration error: {e}"))?;

    info!("Connecting to database: {}", config.database.database_url);
    let db = Database::new(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {e}"))?;
    info!("Database connected successfully");

    let pool = Arc::new(db.pool().clone());

    let notifier: Arc<dyn Notifier> = match &config.push {
        Some(push) => {
            info!("Push notifications enabled");
            Arc::new(PushGateway::new(push.clone()))
        }
        None => {
            info!("Push notifications disabled (PUSH_APP_ID / PUSH_API_KEY not set)");
            Arc::new(NoopNotifier)
        }
    };

    let games = Arc::new(GameManager::new(pool.clone(), notifier));

    let state = api::AppState {
        games,
        pool,
        api_secret: Arc::new(config.api_secret.clone()),
    };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {e}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {e}"))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
}
