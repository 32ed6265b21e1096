//! Cabinstay Server
//!
//! Serves cabins, availability and guest sessions for the reservation site.
//!
//! # Configuration
//!
//! Read from `~/.config/cabinstay/config.yaml` (or `--config`), overridden by
//! environment variables:
//! - `CABINSTAY_DATABASE_PATH`: SQLite database file
//! - `CABINSTAY_PORT`: Port to listen on (default: 8080)
//! - `CABINSTAY_SESSION_TTL`: Session lifetime in minutes
//! - `CABINSTAY_COOKIE_SECURE`: Set `true` behind HTTPS
//!
//! # Endpoints
//!
//! - `GET /health`: Health check
//! - `POST /api/auth/callback`: Identity provider sign-in callback
//! - `GET /api/auth/session`: Current session
//! - `POST /api/auth/signout`: End the session
//! - `GET /cabins`, `GET /cabins/{id}`, `GET /cabins/{id}/booked-dates`
//! - `GET /settings`
//! - `GET /account`, `GET /account/bookings`: Signed-in guests only

use cabinstay::config::Config;
use cabinstay::db::init_db;
use cabinstay::server::{router, AppState};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often expired sessions are swept from memory.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Parser)]
#[command(name = "cabinstay-server")]
#[command(version)]
#[command(about = "Cabinstay reservation server", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cabinstay=info,cabinstay_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(cli.config)?;
    tracing::info!("Database: {}", config.database_path.display());

    let pool = init_db(&config.database_path).await?;
    let state = AppState::new(pool, &config);

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = sessions.cleanup_expired();
            if removed > 0 {
                tracing::debug!("Removed {} expired session(s)", removed);
            }
        }
    });

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
