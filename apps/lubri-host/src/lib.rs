//! # Lubri Host Library
//!
//! The host process the shop's UI talks to. It owns the single database
//! connection pool and answers JSON-lines requests on stdin/stdout.
//!
//! ## Module Organization
//! ```text
//! lubri_host/
//! ├── lib.rs          ◄─── You are here (startup & shutdown)
//! ├── ipc.rs          ◄─── Request/response loop
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   └── config.rs   ◄─── Shop configuration
//! ├── commands/       ◄─── One module per screen
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize Logging                                                  │
//! │     • tracing-subscriber with env filter, written to stderr             │
//! │     • stdout is reserved for responses                                  │
//! │                                                                         │
//! │  2. Determine Database Path                                             │
//! │     • LUBRI_DB_PATH, else the platform data directory                   │
//! │                                                                         │
//! │  3. Open Database                                                       │
//! │     • SQLite with WAL mode, foreign keys on                             │
//! │     • Run pending migrations                                            │
//! │                                                                         │
//! │  4. Load ConfigState from LUBRI_* variables                             │
//! │                                                                         │
//! │  5. Serve stdin until EOF, then close the database                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod ipc;
pub mod state;

use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use error::HostError;
use state::{database_path, ConfigState, DbState};

/// Runs the host until the UI process closes stdin.
pub async fn run() -> Result<(), HostError> {
    init_tracing();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Lubri POS host");

    let db_path = database_path()?;
    let db = DbState::open(db_path).await?;
    let config = ConfigState::from_env();
    info!(shop = %config.shop_name, "State initialized");

    let served = ipc::serve(
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        &db,
        &config,
    )
    .await;

    // Close even when the loop failed, so WAL is checkpointed
    db.close().await;
    info!("Database closed");

    served?;
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=lubri=trace` - Show trace for lubri crates only
/// - Default: INFO, with debug for the lubri crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lubri=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
