//! # Lubri Host Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI process (billing screen, history, dashboard)                        │
//! │        │ stdin: one JSON request per line                               │
//! │        ▼                                                                │
//! │  lubri-host ──► commands ──► lubri-db ──► oil_inventory.db              │
//! │        │ stdout: one JSON response per line                             │
//! │        ▼                                                                │
//! │  UI process                                                             │
//! │                                                                         │
//! │  stderr: logs                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The actual setup is in lib.rs so the IPC loop can be tested in-process.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match lubri_host::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("lubri-host: {}", e);
            ExitCode::FAILURE
        }
    }
}
