//! # State Module
//!
//! Two independent state types, each passed only to the commands that need
//! it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────────────┐        ┌──────────────────────┐                  │
//! │  │    DbState       │        │    ConfigState       │                  │
//! │  │                  │        │                      │                  │
//! │  │  Database        │        │  shop name, address  │                  │
//! │  │  (SQLite pool)   │        │  GSTIN, currency     │                  │
//! │  │  open / close    │        │  low-stock threshold │                  │
//! │  └──────────────────┘        └──────────────────────┘                  │
//! │                                                                         │
//! │  DbState: pool is internally synchronised                              │
//! │  ConfigState: read-only after startup                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;

pub use config::ConfigState;
pub use db::{database_path, DbState};
