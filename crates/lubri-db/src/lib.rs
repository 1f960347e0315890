//! # lubri-db: Storage Service for Lubri POS
//!
//! SQLite storage for the oil shop: schema migrations, one repository per
//! table family, and the three services that write across tables in a
//! single transaction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lubri POS Data Flow                              │
//! │                                                                         │
//! │  Host command (create_bill)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     lubri-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │   Services    │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ checkout      │    │  (embedded)  │  │   │
//! │  │   │               │◄───│ payment       │    │ 001_initial  │  │   │
//! │  │   │ SqlitePool    │    │ refund        │    │ 002_billing  │  │   │
//! │  │   │ open / close  │    ├───────────────┤    │ 003_indexes  │  │   │
//! │  │   │               │◄───│ Repositories  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  │   <data dir>/lubri-pos/oil_inventory.db                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - `Database` handle and `DbConfig`
//! - [`migrations`] - Embedded, versioned schema migrations
//! - [`error`] - Database error types
//! - [`repository`] - Per-table reads and transaction helpers
//! - [`service`] - Checkout, additional payments, returns
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lubri_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("oil_inventory.db")).await?;
//!
//! let created = db.checkout().create_bill(&new_bill).await?;
//! db.payments().record_payment(created.bill_id, amount, PaymentMode::Cash).await?;
//!
//! db.close().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig};

pub use repository::bill::{BillFilter, BillRepository};
pub use repository::customer::CustomerRepository;
pub use repository::ledger::LedgerRepository;
pub use repository::product::ProductRepository;
pub use service::checkout::{BillingCoordinator, CreatedBill, NewBill};
pub use service::payment::PaymentService;
pub use service::refund::{ReturnRequest, ReturnService};
