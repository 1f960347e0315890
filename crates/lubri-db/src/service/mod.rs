//! # Transactional Services
//!
//! The three operations that write to more than one table. Each runs inside
//! exactly one SQLite transaction and either commits everything or nothing.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BillingCoordinator::create_bill                                       │
//! │    customer upsert → bill → first payment → items + stock → ledger     │
//! │                                                                         │
//! │  PaymentService::record_payment                                        │
//! │    settle → bill settlement → payment log → ledger credit              │
//! │                                                                         │
//! │  ReturnService::process_return                                         │
//! │    return row → restock → ledger credit                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every rule that can be checked without the database is checked before
//! the transaction opens. Anything that fails after `begin` propagates with
//! `?`; the transaction guard is dropped un-committed, which rolls it back.

pub mod checkout;
pub mod payment;
pub mod refund;
