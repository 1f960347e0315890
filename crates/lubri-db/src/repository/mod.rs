//! # Repository Module
//!
//! One repository per table family, each holding a clone of the pool.
//!
//! ## Two Kinds of Method
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Host command                                                          │
//! │       │                                                                 │
//! │       │  db.products().search("20w", 20)                               │
//! │       ▼                                                                 │
//! │  &self methods ──────────► SqlitePool      single statement, reads,    │
//! │                                            catalogue CRUD              │
//! │                                                                         │
//! │  Service (checkout / payment / return)                                 │
//! │       │  let mut tx = pool.begin()                                     │
//! │       ▼                                                                 │
//! │  Repo::helper(&mut *tx, ..) ─► one open   every write that must land   │
//! │                                transaction together with others       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalogue, search, guarded stock moves
//! - [`category::CategoryRepository`] - Product categories
//! - [`supplier::SupplierRepository`] - Suppliers
//! - [`employee::EmployeeRepository`] - Staff who sell
//! - [`customer::CustomerRepository`] - Phone-keyed customers with balances
//! - [`bill::BillRepository`] - Bills, frozen items, payment log, history filter
//! - [`ledger::LedgerRepository`] - Customer running balance
//! - [`returns::ReturnRepository`] - Returned goods
//! - [`dashboard::DashboardRepository`] - Home screen aggregates

pub mod bill;
pub mod category;
pub mod customer;
pub mod dashboard;
pub mod employee;
pub mod ledger;
pub mod product;
pub mod returns;
pub mod supplier;
