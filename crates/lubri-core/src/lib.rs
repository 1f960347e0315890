//! # lubri-core: Pure Business Logic for Lubri POS
//!
//! This crate holds the billing arithmetic and domain model of the shop as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lubri POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI process                                   │   │
//! │  │    Billing ──► Bill history ──► Customers ──► Dashboard         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON lines (stdin/stdout)              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    lubri-host commands                          │   │
//! │  │    create_bill, record_payment, process_return, get_bills ...   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lubri-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  billing  │  │  payment  │  │   │
//! │  │   │  Product  │  │   Money   │  │ CartLine  │  │  resolve  │  │   │
//! │  │   │   Bill    │  │  half-up  │  │ BillTotals│  │  settle   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    lubri-db (Database Layer)                    │   │
//! │  │      SQLite, migrations, repositories, transactional services   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Bill, LedgerEntry, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`billing`] - Bill Calculation Engine (global and itemized modes)
//! - [`payment`] - Checkout payment resolution and additional-payment settlement
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use lubri_core::billing::{calculate_bill, BillingMode, CartLine};
//! use lubri_core::money::Money;
//! use lubri_core::types::{Discount, Rate};
//!
//! let lines = [CartLine::new(Money::from_paise(10000), 2)];
//! let mode = BillingMode::Global {
//!     discount: Discount::percent(1000), // 10%
//!     tax_rate: Rate::from_bps(1800),    // 18%
//! };
//!
//! let totals = calculate_bill(&lines, &mode);
//! assert_eq!(totals.total.to_string(), "₹212.40");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod error;
pub mod money;
pub mod payment;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use lubri_core::Money` instead of
// `use lubri_core::money::Money`

pub use billing::{calculate_bill, calculate_line, BillTotals, BillingMode, CartLine, LineBreakdown};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use payment::{settle, PaymentDetails, PaymentInput, PaymentProgress, ResolvedPayment};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed on a single bill.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Loose oil is sold by the litre, so counts run higher than packaged
/// retail, but a five-digit entry is almost always a typo.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Maximum unit price, in paise (₹1 crore).
///
/// Together with [`MAX_ITEM_QUANTITY`], [`MAX_CART_ITEMS`] and the discount
/// and tax limits in [`validation`], this keeps every bill total below
/// about 2.1 × 10^17 paise, far inside `i64`.
pub const MAX_UNIT_PRICE: i64 = 1_000_000_000;

/// Default low-stock threshold used by the dashboard.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Default number of matches returned by customer search.
pub const CUSTOMER_SEARCH_LIMIT: i64 = 5;
