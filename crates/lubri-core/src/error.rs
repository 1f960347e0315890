//! # Error Types
//!
//! Domain-specific error types for lubri-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lubri-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  lubri-db errors (separate crate)                                      │
//! │  └── DbError          - Storage failures (wraps CoreError)             │
//! │                                                                         │
//! │  Host API errors (in app)                                              │
//! │  └── ApiError         - What the UI process sees (serialized)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → UI           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, bill id, amounts)
//! 3. Errors are enum variants, never String
//! 4. Every rejected precondition gets a variant; nothing is silently coerced

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They are raised before any write happens, or abort the transaction that
/// raised them.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found (or is inactive when selling).
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    #[error("Bill not found: {0}")]
    BillNotFound(i64),

    #[error("Customer not found: {0}")]
    CustomerNotFound(i64),

    /// Checkout was called with no lines.
    #[error("Cannot create a bill with no items")]
    EmptyCart,

    /// Insufficient stock to complete sale.
    ///
    /// ## When This Occurs
    /// The guarded decrement matched no row: the product has fewer units
    /// on hand than the line asks for.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout (Engine Oil 20W-40, qty: 5)
    ///      │
    ///      ▼
    /// UPDATE ... WHERE quantity >= 5  → 0 rows
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Engine Oil 20W-40", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Whole bill rolls back, UI shows: "Only 3 in stock"
    /// ```
    #[error("Insufficient stock for {name} (#{product_id}): available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Payment amount is invalid.
    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    /// An additional payment is larger than what is still owed.
    #[error("Payment of {attempted} exceeds balance due of {balance_due}")]
    PaymentExceedsBalance { balance_due: Money, attempted: Money },

    /// A return names a product that was not sold on the bill.
    #[error("Product {product_id} is not on bill {bill_id}")]
    ProductNotOnBill { bill_id: i64, product_id: i64 },

    /// A return would bring the returned total above what was sold.
    #[error(
        "Cannot return {requested} of product {product_id} on bill {bill_id}: \
         sold {sold}, already returned {already_returned}"
    )]
    ReturnExceedsSold {
        bill_id: i64,
        product_id: i64,
        sold: i64,
        already_returned: i64,
        requested: i64,
    },

    /// A refund is larger than what is left of the value charged for the
    /// product on that bill.
    #[error(
        "Refund of {requested} for product {product_id} on bill {bill_id} exceeds \
         the refundable {refundable}"
    )]
    RefundExceedsValue {
        bill_id: i64,
        product_id: i64,
        refundable: Money,
        requested: Money,
    },

    /// A bill left with something owing needs a customer to owe it.
    #[error("A customer phone number is required when {balance_due} is left unpaid")]
    CustomerRequired { balance_due: Money },

    /// A ledger posting would push the running balance outside `i64`.
    #[error("Ledger balance out of range for customer {customer_id}")]
    LedgerOverflow { customer_id: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., phone number with letters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
