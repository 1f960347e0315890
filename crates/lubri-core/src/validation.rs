//! # Validation Module
//!
//! Input validation utilities for Lubri POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI process                                                   │
//! │  └── Immediate user feedback (clamped inputs, required fields)         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Host + services (Rust)                                       │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: field and business rule validation                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 0)                                             │
//! │  ├── UNIQUE (customers.phone)                                          │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use lubri_core::validation::{validate_phone, validate_quantity};
//!
//! assert!(validate_phone("9999999999").is_ok());
//! assert!(validate_quantity(5).is_ok());
//! ```

use crate::billing::{BillingMode, CartLine};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Discount, DiscountType, Rate};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_UNIT_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (product, customer, employee, supplier).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a phone number used as the customer key.
///
/// ## Rules
/// - Digits, spaces, `+` and `-` only
/// - Between 6 and 15 digits
///
/// ## Returns
/// The trimmed phone string, as stored.
///
/// ```rust
/// use lubri_core::validation::validate_phone;
///
/// assert_eq!(validate_phone(" 99999 99999 ").unwrap(), "99999 99999");
/// assert!(validate_phone("call me").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '+' || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, '+' and '-'".to_string(),
        });
    }

    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if !(6..=15).contains(&digits) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must have between 6 and 15 digits".to_string(),
        });
    }

    Ok(phone.to_string())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns default results)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Bill line / return / restock                                           │
/// │                                                                         │
/// │  User enters quantity: 5                                               │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       ├── qty > 9999? → Error: "quantity must be between 1 and 9999"   │
/// │       │                                                                 │
/// │       └── OK → Proceed                                                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price or cost.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free samples)
/// - At most MAX_UNIT_PRICE
///
/// ```rust
/// use lubri_core::money::Money;
/// use lubri_core::validation::validate_price;
///
/// assert!(validate_price("price", Money::from_paise(45000)).is_ok());
/// assert!(validate_price("price", Money::zero()).is_ok());
/// assert!(validate_price("price", Money::from_paise(-100)).is_err());
/// assert!(validate_price("price", Money::from_paise(i64::MAX / 2)).is_err());
/// ```
pub fn validate_price(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() || amount.paise() > MAX_UNIT_PRICE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_UNIT_PRICE,
        });
    }

    Ok(())
}

/// Validates a payment amount.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a tax rate.
///
/// ## Rules
/// - Must be between 0 and 10000 bps (0% to 100%)
pub fn validate_tax_rate(rate: Rate) -> ValidationResult<()> {
    if rate.bps() > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

/// Validates a discount's magnitude.
///
/// Negative discounts pass: the engine carries them unchanged. Only values
/// large enough to overflow the arithmetic are rejected.
pub fn validate_discount(discount: &Discount) -> ValidationResult<()> {
    let limit = match discount.kind {
        DiscountType::Amount => 1_000_000_000_000,
        DiscountType::Percent => 1_000_000,
    };

    if discount.value.abs() > limit {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: -limit,
            max: limit,
        });
    }

    Ok(())
}

/// Validates the bill-level discount and tax of a global-mode bill.
///
/// Itemized bills carry no bill-level terms, so they always pass.
pub fn validate_billing_mode(mode: &BillingMode) -> ValidationResult<()> {
    if let BillingMode::Global { discount, tax_rate } = mode {
        validate_discount(discount)?;
        validate_tax_rate(*tax_rate)?;
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size (number of lines).
///
/// ## Rules
/// - At least one line
/// - Must not exceed MAX_CART_ITEMS
pub fn validate_cart_size(lines: usize) -> CoreResult<()> {
    if lines == 0 {
        return Err(CoreError::EmptyCart);
    }

    if lines > MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        });
    }

    Ok(())
}

/// Validates every line of a cart before it reaches the engine.
pub fn validate_cart_lines(lines: &[CartLine]) -> CoreResult<()> {
    validate_cart_size(lines.len())?;

    for line in lines {
        if line.quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: line.quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
        validate_quantity(line.quantity)?;
        validate_price("unit price", line.unit_price)?;
        validate_discount(&line.discount)?;
        validate_tax_rate(line.tax_rate)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Engine Oil 20W-40").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("9999999999").is_ok());
        assert!(validate_phone("+91 99999-99999").is_ok());

        assert!(validate_phone("").is_err());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("99999x9999").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_tax_rate() {
        assert!(validate_tax_rate(Rate::from_bps(0)).is_ok());
        assert!(validate_tax_rate(Rate::from_bps(1800)).is_ok());
        assert!(validate_tax_rate(Rate::from_bps(10_000)).is_ok());
        assert!(validate_tax_rate(Rate::from_bps(10_001)).is_err());
    }

    #[test]
    fn test_validate_discount_allows_negative() {
        assert!(validate_discount(&Discount::amount(-500)).is_ok());
        assert!(validate_discount(&Discount::percent(20_000)).is_ok());
        assert!(validate_discount(&Discount::percent(2_000_000)).is_err());
    }

    #[test]
    fn test_validate_price_bounds() {
        assert!(validate_price("price", Money::from_paise(MAX_UNIT_PRICE)).is_ok());
        assert!(validate_price("price", Money::from_paise(MAX_UNIT_PRICE + 1)).is_err());
        assert!(validate_price("price", Money::from_paise(-1)).is_err());
    }

    #[test]
    fn test_validate_billing_mode() {
        assert!(validate_billing_mode(&BillingMode::Itemized).is_ok());
        assert!(validate_billing_mode(&BillingMode::Global {
            discount: Discount::amount(5000),
            tax_rate: Rate::from_bps(1800),
        })
        .is_ok());

        assert!(validate_billing_mode(&BillingMode::Global {
            discount: Discount::amount(i64::MAX / 2),
            tax_rate: Rate::zero(),
        })
        .is_err());
        assert!(validate_billing_mode(&BillingMode::Global {
            discount: Discount::none(),
            tax_rate: Rate::from_bps(50_000),
        })
        .is_err());
    }

    #[test]
    fn test_validate_cart_lines() {
        assert!(matches!(validate_cart_lines(&[]), Err(CoreError::EmptyCart)));

        let ok = [CartLine::new(Money::from_paise(100), 2)];
        assert!(validate_cart_lines(&ok).is_ok());

        let zero = [CartLine::new(Money::from_paise(100), 0)];
        assert!(matches!(
            validate_cart_lines(&zero),
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));

        let huge = [CartLine::new(Money::from_paise(100), MAX_ITEM_QUANTITY + 1)];
        assert!(matches!(
            validate_cart_lines(&huge),
            Err(CoreError::QuantityTooLarge { .. })
        ));

        let pricey = [CartLine::new(Money::from_paise(4_611_686_018_427_387_903), 3)];
        assert!(matches!(
            validate_cart_lines(&pricey),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));

        let too_many = vec![CartLine::new(Money::from_paise(100), 1); MAX_CART_ITEMS + 1];
        assert!(matches!(
            validate_cart_lines(&too_many),
            Err(CoreError::CartTooLarge { .. })
        ));
    }
}
