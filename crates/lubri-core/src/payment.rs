//! # Payment Resolution
//!
//! Two pieces of payment math, both pure:
//!
//! - [`PaymentInput::resolve`] turns whatever payment configuration the
//!   counter sent at checkout into one canonical [`ResolvedPayment`].
//! - [`settle`] applies an additional payment to an existing bill.
//!
//! ## Checkout Input Shapes
//! ```text
//! "Cash"                                         → paid in full
//! {"mode": "UPI/Online"}                         → paid in full
//! {"mode": "Cash", "status": "Partial",
//!  "amountPaid": 10000, "balanceDue": 11240}     → paid 10000 of total
//! ```
//! `balanceDue` is accepted for compatibility but never trusted: the balance
//! is always recomputed from the server-side total.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{PaymentMode, PaymentStatus};

// =============================================================================
// Checkout Payment
// =============================================================================

/// Payment configuration with an explicit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentDetails {
    pub mode: PaymentMode,
    pub status: PaymentStatus,
    #[serde(default)]
    pub amount_paid: Option<Money>,
    #[serde(default)]
    pub balance_due: Option<Money>,
}

/// Payment configuration as supplied at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum PaymentInput {
    Detailed(PaymentDetails),
    Mode { mode: PaymentMode },
    Bare(PaymentMode),
}

impl Default for PaymentInput {
    fn default() -> Self {
        PaymentInput::Bare(PaymentMode::Cash)
    }
}

/// Canonical payment terms for a new bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResolvedPayment {
    pub mode: PaymentMode,
    pub status: PaymentStatus,
    pub amount_paid: Money,
    pub balance_due: Money,
}

impl PaymentInput {
    pub fn mode(&self) -> PaymentMode {
        match self {
            PaymentInput::Detailed(details) => details.mode,
            PaymentInput::Mode { mode } | PaymentInput::Bare(mode) => *mode,
        }
    }

    /// Resolves the payment against the bill's computed total.
    ///
    /// ## Rules
    /// - No status: paid in full
    /// - `Paid`: amount paid is the total, whatever the client sent
    /// - `Unpaid`: nothing paid
    /// - `Partial`: `amountPaid` is required and must lie in `0..=total`
    ///
    /// The status is then normalised from the amounts, so a partial payment
    /// of the full total comes back as `Paid` and one of zero as `Unpaid`.
    ///
    /// ## Example
    /// ```rust
    /// use lubri_core::money::Money;
    /// use lubri_core::payment::{PaymentDetails, PaymentInput};
    /// use lubri_core::types::{PaymentMode, PaymentStatus};
    ///
    /// let input = PaymentInput::Detailed(PaymentDetails {
    ///     mode: PaymentMode::Cash,
    ///     status: PaymentStatus::Partial,
    ///     amount_paid: Some(Money::from_paise(10000)),
    ///     balance_due: None,
    /// });
    /// let resolved = input.resolve(Money::from_paise(21240)).unwrap();
    /// assert_eq!(resolved.status, PaymentStatus::Partial);
    /// assert_eq!(resolved.balance_due.paise(), 11240);
    /// ```
    pub fn resolve(&self, total: Money) -> CoreResult<ResolvedPayment> {
        if total.is_negative() {
            return Err(CoreError::InvalidPaymentAmount {
                reason: format!("bill total {} is negative", total),
            });
        }

        let amount_paid = match self {
            PaymentInput::Mode { .. } | PaymentInput::Bare(_) => total,
            PaymentInput::Detailed(details) => match details.status {
                PaymentStatus::Paid => total,
                PaymentStatus::Unpaid => Money::zero(),
                PaymentStatus::Partial => {
                    let paid = details.amount_paid.ok_or_else(|| ValidationError::Required {
                        field: "amountPaid".to_string(),
                    })?;
                    if paid.is_negative() {
                        return Err(CoreError::InvalidPaymentAmount {
                            reason: "amount paid cannot be negative".to_string(),
                        });
                    }
                    if paid > total {
                        return Err(CoreError::InvalidPaymentAmount {
                            reason: format!("amount paid {} exceeds bill total {}", paid, total),
                        });
                    }
                    paid
                }
            },
        };

        let balance_due = total - amount_paid;
        Ok(ResolvedPayment {
            mode: self.mode(),
            status: PaymentStatus::from_amounts(amount_paid, balance_due),
            amount_paid,
            balance_due,
        })
    }
}

// =============================================================================
// Additional Payment
// =============================================================================

/// A bill's payment position after applying an additional payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentProgress {
    pub amount_paid: Money,
    pub balance_due: Money,
    pub status: PaymentStatus,
}

/// Applies `additional` to a bill that has `amount_paid` of `total` settled.
///
/// ## Rules
/// - `additional` must be positive
/// - `additional` must not exceed the current balance, which also rejects
///   any payment against a bill that is already `Paid`
///
/// ```text
/// total 21240, paid 10000, additional 11240
///      │
///      ▼
/// paid 21240, balance 0, Paid
/// ```
pub fn settle(total: Money, amount_paid: Money, additional: Money) -> CoreResult<PaymentProgress> {
    if !additional.is_positive() {
        return Err(CoreError::InvalidPaymentAmount {
            reason: "additional payment must be greater than zero".to_string(),
        });
    }

    let balance_due = (total - amount_paid).max_zero();
    if additional > balance_due {
        return Err(CoreError::PaymentExceedsBalance {
            balance_due,
            attempted: additional,
        });
    }

    let new_paid = amount_paid + additional;
    let new_balance = (total - new_paid).max_zero();
    let status = if new_balance.is_zero() {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Partial
    };

    Ok(PaymentProgress {
        amount_paid: new_paid,
        balance_due: new_balance,
        status,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn paise(v: i64) -> Money {
        Money::from_paise(v)
    }

    fn detailed(status: PaymentStatus, paid: Option<i64>) -> PaymentInput {
        PaymentInput::Detailed(PaymentDetails {
            mode: PaymentMode::Cash,
            status,
            amount_paid: paid.map(paise),
            balance_due: None,
        })
    }

    #[test]
    fn test_deserialize_all_shapes() {
        let bare: PaymentInput = serde_json::from_str(r#""UPI/Online""#).unwrap();
        assert_eq!(bare, PaymentInput::Bare(PaymentMode::UpiOnline));

        let mode: PaymentInput = serde_json::from_str(r#"{"mode":"Cash"}"#).unwrap();
        assert_eq!(mode, PaymentInput::Mode { mode: PaymentMode::Cash });

        let full: PaymentInput = serde_json::from_str(
            r#"{"mode":"Cash","status":"Partial","amountPaid":10000,"balanceDue":11240}"#,
        )
        .unwrap();
        assert_eq!(full, detailed(PaymentStatus::Partial, Some(10000)).with_balance(11240));
    }

    impl PaymentInput {
        fn with_balance(self, balance: i64) -> Self {
            match self {
                PaymentInput::Detailed(mut d) => {
                    d.balance_due = Some(paise(balance));
                    PaymentInput::Detailed(d)
                }
                other => other,
            }
        }
    }

    #[test]
    fn test_mode_only_is_paid_in_full() {
        let resolved = PaymentInput::Bare(PaymentMode::Card).resolve(paise(21240)).unwrap();
        assert_eq!(resolved.status, PaymentStatus::Paid);
        assert_eq!(resolved.amount_paid, paise(21240));
        assert_eq!(resolved.balance_due, Money::zero());
        assert_eq!(resolved.mode, PaymentMode::Card);
    }

    #[test]
    fn test_paid_ignores_client_amount() {
        let resolved = detailed(PaymentStatus::Paid, Some(1)).resolve(paise(21240)).unwrap();
        assert_eq!(resolved.amount_paid, paise(21240));
        assert_eq!(resolved.balance_due, Money::zero());
    }

    #[test]
    fn test_unpaid_owes_everything() {
        let resolved = detailed(PaymentStatus::Unpaid, Some(500)).resolve(paise(21240)).unwrap();
        assert_eq!(resolved.status, PaymentStatus::Unpaid);
        assert_eq!(resolved.amount_paid, Money::zero());
        assert_eq!(resolved.balance_due, paise(21240));
    }

    #[test]
    fn test_partial_recomputes_balance() {
        let input = detailed(PaymentStatus::Partial, Some(10000)).with_balance(1);
        let resolved = input.resolve(paise(21240)).unwrap();
        assert_eq!(resolved.status, PaymentStatus::Partial);
        assert_eq!(resolved.amount_paid, paise(10000));
        assert_eq!(resolved.balance_due, paise(11240));
    }

    #[test]
    fn test_partial_is_normalised() {
        let full = detailed(PaymentStatus::Partial, Some(21240)).resolve(paise(21240)).unwrap();
        assert_eq!(full.status, PaymentStatus::Paid);

        let none = detailed(PaymentStatus::Partial, Some(0)).resolve(paise(21240)).unwrap();
        assert_eq!(none.status, PaymentStatus::Unpaid);
    }

    #[test]
    fn test_partial_rejects_bad_amounts() {
        assert!(matches!(
            detailed(PaymentStatus::Partial, None).resolve(paise(100)),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
        assert!(matches!(
            detailed(PaymentStatus::Partial, Some(-1)).resolve(paise(100)),
            Err(CoreError::InvalidPaymentAmount { .. })
        ));
        assert!(matches!(
            detailed(PaymentStatus::Partial, Some(101)).resolve(paise(100)),
            Err(CoreError::InvalidPaymentAmount { .. })
        ));
    }

    #[test]
    fn test_zero_total_is_paid() {
        let resolved = detailed(PaymentStatus::Unpaid, None).resolve(Money::zero()).unwrap();
        assert_eq!(resolved.status, PaymentStatus::Paid);
        assert_eq!(resolved.balance_due, Money::zero());
    }

    #[test]
    fn test_settle_partial_then_full() {
        let step = settle(paise(21240), paise(5000), paise(5000)).unwrap();
        assert_eq!(step.amount_paid, paise(10000));
        assert_eq!(step.balance_due, paise(11240));
        assert_eq!(step.status, PaymentStatus::Partial);

        let done = settle(paise(21240), step.amount_paid, paise(11240)).unwrap();
        assert_eq!(done.balance_due, Money::zero());
        assert_eq!(done.status, PaymentStatus::Paid);
        assert_eq!(done.amount_paid + done.balance_due, paise(21240));
    }

    #[test]
    fn test_settle_rejects_non_positive() {
        assert!(matches!(
            settle(paise(100), Money::zero(), Money::zero()),
            Err(CoreError::InvalidPaymentAmount { .. })
        ));
        assert!(matches!(
            settle(paise(100), Money::zero(), paise(-5)),
            Err(CoreError::InvalidPaymentAmount { .. })
        ));
    }

    #[test]
    fn test_settle_rejects_overpayment() {
        let err = settle(paise(21240), paise(10000), paise(20000)).unwrap_err();
        match err {
            CoreError::PaymentExceedsBalance { balance_due, attempted } => {
                assert_eq!(balance_due, paise(11240));
                assert_eq!(attempted, paise(20000));
            }
            other => panic!("unexpected error: {other}"),
        }

        // Nothing left to pay on a settled bill.
        assert!(settle(paise(100), paise(100), paise(1)).is_err());
    }
}
