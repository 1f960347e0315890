//! # Bill Calculation Engine
//!
//! Turns a cart plus discount/tax configuration into a fully resolved
//! monetary breakdown. Pure: no I/O, no clock, no randomness.
//!
//! ## Two Mutually Exclusive Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GLOBAL                                ITEMIZED                         │
//! │  ──────                                ────────                         │
//! │  subtotal = Σ price × qty              subtotal = Σ price × qty         │
//! │  discount = resolve(global, subtotal)  discount = Σ line discount       │
//! │  after    = max(0, subtotal - disc)    tax      = Σ line tax            │
//! │  tax      = after × global rate        total    = Σ line total          │
//! │  total    = after + tax                                                 │
//! │                                                                         │
//! │  line discount/tax ignored             global discount/tax ignored      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The mode is carried by [`BillingMode`], so the global fields only exist
//! when the mode is global. Mixing the two sets is unrepresentable.
//!
//! ## Per-Line Resolution
//! ```text
//! base  = price × quantity
//! disc  = percent ? base × value / 100 : value
//! after = max(0, base - disc)
//! tax   = after × rate / 100
//! total = after + tax
//! ```
//! Lines are resolved in both modes so the receipt can show them, but only
//! itemized mode sums them into the bill.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CalculationMode, Discount, Rate};

// =============================================================================
// Inputs
// =============================================================================

/// One cart line as the engine sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub unit_price: Money,
    pub quantity: i64,
    /// Only authoritative in itemized mode.
    #[serde(default)]
    pub discount: Discount,
    /// Only authoritative in itemized mode.
    #[serde(default)]
    pub tax_rate: Rate,
}

impl CartLine {
    pub fn new(unit_price: Money, quantity: i64) -> Self {
        CartLine {
            unit_price,
            quantity,
            discount: Discount::none(),
            tax_rate: Rate::zero(),
        }
    }

    pub fn with_discount(mut self, discount: Discount) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_tax_rate(mut self, tax_rate: Rate) -> Self {
        self.tax_rate = tax_rate;
        self
    }
}

/// The authoritative set of discount/tax fields for a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingMode {
    Global { discount: Discount, tax_rate: Rate },
    Itemized,
}

impl BillingMode {
    /// Builds the mode from the flat fields a checkout request carries.
    ///
    /// In itemized mode the global fields are dropped here, before they can
    /// reach any calculation.
    pub fn from_parts(mode: CalculationMode, discount: Discount, tax_rate: Rate) -> Self {
        match mode {
            CalculationMode::Global => BillingMode::Global { discount, tax_rate },
            CalculationMode::Itemized => BillingMode::Itemized,
        }
    }

    pub fn calculation_mode(&self) -> CalculationMode {
        match self {
            BillingMode::Global { .. } => CalculationMode::Global,
            BillingMode::Itemized => CalculationMode::Itemized,
        }
    }

    /// The bill-level discount as stored on the bill header.
    pub fn bill_discount(&self) -> Discount {
        match self {
            BillingMode::Global { discount, .. } => *discount,
            BillingMode::Itemized => Discount::none(),
        }
    }

    /// The bill-level tax rate as stored on the bill header.
    pub fn bill_tax_rate(&self) -> Rate {
        match self {
            BillingMode::Global { tax_rate, .. } => *tax_rate,
            BillingMode::Itemized => Rate::zero(),
        }
    }
}

// =============================================================================
// Outputs
// =============================================================================

/// A resolved cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineBreakdown {
    pub base: Money,
    pub discount: Money,
    pub after_discount: Money,
    pub tax: Money,
    pub total: Money,
}

/// The resolved bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillTotals {
    pub mode: CalculationMode,
    pub subtotal: Money,
    pub discount: Money,
    pub after_discount: Money,
    pub tax: Money,
    pub total: Money,
    pub lines: Vec<LineBreakdown>,
}

// =============================================================================
// Calculation
// =============================================================================

/// Resolves a single line with its own discount and tax rate.
///
/// ## Example
/// ```rust
/// use lubri_core::billing::{calculate_line, CartLine};
/// use lubri_core::money::Money;
/// use lubri_core::types::{Discount, Rate};
///
/// let line = CartLine::new(Money::from_paise(10000), 2)
///     .with_discount(Discount::percent(1000))
///     .with_tax_rate(Rate::from_bps(1800));
///
/// let b = calculate_line(&line);
/// assert_eq!(b.base.paise(), 20000);
/// assert_eq!(b.discount.paise(), 2000);
/// assert_eq!(b.tax.paise(), 3240);
/// assert_eq!(b.total.paise(), 21240);
/// ```
pub fn calculate_line(line: &CartLine) -> LineBreakdown {
    let base = line.unit_price.multiply_quantity(line.quantity);
    let discount = line.discount.resolve(base);
    let after_discount = (base - discount).max_zero();
    let tax = after_discount.calculate_tax(line.tax_rate);

    LineBreakdown {
        base,
        discount,
        after_discount,
        tax,
        total: after_discount + tax,
    }
}

/// Resolves a whole bill under the given mode.
///
/// Deterministic: the same lines and mode always give the same totals.
///
/// Callers validate first (`validate_cart_lines`, `validate_billing_mode`);
/// within those limits no intermediate sum can leave `i64`.
pub fn calculate_bill(lines: &[CartLine], mode: &BillingMode) -> BillTotals {
    let breakdowns: Vec<LineBreakdown> = lines.iter().map(calculate_line).collect();
    let subtotal: Money = breakdowns.iter().map(|b| b.base).sum();

    match mode {
        BillingMode::Global { discount, tax_rate } => {
            let discount = discount.resolve(subtotal);
            let after_discount = (subtotal - discount).max_zero();
            let tax = after_discount.calculate_tax(*tax_rate);

            BillTotals {
                mode: CalculationMode::Global,
                subtotal,
                discount,
                after_discount,
                tax,
                total: after_discount + tax,
                lines: breakdowns,
            }
        }
        BillingMode::Itemized => {
            let discount: Money = breakdowns.iter().map(|b| b.discount).sum();
            let after_discount: Money = breakdowns.iter().map(|b| b.after_discount).sum();
            let tax: Money = breakdowns.iter().map(|b| b.tax).sum();
            let total: Money = breakdowns.iter().map(|b| b.total).sum();

            BillTotals {
                mode: CalculationMode::Itemized,
                subtotal,
                discount,
                after_discount,
                tax,
                total,
                lines: breakdowns,
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
