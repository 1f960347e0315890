//! # Bill Commands
//!
//! The billing screen's preview, checkout itself, bill history, and the two
//! follow-up actions on an existing bill (payments and returns).
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  preview_bill   (every cart edit, no writes)                           │
//! │       │  validate lines ──► calculate_bill ──► BillTotals              │
//! │       ▼                                                                 │
//! │  create_bill    (Save & Print)                                          │
//! │       │  BillingCoordinator: one transaction                           │
//! │       ▼                                                                 │
//! │  get_bill       (receipt reprint, history detail)                       │
//! │       │                                                                 │
//! │       ├──► record_payment   settle part of the balance                 │
//! │       └──► process_return   restock and refund one product             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The preview and the saved bill run the same engine, so the totals the
//! counter sees are the totals that get stored.

use lubri_core::validation::{validate_billing_mode, validate_cart_lines};
use lubri_core::{
    calculate_bill, BillRecord, BillTotals, BillingMode, CalculationMode, CartLine, CoreError, Discount, Money,
    PaymentMode, PaymentStatus, ProductReturn, Rate,
};
use lubri_db::service::checkout::BillItemInput;
use lubri_db::{BillFilter, CreatedBill, NewBill, ReturnRequest};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::DbState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewBillArgs {
    pub items: Vec<BillItemInput>,
    #[serde(default)]
    pub mode: CalculationMode,
    #[serde(default)]
    pub global_discount: Discount,
    #[serde(default)]
    pub global_tax_rate: Rate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBillArgs {
    pub bill_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentArgs {
    pub bill_id: i64,
    pub amount: Money,
    #[serde(default)]
    pub payment_mode: PaymentMode,
}

/// Outcome of a payment, shaped for the settle-up dialog.
#[derive(Debug, Serialize)]
pub struct PaymentRecorded {
    pub bill_id: i64,
    pub amount_paid: Money,
    pub balance_due: Money,
    pub payment_status: PaymentStatus,
}

/// Live totals for the cart. Nothing is written.
pub fn preview_bill(args: PreviewBillArgs) -> Result<BillTotals, ApiError> {
    let lines: Vec<CartLine> = args.items.iter().map(BillItemInput::cart_line).collect();
    validate_cart_lines(&lines)?;

    let mode = BillingMode::from_parts(args.mode, args.global_discount, args.global_tax_rate);
    validate_billing_mode(&mode).map_err(CoreError::from)?;
    Ok(calculate_bill(&lines, &mode))
}

pub async fn create_bill(db: &DbState, bill: NewBill) -> Result<CreatedBill, ApiError> {
    let created = db.inner().checkout().create_bill(&bill).await?;
    info!(
        bill_id = created.bill_id,
        total = %created.totals.total,
        status = ?created.payment.status,
        "Bill saved"
    );
    Ok(created)
}

pub async fn get_bill(db: &DbState, args: GetBillArgs) -> Result<BillRecord, ApiError> {
    db.inner()
        .bills()
        .get_record(args.bill_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bill", args.bill_id))
}

/// Bill history with the optional filters combined by AND.
pub async fn get_bills(db: &DbState, filter: BillFilter) -> Result<Vec<BillRecord>, ApiError> {
    if let (Some(min), Some(max)) = (filter.min_price, filter.max_price) {
        if min > max {
            return Err(ApiError::validation(format!(
                "minimum price {} is above maximum price {}",
                min, max
            )));
        }
    }

    let bills = db.inner().bills().list(&filter).await?;
    debug!(count = bills.len(), "Bills listed");
    Ok(bills)
}

pub async fn record_payment(db: &DbState, args: RecordPaymentArgs) -> Result<PaymentRecorded, ApiError> {
    let bill = db
        .inner()
        .payments()
        .record_payment(args.bill_id, args.amount, args.payment_mode)
        .await?;

    Ok(PaymentRecorded {
        bill_id: bill.id,
        amount_paid: bill.amount_paid,
        balance_due: bill.balance_due,
        payment_status: bill.payment_status,
    })
}

pub async fn process_return(db: &DbState, request: ReturnRequest) -> Result<ProductReturn, ApiError> {
    Ok(db.inner().refunds().process_return(&request).await?)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn preview_args(json: &str) -> PreviewBillArgs {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_preview_global_mode() {
        let totals = preview_bill(preview_args(
            r#"{
                "items": [{"productId": 1, "quantity": 2, "unitPrice": 10000}],
                "mode": "global",
                "globalDiscount": {"value": 1000, "type": "percent"},
                "globalTaxRate": 1800
            }"#,
        ))
        .unwrap();

        assert_eq!(totals.subtotal, Money::from_paise(20000));
        assert_eq!(totals.discount, Money::from_paise(2000));
        assert_eq!(totals.tax, Money::from_paise(3240));
        assert_eq!(totals.total, Money::from_paise(21240));
    }

    #[test]
    fn test_preview_rejects_bad_lines() {
        let err = preview_bill(preview_args(
            r#"{"items": [{"productId": 1, "quantity": 0, "unitPrice": 100}]}"#,
        ))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = preview_bill(preview_args(r#"{"items": []}"#)).unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[test]
    fn test_preview_rejects_out_of_range_terms() {
        let err = preview_bill(preview_args(
            r#"{"items": [{"productId": 1, "quantity": 3, "unitPrice": 4611686018427387903}]}"#,
        ))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = preview_bill(preview_args(
            r#"{
                "items": [{"productId": 1, "quantity": 1, "unitPrice": 100}],
                "globalDiscount": {"value": -9223372036854775807, "type": "amount"}
            }"#,
        ))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = preview_bill(preview_args(
            r#"{
                "items": [{"productId": 1, "quantity": 1, "unitPrice": 100}],
                "globalTaxRate": 20000
            }"#,
        ))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
