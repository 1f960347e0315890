//! # Return/Refund Service
//!
//! Takes goods back against an existing bill. The original bill item is
//! never touched; a return is its own row.
//!
//! ## Checks (all inside the transaction)
//! ```text
//! bill exists ─────────────────────────────── BillNotFound
//! product sold on this bill ───────────────── ProductNotOnBill
//! already_returned + quantity <= sold ─────── ReturnExceedsSold
//! already_refunded + refund <= charged ────── RefundExceedsValue
//! ```
//!
//! Then: return row, stock back on the shelf, and a ledger credit for the
//! refund when the bill belongs to a customer.

use chrono::Utc;
use lubri_core::validation::{validate_price, validate_quantity};
use lubri_core::{CoreError, LedgerEntryType, Money, ProductReturn};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::bill::BillRepository;
use crate::repository::ledger::{LedgerPosting, LedgerRepository};
use crate::repository::product::ProductRepository;
use crate::repository::returns::{ReturnRepository, ReturnRow};

/// A return as entered at the counter.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub bill_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub refund_amount: Money,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReturnService {
    pool: SqlitePool,
}

impl ReturnService {
    pub fn new(pool: SqlitePool) -> Self {
        ReturnService { pool }
    }

    pub async fn process_return(&self, request: &ReturnRequest) -> DbResult<ProductReturn> {
        validate_quantity(request.quantity)?;
        validate_price("refund amount", request.refund_amount)?;
        let reason = request
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let bill = BillRepository::fetch(&mut *tx, request.bill_id)
            .await?
            .ok_or(CoreError::BillNotFound(request.bill_id))?;

        let sold_product = BillRepository::sold_product(&mut *tx, &bill, request.product_id).await?;
        let sold = sold_product.quantity;
        if sold == 0 {
            return Err(CoreError::ProductNotOnBill {
                bill_id: bill.id,
                product_id: request.product_id,
            }
            .into());
        }

        let already_returned =
            ReturnRepository::returned_quantity(&mut *tx, bill.id, request.product_id).await?;
        if already_returned + request.quantity > sold {
            warn!(
                bill_id = bill.id,
                product_id = request.product_id,
                sold,
                already_returned,
                requested = request.quantity,
                "Return rejected"
            );
            return Err(CoreError::ReturnExceedsSold {
                bill_id: bill.id,
                product_id: request.product_id,
                sold,
                already_returned,
                requested: request.quantity,
            }
            .into());
        }

        let refunded =
            ReturnRepository::refunded_amount(&mut *tx, bill.id, request.product_id).await?;
        let refundable = (sold_product.charged - refunded).max_zero();
        if request.refund_amount > refundable {
            warn!(
                bill_id = bill.id,
                product_id = request.product_id,
                charged = %sold_product.charged,
                refunded = %refunded,
                requested = %request.refund_amount,
                "Refund rejected"
            );
            return Err(CoreError::RefundExceedsValue {
                bill_id: bill.id,
                product_id: request.product_id,
                refundable,
                requested: request.refund_amount,
            }
            .into());
        }

        let now = Utc::now();
        let record = ReturnRepository::insert(
            &mut *tx,
            &ReturnRow {
                bill_id: bill.id,
                product_id: request.product_id,
                quantity: request.quantity,
                refund_amount: request.refund_amount,
                reason: reason.clone(),
                date: now,
            },
        )
        .await?;

        ProductRepository::increment_stock(&mut *tx, request.product_id, request.quantity).await?;

        if let Some(customer_id) = bill.customer_id {
            if request.refund_amount.is_positive() {
                let description = match &reason {
                    Some(reason) => format!("Return on Bill #{}: {}", bill.id, reason),
                    None => format!("Return on Bill #{}", bill.id),
                };
                LedgerRepository::append(
                    &mut *tx,
                    &LedgerPosting {
                        customer_id,
                        bill_id: Some(bill.id),
                        entry_type: LedgerEntryType::Credit,
                        amount: request.refund_amount,
                        description,
                        date: now,
                    },
                )
                .await?;
            }
        }

        tx.commit().await.map_err(DbError::transaction)?;

        info!(
            return_id = record.id,
            bill_id = bill.id,
            product_id = request.product_id,
            quantity = request.quantity,
            refund = %request.refund_amount,
            "Return processed"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::checkout::{BillItemInput, CreatedBill, CustomerInput, NewBill};
    use crate::service::testing::{count, setup, stock_product};
    use crate::Database;
    use lubri_core::{
        CalculationMode, Discount, DiscountType, PaymentDetails, PaymentInput, PaymentMode,
        PaymentStatus, Product, Rate,
    };

    async fn sell(db: &Database, product: &Product, quantity: i64, phone: Option<&str>) -> CreatedBill {
        let input = NewBill {
            employee_id: None,
            seller_name: "Owner".to_string(),
            customer: phone.map(|p| CustomerInput {
                name: "Kumar".to_string(),
                phone: Some(p.to_string()),
            }),
            items: vec![BillItemInput {
                product_id: product.id,
                quantity,
                unit_price: product.price,
                batch_number: None,
                discount_value: 0,
                discount_type: DiscountType::Amount,
                tax_rate: Rate::zero(),
            }],
            mode: CalculationMode::Global,
            global_discount: Discount::percent(1000),
            global_tax_rate: Rate::from_bps(1800),
            // Walk-ins pay in full; customers leave part of it on account
            payment: match phone {
                Some(_) => PaymentInput::Detailed(PaymentDetails {
                    mode: PaymentMode::Cash,
                    status: PaymentStatus::Partial,
                    amount_paid: Some(Money::from_paise(10000)),
                    balance_due: None,
                }),
                None => PaymentInput::default(),
            },
        };
        db.checkout().create_bill(&input).await.unwrap()
    }

    fn request(bill_id: i64, product_id: i64, quantity: i64, refund: i64) -> ReturnRequest {
        ReturnRequest {
            bill_id,
            product_id,
            quantity,
            refund_amount: Money::from_paise(refund),
            reason: Some("defective".to_string()),
        }
    }

    #[tokio::test]
    async fn test_return_restocks_and_credits() {
        let db = setup().await;
        let oil = stock_product(&db, "Engine Oil 20W-40", 10, 10000).await;
        let created = sell(&db, &oil, 2, Some("9999999999")).await;

        let record = db
            .refunds()
            .process_return(&request(created.bill_id, oil.id, 1, 10620))
            .await
            .unwrap();
        assert_eq!(record.reason.as_deref(), Some("defective"));

        assert_eq!(db.products().get_by_id(oil.id).await.unwrap().unwrap().quantity, 9);

        let ledger = db.ledger().list_for_customer(created.customer_id.unwrap()).await.unwrap();
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger[0].entry_type, LedgerEntryType::Credit);
        assert_eq!(ledger[0].amount, Money::from_paise(10620));
        assert_eq!(ledger[0].balance, Money::from_paise(-11240 + 10620));

        // The sale itself is untouched
        let bill = db.bills().get_record(created.bill_id).await.unwrap().unwrap();
        assert_eq!(bill.items[0].item.quantity, 2);
        assert_eq!(bill.returns.len(), 1);
    }

    #[tokio::test]
    async fn test_stock_is_conserved() {
        let db = setup().await;
        let oil = stock_product(&db, "Gear Oil", 20, 10000).await;

        let first = sell(&db, &oil, 5, None).await;
        let second = sell(&db, &oil, 3, None).await;
        db.refunds().process_return(&request(first.bill_id, oil.id, 2, 0)).await.unwrap();
        db.refunds().process_return(&request(second.bill_id, oil.id, 3, 0)).await.unwrap();
        let _third = sell(&db, &oil, 4, None).await;

        // 20 - (5 + 3 + 4) + (2 + 3)
        assert_eq!(db.products().get_by_id(oil.id).await.unwrap().unwrap().quantity, 13);
    }

    #[tokio::test]
    async fn test_cannot_return_more_than_sold() {
        let db = setup().await;
        let oil = stock_product(&db, "Coolant", 10, 10000).await;
        let created = sell(&db, &oil, 2, Some("9999999999")).await;

        db.refunds().process_return(&request(created.bill_id, oil.id, 1, 100)).await.unwrap();
        let err = db
            .refunds()
            .process_return(&request(created.bill_id, oil.id, 2, 100))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Core(CoreError::ReturnExceedsSold { sold: 2, already_returned: 1, requested: 2, .. })
        ));
        assert_eq!(count(&db, "returns").await, 1);
        assert_eq!(db.products().get_by_id(oil.id).await.unwrap().unwrap().quantity, 9);
    }

    #[tokio::test]
    async fn test_refund_cannot_exceed_charged_value() {
        let db = setup().await;
        let oil = stock_product(&db, "Engine Oil", 10, 10000).await;
        // 2 x 10000, less 10%, plus 18% tax = 21240 charged
        let created = sell(&db, &oil, 2, Some("9999999999")).await;

        let err = db
            .refunds()
            .process_return(&request(created.bill_id, oil.id, 1, 21241))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::RefundExceedsValue { refundable, requested, .. })
                if refundable == Money::from_paise(21240) && requested == Money::from_paise(21241)
        ));

        // Far beyond any price the till accepts
        let err = db
            .refunds()
            .process_return(&request(created.bill_id, oil.id, 1, i64::MAX / 2 + 10))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));

        db.refunds().process_return(&request(created.bill_id, oil.id, 1, 15000)).await.unwrap();
        let err = db
            .refunds()
            .process_return(&request(created.bill_id, oil.id, 1, 6241))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::RefundExceedsValue { refundable, .. }) if refundable == Money::from_paise(6240)
        ));

        assert_eq!(count(&db, "returns").await, 1);
        // Debit, payment credit, one refund credit
        assert_eq!(count(&db, "customer_ledger").await, 3);
        assert_eq!(db.products().get_by_id(oil.id).await.unwrap().unwrap().quantity, 9);

        db.refunds().process_return(&request(created.bill_id, oil.id, 1, 6240)).await.unwrap();
        let ledger = db.ledger().list_for_customer(created.customer_id.unwrap()).await.unwrap();
        assert_eq!(ledger[0].balance, Money::from_paise(-11240 + 21240));
    }

    #[tokio::test]
    async fn test_product_must_be_on_bill() {
        let db = setup().await;
        let sold = stock_product(&db, "Coolant", 10, 10000).await;
        let other = stock_product(&db, "Brake Fluid", 10, 10000).await;
        let created = sell(&db, &sold, 1, None).await;

        let err = db
            .refunds()
            .process_return(&request(created.bill_id, other.id, 1, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::ProductNotOnBill { .. })));

        let err = db.refunds().process_return(&request(999, sold.id, 1, 0)).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::BillNotFound(999))));
    }

    #[tokio::test]
    async fn test_invalid_requests_are_rejected() {
        let db = setup().await;
        let oil = stock_product(&db, "Coolant", 10, 10000).await;
        let created = sell(&db, &oil, 2, None).await;

        assert!(db.refunds().process_return(&request(created.bill_id, oil.id, 0, 0)).await.is_err());
        assert!(db.refunds().process_return(&request(created.bill_id, oil.id, 1, -5)).await.is_err());
        assert_eq!(count(&db, "returns").await, 0);
    }

    #[tokio::test]
    async fn test_walk_in_return_has_no_ledger() {
        let db = setup().await;
        let oil = stock_product(&db, "Coolant", 10, 10000).await;
        let created = sell(&db, &oil, 2, None).await;

        db.refunds().process_return(&request(created.bill_id, oil.id, 2, 20000)).await.unwrap();
        assert_eq!(count(&db, "customer_ledger").await, 0);
        assert_eq!(db.products().get_by_id(oil.id).await.unwrap().unwrap().quantity, 10);
    }
}
