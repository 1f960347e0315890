//! # Billing Transaction Coordinator
//!
//! Checkout: turns a cart into a committed bill.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  NewBill (from the counter)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate lines, seller, global terms          (no transaction yet)    │
//! │  calculate_bill(lines, mode) → BillTotals                              │
//! │  payment.resolve(total)      → ResolvedPayment                         │
//! │  balance left owing needs a customer phone                             │
//! │       │                                                                 │
//! │       ▼  BEGIN                                                          │
//! │  1. customer upsert by phone (walk-in: none)                           │
//! │  2. bill header                                                        │
//! │  3. first payment, if anything was paid                                │
//! │  4. per line: re-read product, freeze item, guarded stock decrement    │
//! │  5. ledger: debit total, credit amount paid                            │
//! │       │                                                                 │
//! │       ▼  COMMIT                                                         │
//! │  CreatedBill { bill_id, totals, payment }                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cost basis of each line is always read from the product row inside
//! the transaction; the request has no field for it.

use chrono::Utc;
use lubri_core::validation::{validate_billing_mode, validate_cart_lines, validate_name};
use lubri_core::{
    calculate_bill, BillTotals, BillingMode, CalculationMode, CartLine, CoreError, Discount,
    DiscountType, LedgerEntryType, Money, PaymentInput, Rate, ResolvedPayment,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::bill::{BillHeader, BillLine, BillRepository};
use crate::repository::customer::CustomerRepository;
use crate::repository::ledger::{LedgerPosting, LedgerRepository};
use crate::repository::product::ProductRepository;

// =============================================================================
// Request
// =============================================================================

/// Customer details typed at the counter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl CustomerInput {
    /// The phone number, if one was actually entered.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }
}

/// One cart line as sent by the counter.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillItemInput {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
    #[serde(default)]
    pub batch_number: Option<String>,
    #[serde(default)]
    pub discount_value: i64,
    #[serde(default)]
    pub discount_type: DiscountType,
    #[serde(default)]
    pub tax_rate: Rate,
}

impl BillItemInput {
    pub fn discount(&self) -> Discount {
        Discount {
            value: self.discount_value,
            kind: self.discount_type,
        }
    }

    pub fn cart_line(&self) -> CartLine {
        CartLine::new(self.unit_price, self.quantity)
            .with_discount(self.discount())
            .with_tax_rate(self.tax_rate)
    }
}

/// A checkout request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBill {
    /// `None` when the owner sold it.
    #[serde(default)]
    pub employee_id: Option<i64>,
    pub seller_name: String,
    #[serde(default)]
    pub customer: Option<CustomerInput>,
    pub items: Vec<BillItemInput>,
    #[serde(default)]
    pub mode: CalculationMode,
    /// Ignored in itemized mode.
    #[serde(default)]
    pub global_discount: Discount,
    /// Ignored in itemized mode.
    #[serde(default)]
    pub global_tax_rate: Rate,
    #[serde(default)]
    pub payment: PaymentInput,
}

impl NewBill {
    pub fn billing_mode(&self) -> BillingMode {
        BillingMode::from_parts(self.mode, self.global_discount, self.global_tax_rate)
    }

    pub fn cart_lines(&self) -> Vec<CartLine> {
        self.items.iter().map(BillItemInput::cart_line).collect()
    }
}

/// What checkout hands back for the receipt.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedBill {
    pub bill_id: i64,
    pub customer_id: Option<i64>,
    pub totals: BillTotals,
    pub payment: ResolvedPayment,
}

// =============================================================================
// Coordinator
// =============================================================================

#[derive(Debug, Clone)]
pub struct BillingCoordinator {
    pool: SqlitePool,
}

impl BillingCoordinator {
    pub fn new(pool: SqlitePool) -> Self {
        BillingCoordinator { pool }
    }

    /// Creates a bill atomically.
    ///
    /// ## Errors
    /// - `EmptyCart`, `QuantityTooLarge`, `Validation`: rejected before any write
    /// - `InvalidPaymentAmount`: partial payment outside `0..=total`
    /// - `CustomerRequired`: something left owing on a walk-in bill
    /// - `ProductNotFound`: unknown or deactivated product
    /// - `InsufficientStock`: the guarded decrement matched no row
    ///
    /// Any error after the transaction opened leaves the database untouched.
    pub async fn create_bill(&self, input: &NewBill) -> DbResult<CreatedBill> {
        let lines = input.cart_lines();
        validate_cart_lines(&lines)?;
        validate_name("seller name", &input.seller_name)?;

        let mode = input.billing_mode();
        validate_billing_mode(&mode)?;

        let totals = calculate_bill(&lines, &mode);
        let payment = input.payment.resolve(totals.total)?;
        let phone = input.customer.as_ref().and_then(CustomerInput::phone);
        if phone.is_none() && payment.balance_due.is_positive() {
            warn!(balance_due = %payment.balance_due, "Checkout rejected: credit without a customer");
            return Err(CoreError::CustomerRequired {
                balance_due: payment.balance_due,
            }
            .into());
        }
        let now = Utc::now();

        debug!(
            lines = lines.len(),
            mode = ?totals.mode,
            total = %totals.total,
            status = ?payment.status,
            "Checkout validated"
        );

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        // 1. Customer
        let customer_id = match (input.customer.as_ref(), phone) {
            (Some(customer), Some(phone)) => {
                Some(CustomerRepository::upsert_by_phone(&mut *tx, &customer.name, phone).await?)
            }
            _ => None,
        };

        // 2. Header
        let header = BillHeader {
            date: now,
            employee_id: input.employee_id,
            customer_id,
            seller_name: input.seller_name.trim().to_string(),
            payment_mode: payment.mode,
            total_amount: totals.total,
            discount: mode.bill_discount(),
            discount_amount: totals.discount,
            tax_rate: mode.bill_tax_rate(),
            tax_amount: totals.tax,
            calculation_mode: totals.mode,
            payment_status: payment.status,
            amount_paid: payment.amount_paid,
            balance_due: payment.balance_due,
        };
        let bill_id = BillRepository::insert_header(&mut *tx, &header).await?;

        // 3. First payment
        if payment.amount_paid.is_positive() {
            BillRepository::insert_payment(&mut *tx, bill_id, payment.amount_paid, now, payment.mode)
                .await?;
        }

        // 4. Items and stock
        for item in &input.items {
            let product = ProductRepository::fetch(&mut *tx, item.product_id)
                .await?
                .filter(|p| p.is_active)
                .ok_or(CoreError::ProductNotFound(item.product_id))?;

            let line = BillLine {
                product_id: product.id,
                quantity: item.quantity,
                price_at_sale: item.unit_price,
                unit_cost_at_sale: product.unit_cost,
                batch_number: item.batch_number.clone().or_else(|| product.batch_number.clone()),
                discount: item.discount(),
                tax_rate: item.tax_rate,
            };
            BillRepository::insert_line(&mut *tx, bill_id, &line).await?;

            if !ProductRepository::decrement_stock(&mut *tx, product.id, item.quantity).await? {
                let available = ProductRepository::fetch(&mut *tx, product.id)
                    .await?
                    .filter(|p| p.is_active)
                    .ok_or(CoreError::ProductNotFound(product.id))?
                    .quantity;
                warn!(
                    product_id = product.id,
                    available,
                    requested = item.quantity,
                    "Checkout rejected: insufficient stock"
                );
                return Err(CoreError::InsufficientStock {
                    product_id: product.id,
                    name: product.name,
                    available,
                    requested: item.quantity,
                }
                .into());
            }
        }

        // 5. Ledger
        if let Some(customer_id) = customer_id {
            LedgerRepository::append(
                &mut *tx,
                &LedgerPosting {
                    customer_id,
                    bill_id: Some(bill_id),
                    entry_type: LedgerEntryType::Debit,
                    amount: totals.total,
                    description: format!("Bill #{bill_id}"),
                    date: now,
                },
            )
            .await?;

            if payment.amount_paid.is_positive() {
                LedgerRepository::append(
                    &mut *tx,
                    &LedgerPosting {
                        customer_id,
                        bill_id: Some(bill_id),
                        entry_type: LedgerEntryType::Credit,
                        amount: payment.amount_paid,
                        description: format!("Payment for Bill #{bill_id} ({})", payment.mode),
                        date: now,
                    },
                )
                .await?;
            }
        }

        tx.commit().await.map_err(DbError::transaction)?;

        info!(
            bill_id,
            customer_id,
            total = %totals.total,
            paid = %payment.amount_paid,
            status = ?payment.status,
            "Bill created"
        );

        Ok(CreatedBill {
            bill_id,
            customer_id,
            totals,
            payment,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{count, setup, stock_product};
    use lubri_core::{PaymentDetails, PaymentMode, PaymentStatus};

    fn item(product_id: i64, quantity: i64, price: i64) -> BillItemInput {
        BillItemInput {
            product_id,
            quantity,
            unit_price: Money::from_paise(price),
            batch_number: None,
            discount_value: 0,
            discount_type: DiscountType::Amount,
            tax_rate: Rate::zero(),
        }
    }

    fn bill(items: Vec<BillItemInput>) -> NewBill {
        NewBill {
            employee_id: None,
            seller_name: "Owner".to_string(),
            customer: None,
            items,
            mode: CalculationMode::Global,
            global_discount: Discount::none(),
            global_tax_rate: Rate::zero(),
            payment: PaymentInput::default(),
        }
    }

    fn partial(paid: i64) -> PaymentInput {
        PaymentInput::Detailed(PaymentDetails {
            mode: PaymentMode::Cash,
            status: PaymentStatus::Partial,
            amount_paid: Some(Money::from_paise(paid)),
            balance_due: None,
        })
    }

    fn kumar() -> Option<CustomerInput> {
        Some(CustomerInput {
            name: "Kumar".to_string(),
            phone: Some("9999999999".to_string()),
        })
    }

    #[tokio::test]
    async fn test_walk_in_cash_bill() {
        let db = setup().await;
        let oil = stock_product(&db, "Engine Oil 20W-40", 10, 10000).await;

        let created = db.checkout().create_bill(&bill(vec![item(oil.id, 2, 10000)])).await.unwrap();

        assert_eq!(created.customer_id, None);
        assert_eq!(created.totals.total, Money::from_paise(20000));
        assert_eq!(created.payment.status, PaymentStatus::Paid);

        let record = db.bills().get_record(created.bill_id).await.unwrap().unwrap();
        assert_eq!(record.bill.amount_paid, Money::from_paise(20000));
        assert_eq!(record.bill.balance_due, Money::zero());
        assert_eq!(record.items.len(), 1);
        assert_eq!(record.items[0].product_name, "Engine Oil 20W-40");
        assert_eq!(record.items[0].item.unit_cost_at_sale, Money::from_paise(7500));
        assert_eq!(record.items[0].item.batch_number.as_deref(), Some("LOT-7"));
        assert_eq!(record.payments.len(), 1);

        assert_eq!(db.products().get_by_id(oil.id).await.unwrap().unwrap().quantity, 8);
        assert_eq!(count(&db, "customer_ledger").await, 0);
    }

    #[tokio::test]
    async fn test_global_bill_with_partial_payment_posts_ledger() {
        let db = setup().await;
        let oil = stock_product(&db, "Engine Oil 20W-40", 10, 10000).await;

        let mut input = bill(vec![item(oil.id, 2, 10000)]);
        input.customer = kumar();
        input.global_discount = Discount::percent(1000);
        input.global_tax_rate = Rate::from_bps(1800);
        input.payment = partial(10000);

        let created = db.checkout().create_bill(&input).await.unwrap();
        assert_eq!(created.totals.total, Money::from_paise(21240));

        let record = db.bills().get_record(created.bill_id).await.unwrap().unwrap();
        assert_eq!(record.bill.payment_status, PaymentStatus::Partial);
        assert_eq!(record.bill.balance_due, Money::from_paise(11240));
        assert_eq!(record.bill.discount_amount, Money::from_paise(2000));
        assert_eq!(record.bill.tax_amount, Money::from_paise(3240));
        assert_eq!(record.customer_phone.as_deref(), Some("9999999999"));

        let customer_id = created.customer_id.unwrap();
        let ledger = db.ledger().list_for_customer(customer_id).await.unwrap();
        assert_eq!(ledger.len(), 2);
        // newest first
        assert_eq!(ledger[1].entry_type, LedgerEntryType::Debit);
        assert_eq!(ledger[1].amount, Money::from_paise(21240));
        assert_eq!(ledger[1].balance, Money::from_paise(-21240));
        assert_eq!(ledger[0].entry_type, LedgerEntryType::Credit);
        assert_eq!(ledger[0].amount, Money::from_paise(10000));
        assert_eq!(ledger[0].balance, Money::from_paise(-11240));
    }

    #[tokio::test]
    async fn test_itemized_bill_stores_line_terms() {
        let db = setup().await;
        let oil = stock_product(&db, "Gear Oil 80W-90", 10, 10000).await;

        let mut line = item(oil.id, 2, 10000);
        line.discount_value = 1000;
        line.discount_type = DiscountType::Percent;
        line.tax_rate = Rate::from_bps(1800);

        let mut input = bill(vec![line]);
        input.mode = CalculationMode::Itemized;
        // Must not leak into an itemized bill
        input.global_discount = Discount::amount(5000);
        input.global_tax_rate = Rate::from_bps(2800);

        let created = db.checkout().create_bill(&input).await.unwrap();
        assert_eq!(created.totals.total, Money::from_paise(21240));

        let stored = db.bills().get_by_id(created.bill_id).await.unwrap().unwrap();
        assert_eq!(stored.calculation_mode, CalculationMode::Itemized);
        assert_eq!(stored.discount_value, 0);
        assert_eq!(stored.tax_rate, Rate::zero());

        let items = db.bills().items(created.bill_id).await.unwrap();
        assert_eq!(items[0].item.discount_type, DiscountType::Percent);
        assert_eq!(items[0].item.discount_value, 1000);
        assert_eq!(items[0].item.tax_rate, Rate::from_bps(1800));
    }

    #[tokio::test]
    async fn test_returning_customer_is_renamed_not_duplicated() {
        let db = setup().await;
        let oil = stock_product(&db, "2T Oil", 10, 5000).await;

        let mut first = bill(vec![item(oil.id, 1, 5000)]);
        first.customer = kumar();
        let a = db.checkout().create_bill(&first).await.unwrap();

        let mut second = bill(vec![item(oil.id, 1, 5000)]);
        second.customer = Some(CustomerInput {
            name: "Kumar Traders".to_string(),
            phone: Some("9999999999".to_string()),
        });
        let b = db.checkout().create_bill(&second).await.unwrap();

        assert_eq!(a.customer_id, b.customer_id);
        assert_eq!(count(&db, "customers").await, 1);
        let stored = db.customers().get_by_phone("9999999999").await.unwrap().unwrap();
        assert_eq!(stored.name, "Kumar Traders");
    }

    #[tokio::test]
    async fn test_blank_phone_is_walk_in() {
        let db = setup().await;
        let oil = stock_product(&db, "2T Oil", 10, 5000).await;

        let mut input = bill(vec![item(oil.id, 1, 5000)]);
        input.customer = Some(CustomerInput {
            name: "Someone".to_string(),
            phone: Some("   ".to_string()),
        });

        let created = db.checkout().create_bill(&input).await.unwrap();
        assert_eq!(created.customer_id, None);
        assert_eq!(count(&db, "customers").await, 0);
    }

    #[tokio::test]
    async fn test_walk_in_cannot_leave_a_balance() {
        let db = setup().await;
        let oil = stock_product(&db, "2T Oil", 10, 300).await;

        let mut unpaid = bill(vec![item(oil.id, 1, 300)]);
        unpaid.payment = PaymentInput::Detailed(PaymentDetails {
            mode: PaymentMode::Cash,
            status: PaymentStatus::Unpaid,
            amount_paid: None,
            balance_due: None,
        });
        let err = db.checkout().create_bill(&unpaid).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::CustomerRequired { balance_due }) if balance_due == Money::from_paise(300)
        ));

        let mut blank_phone = bill(vec![item(oil.id, 1, 300)]);
        blank_phone.customer = Some(CustomerInput {
            name: "Someone".to_string(),
            phone: Some(" ".to_string()),
        });
        blank_phone.payment = partial(100);
        let err = db.checkout().create_bill(&blank_phone).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::CustomerRequired { .. })));

        assert_eq!(count(&db, "bills").await, 0);
        assert_eq!(db.products().get_by_id(oil.id).await.unwrap().unwrap().quantity, 10);

        // Paying in full at the counter is fine without a customer
        let mut settled = bill(vec![item(oil.id, 1, 300)]);
        settled.payment = partial(300);
        let created = db.checkout().create_bill(&settled).await.unwrap();
        assert_eq!(created.payment.status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let db = setup().await;
        let plenty = stock_product(&db, "Coolant", 50, 20000).await;
        let scarce = stock_product(&db, "Brake Fluid", 3, 15000).await;

        let mut input = bill(vec![item(plenty.id, 5, 20000), item(scarce.id, 5, 15000)]);
        input.customer = kumar();

        let err = db.checkout().create_bill(&input).await.unwrap_err();
        match err {
            DbError::Core(CoreError::InsufficientStock { available, requested, .. }) => {
                assert_eq!(available, 3);
                assert_eq!(requested, 5);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        assert_eq!(db.products().get_by_id(plenty.id).await.unwrap().unwrap().quantity, 50);
        assert_eq!(db.products().get_by_id(scarce.id).await.unwrap().unwrap().quantity, 3);
        assert_eq!(count(&db, "bills").await, 0);
        assert_eq!(count(&db, "bill_items").await, 0);
        assert_eq!(count(&db, "bill_payments").await, 0);
        assert_eq!(count(&db, "customers").await, 0);
    }

    #[tokio::test]
    async fn test_same_product_twice_checks_cumulative_stock() {
        let db = setup().await;
        let oil = stock_product(&db, "Engine Oil", 4, 10000).await;

        let input = bill(vec![item(oil.id, 3, 10000), item(oil.id, 3, 10000)]);
        let err = db.checkout().create_bill(&input).await.unwrap_err();

        assert!(matches!(
            err,
            DbError::Core(CoreError::InsufficientStock { available: 1, requested: 3, .. })
        ));
        assert_eq!(db.products().get_by_id(oil.id).await.unwrap().unwrap().quantity, 4);
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_products_are_not_found() {
        let db = setup().await;
        let oil = stock_product(&db, "Old Stock", 10, 10000).await;
        db.products().deactivate(oil.id).await.unwrap();

        let err = db.checkout().create_bill(&bill(vec![item(oil.id, 1, 10000)])).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::ProductNotFound(id)) if id == oil.id));

        let err = db.checkout().create_bill(&bill(vec![item(404, 1, 10000)])).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::ProductNotFound(404))));
        assert_eq!(count(&db, "bills").await, 0);
    }

    #[tokio::test]
    async fn test_failure_before_ledger_leaves_no_trace() {
        let db = setup().await;
        let oil = stock_product(&db, "Engine Oil", 10, 10000).await;
        sqlx::query(
            "CREATE TRIGGER fail_ledger BEFORE INSERT ON customer_ledger \
             BEGIN SELECT RAISE(ABORT, 'ledger unavailable'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let mut input = bill(vec![item(oil.id, 2, 10000)]);
        input.customer = kumar();
        input.payment = partial(5000);

        assert!(db.checkout().create_bill(&input).await.is_err());

        assert_eq!(db.products().get_by_id(oil.id).await.unwrap().unwrap().quantity, 10);
        assert_eq!(count(&db, "bills").await, 0);
        assert_eq!(count(&db, "bill_items").await, 0);
        assert_eq!(count(&db, "bill_payments").await, 0);
        assert_eq!(count(&db, "customer_ledger").await, 0);
        assert_eq!(count(&db, "customers").await, 0);
    }

    #[tokio::test]
    async fn test_rejected_before_transaction() {
        let db = setup().await;
        let oil = stock_product(&db, "Engine Oil", 10, 10000).await;

        let err = db.checkout().create_bill(&bill(vec![])).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::EmptyCart)));

        let mut overpaid = bill(vec![item(oil.id, 1, 10000)]);
        overpaid.payment = partial(20000);
        let err = db.checkout().create_bill(&overpaid).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidPaymentAmount { .. })));

        let mut zero_qty = bill(vec![item(oil.id, 0, 10000)]);
        zero_qty.seller_name = "Ravi".to_string();
        assert!(db.checkout().create_bill(&zero_qty).await.is_err());

        assert_eq!(count(&db, "bills").await, 0);
    }

    #[test]
    fn test_new_bill_deserializes_counter_payload() {
        let json = r#"{
            "employeeId": 3,
            "sellerName": "Ravi",
            "customer": {"name": "Kumar", "phone": "9999999999"},
            "items": [{"productId": 1, "quantity": 2, "unitPrice": 10000,
                       "discountValue": 1000, "discountType": "percent", "taxRate": 1800}],
            "mode": "itemized",
            "globalDiscount": {"value": 0, "type": "amount"},
            "globalTaxRate": 0,
            "payment": {"mode": "UPI/Online"}
        }"#;

        let input: NewBill = serde_json::from_str(json).unwrap();
        assert_eq!(input.mode, CalculationMode::Itemized);
        assert_eq!(input.items[0].discount(), Discount::percent(1000));
        assert_eq!(input.payment.mode(), PaymentMode::UpiOnline);
        assert_eq!(input.customer.unwrap().phone(), Some("9999999999"));
    }
}
