//! # Bill Repository
//!
//! Bill headers, frozen bill items and the payment log.
//!
//! ## Bill Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  bills (header)                                                        │
//! │  ├── totals, discount/tax terms, calculation_mode                      │
//! │  └── settlement: amount_paid + balance_due = total_amount              │
//! │       │                                                                 │
//! │       ├── bill_items     price_at_sale, unit_cost_at_sale, batch       │
//! │       │                  (frozen, never updated)                       │
//! │       ├── bill_payments  every payment event, including the first      │
//! │       └── returns        partial reversals (see ReturnRepository)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads go through the pool. Writes only happen inside the checkout and
//! payment transactions, through the `&mut SqliteConnection` helpers.

use chrono::{DateTime, NaiveDate, Utc};
use lubri_core::{
    calculate_line, Bill, BillItemRecord, BillPayment, BillRecord, CalculationMode, CartLine,
    Discount, DiscountType, Money, PaymentMode, PaymentProgress, PaymentStatus, Rate,
};
use serde::Deserialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::product::like_pattern;
use crate::repository::returns::ReturnRepository;

const BILL_COLUMNS: &str = "id, date, employee_id, customer_id, seller_name, payment_mode, \
     total_amount, discount_value, discount_type, discount_amount, tax_rate, tax_amount, \
     calculation_mode, payment_status, amount_paid, balance_due";

const RECORD_SELECT: &str = r#"
    SELECT
        b.id, b.date, b.employee_id, b.customer_id, b.seller_name, b.payment_mode,
        b.total_amount, b.discount_value, b.discount_type, b.discount_amount,
        b.tax_rate, b.tax_amount, b.calculation_mode, b.payment_status,
        b.amount_paid, b.balance_due,
        e.name AS employee_name,
        c.name AS customer_name,
        c.phone AS customer_phone
    FROM bills b
    LEFT JOIN employees e ON e.id = b.employee_id
    LEFT JOIN customers c ON c.id = b.customer_id
"#;

// =============================================================================
// Filter
// =============================================================================

/// Bill history filter. Every field is optional; absent fields match all.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillFilter {
    /// Inclusive, compared on the calendar date of the bill.
    pub start_date: Option<NaiveDate>,
    /// Inclusive.
    pub end_date: Option<NaiveDate>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    /// Substring match.
    pub seller_name: Option<String>,
    /// Substring match.
    pub customer_name: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub customer_id: Option<i64>,
    pub limit: Option<i64>,
}

// =============================================================================
// Write models
// =============================================================================

/// A bill header ready to insert.
#[derive(Debug, Clone)]
pub struct BillHeader {
    pub date: DateTime<Utc>,
    pub employee_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub seller_name: String,
    pub payment_mode: PaymentMode,
    pub total_amount: Money,
    pub discount: Discount,
    pub discount_amount: Money,
    pub tax_rate: Rate,
    pub tax_amount: Money,
    pub calculation_mode: CalculationMode,
    pub payment_status: PaymentStatus,
    pub amount_paid: Money,
    pub balance_due: Money,
}

/// A bill line with its frozen terms.
#[derive(Debug, Clone)]
pub struct BillLine {
    pub product_id: i64,
    pub quantity: i64,
    pub price_at_sale: Money,
    pub unit_cost_at_sale: Money,
    pub batch_number: Option<String>,
    pub discount: Discount,
    pub tax_rate: Rate,
}

// =============================================================================
// Repository
// =============================================================================

/// Units of one product on a bill and what the customer was charged for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoldProduct {
    pub quantity: i64,
    pub charged: Money,
}

/// `total × part / whole`, rounded up. Computed in i128.
fn share_of_total(total: Money, part: i64, whole: i64) -> Money {
    if whole <= 0 || part >= whole {
        return total;
    }
    let scaled = total.paise().max(0) as i128 * part.max(0) as i128;
    let whole = whole as i128;
    Money::from_paise(((scaled + whole - 1) / whole) as i64)
}

#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    /// Gets a bill header.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Bill>> {
        let sql = format!("SELECT {BILL_COLUMNS} FROM bills WHERE id = ?1");

        let bill = sqlx::query_as::<_, Bill>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(bill)
    }

    /// Gets a bill with names, items, payments and returns.
    pub async fn get_record(&self, id: i64) -> DbResult<Option<BillRecord>> {
        let sql = format!("{RECORD_SELECT} WHERE b.id = ?1");

        let record = sqlx::query_as::<_, BillRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match record {
            Some(record) => Ok(Some(self.attach_children(record).await?)),
            None => Ok(None),
        }
    }

    /// Lists bills matching `filter`, newest first.
    pub async fn list(&self, filter: &BillFilter) -> DbResult<Vec<BillRecord>> {
        debug!(?filter, "Listing bills");

        let sql = format!(
            "{RECORD_SELECT} \
             WHERE (?1 IS NULL OR date(b.date) >= date(?1)) \
               AND (?2 IS NULL OR date(b.date) <= date(?2)) \
               AND (?3 IS NULL OR b.total_amount >= ?3) \
               AND (?4 IS NULL OR b.total_amount <= ?4) \
               AND (?5 IS NULL OR b.seller_name LIKE ?5 ESCAPE '\\') \
               AND (?6 IS NULL OR c.name LIKE ?6 ESCAPE '\\') \
               AND (?7 IS NULL OR b.payment_status = ?7) \
               AND (?8 IS NULL OR b.customer_id = ?8) \
             ORDER BY b.date DESC, b.id DESC \
             LIMIT ?9"
        );

        let records = sqlx::query_as::<_, BillRecord>(&sql)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(filter.seller_name.as_deref().map(like_pattern))
            .bind(filter.customer_name.as_deref().map(like_pattern))
            .bind(filter.payment_status)
            .bind(filter.customer_id)
            .bind(filter.limit.unwrap_or(-1))
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(records.len());
        for record in records {
            out.push(self.attach_children(record).await?);
        }
        Ok(out)
    }

    /// Items of a bill joined with the product name.
    pub async fn items(&self, bill_id: i64) -> DbResult<Vec<BillItemRecord>> {
        let items = sqlx::query_as::<_, BillItemRecord>(
            r#"
            SELECT
                bi.id, bi.bill_id, bi.product_id, bi.quantity,
                bi.price_at_sale, bi.unit_cost_at_sale, bi.batch_number,
                bi.discount_value, bi.discount_type, bi.tax_rate,
                p.name AS product_name
            FROM bill_items bi
            JOIN products p ON p.id = bi.product_id
            WHERE bi.bill_id = ?1
            ORDER BY bi.id
            "#,
        )
        .bind(bill_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Payment events for a bill, oldest first.
    pub async fn payments(&self, bill_id: i64) -> DbResult<Vec<BillPayment>> {
        let payments = sqlx::query_as::<_, BillPayment>(
            "SELECT id, bill_id, amount, date, payment_mode FROM bill_payments \
             WHERE bill_id = ?1 ORDER BY id",
        )
        .bind(bill_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    async fn attach_children(&self, mut record: BillRecord) -> DbResult<BillRecord> {
        let id = record.bill.id;
        record.items = self.items(id).await?;
        record.payments = self.payments(id).await?;
        record.returns = ReturnRepository::new(self.pool.clone()).list_for_bill(id).await?;
        Ok(record)
    }

    // -------------------------------------------------------------------------
    // Transaction helpers
    // -------------------------------------------------------------------------

    /// Reads a bill header inside an open transaction.
    pub async fn fetch(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Bill>> {
        let sql = format!("SELECT {BILL_COLUMNS} FROM bills WHERE id = ?1");

        let bill = sqlx::query_as::<_, Bill>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(bill)
    }

    /// Inserts a bill header and returns its id.
    pub async fn insert_header(conn: &mut SqliteConnection, header: &BillHeader) -> DbResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO bills (
                date, employee_id, customer_id, seller_name, payment_mode,
                total_amount, discount_value, discount_type, discount_amount,
                tax_rate, tax_amount, calculation_mode,
                payment_status, amount_paid, balance_due
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(header.date)
        .bind(header.employee_id)
        .bind(header.customer_id)
        .bind(&header.seller_name)
        .bind(header.payment_mode)
        .bind(header.total_amount)
        .bind(header.discount.value)
        .bind(header.discount.kind)
        .bind(header.discount_amount)
        .bind(header.tax_rate)
        .bind(header.tax_amount)
        .bind(header.calculation_mode)
        .bind(header.payment_status)
        .bind(header.amount_paid)
        .bind(header.balance_due)
        .execute(conn)
        .await?;

        let id = result.last_insert_rowid();
        debug!(bill_id = id, total = %header.total_amount, "Bill header inserted");
        Ok(id)
    }

    /// Inserts one frozen bill line.
    pub async fn insert_line(conn: &mut SqliteConnection, bill_id: i64, line: &BillLine) -> DbResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO bill_items (
                bill_id, product_id, quantity, price_at_sale, unit_cost_at_sale,
                batch_number, discount_value, discount_type, tax_rate
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(bill_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(line.price_at_sale)
        .bind(line.unit_cost_at_sale)
        .bind(&line.batch_number)
        .bind(line.discount.value)
        .bind(line.discount.kind)
        .bind(line.tax_rate)
        .execute(conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Appends to the payment log.
    pub async fn insert_payment(
        conn: &mut SqliteConnection,
        bill_id: i64,
        amount: Money,
        date: DateTime<Utc>,
        mode: PaymentMode,
    ) -> DbResult<i64> {
        let result = sqlx::query(
            "INSERT INTO bill_payments (bill_id, amount, date, payment_mode) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(bill_id)
        .bind(amount)
        .bind(date)
        .bind(mode)
        .execute(conn)
        .await?;

        debug!(bill_id, amount = %amount, mode = %mode, "Payment logged");
        Ok(result.last_insert_rowid())
    }

    /// Writes a bill's new settlement position.
    pub async fn update_settlement(
        conn: &mut SqliteConnection,
        bill_id: i64,
        progress: &PaymentProgress,
        mode: PaymentMode,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE bills SET
                amount_paid = ?2,
                balance_due = ?3,
                payment_status = ?4,
                payment_mode = ?5
            WHERE id = ?1
            "#,
        )
        .bind(bill_id)
        .bind(progress.amount_paid)
        .bind(progress.balance_due)
        .bind(progress.status)
        .bind(mode)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Bill", bill_id));
        }

        Ok(())
    }

    /// What a bill sold of one product: units, and the amount charged for
    /// them.
    ///
    /// Itemized bills resolve each stored line with its own terms. Global
    /// bills give the product its share of the bill total, in proportion to
    /// its pre-discount value, rounded up to the paisa.
    pub async fn sold_product(
        conn: &mut SqliteConnection,
        bill: &Bill,
        product_id: i64,
    ) -> DbResult<SoldProduct> {
        let lines: Vec<(i64, Money, i64, DiscountType, Rate)> = sqlx::query_as(
            "SELECT quantity, price_at_sale, discount_value, discount_type, tax_rate \
             FROM bill_items WHERE bill_id = ?1 AND product_id = ?2",
        )
        .bind(bill.id)
        .bind(product_id)
        .fetch_all(&mut *conn)
        .await?;

        let quantity = lines.iter().map(|(qty, ..)| qty).sum();
        let charged: Money = match bill.calculation_mode {
            CalculationMode::Itemized => lines
                .iter()
                .map(|&(qty, price, value, kind, tax_rate)| {
                    calculate_line(
                        &CartLine::new(price, qty)
                            .with_discount(Discount { value, kind })
                            .with_tax_rate(tax_rate),
                    )
                    .total
                })
                .sum(),
            CalculationMode::Global => {
                let subtotal: Option<i64> = sqlx::query_scalar(
                    "SELECT SUM(quantity * price_at_sale) FROM bill_items WHERE bill_id = ?1",
                )
                .bind(bill.id)
                .fetch_one(&mut *conn)
                .await?;
                let gross: i64 = lines
                    .iter()
                    .map(|(qty, price, ..)| price.multiply_quantity(*qty).paise())
                    .sum();
                share_of_total(bill.total_amount, gross, subtotal.unwrap_or(0))
            }
        };

        Ok(SoldProduct { quantity, charged })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::checkout::{BillItemInput, CustomerInput, NewBill};
    use crate::service::testing::{setup, stock_product};
    use crate::Database;
    use lubri_core::{DiscountType, PaymentDetails, PaymentInput};

    #[test]
    fn test_share_of_total_rounds_up() {
        let total = Money::from_paise(21240);
        assert_eq!(share_of_total(total, 1, 3), Money::from_paise(7080));
        assert_eq!(share_of_total(Money::from_paise(100), 1, 3), Money::from_paise(34));
        assert_eq!(share_of_total(total, 3, 3), total);
        assert_eq!(share_of_total(total, 5, 0), total);
    }

    async fn sell(db: &Database, seller: &str, customer: Option<(&str, &str)>, qty: i64, status: PaymentStatus) -> i64 {
        let oil = stock_product(db, "Engine Oil 20W-40", 100, 10000).await;
        let input = NewBill {
            employee_id: None,
            seller_name: seller.to_string(),
            customer: customer.map(|(name, phone)| CustomerInput {
                name: name.to_string(),
                phone: Some(phone.to_string()),
            }),
            items: vec![BillItemInput {
                product_id: oil.id,
                quantity: qty,
                unit_price: Money::from_paise(10000),
                batch_number: None,
                discount_value: 0,
                discount_type: DiscountType::Amount,
                tax_rate: Rate::zero(),
            }],
            mode: CalculationMode::Global,
            global_discount: Discount::none(),
            global_tax_rate: Rate::zero(),
            payment: PaymentInput::Detailed(PaymentDetails {
                mode: PaymentMode::Cash,
                status,
                amount_paid: None,
                balance_due: None,
            }),
        };
        db.checkout().create_bill(&input).await.unwrap().bill_id
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = setup().await;
        let a = sell(&db, "Ravi", Some(("Kumar", "9999999999")), 1, PaymentStatus::Paid).await;
        let b = sell(&db, "Selvi", Some(("Murugan", "9888888888")), 5, PaymentStatus::Unpaid).await;
        let c = sell(&db, "Ravi", None, 3, PaymentStatus::Paid).await;

        let all = db.bills().list(&BillFilter::default()).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|r| r.bill.id).collect();
        assert_eq!(ids, vec![c, b, a]);
        assert_eq!(all[0].items.len(), 1);
        assert_eq!(all[0].payments.len(), 1);

        let by_seller = BillFilter {
            seller_name: Some("rav".to_string()),
            ..Default::default()
        };
        assert_eq!(db.bills().list(&by_seller).await.unwrap().len(), 2);

        let by_customer = BillFilter {
            customer_name: Some("muru".to_string()),
            ..Default::default()
        };
        let hits = db.bills().list(&by_customer).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].customer_phone.as_deref(), Some("9888888888"));
        assert!(hits[0].payments.is_empty());

        let by_price = BillFilter {
            min_price: Some(Money::from_paise(20000)),
            max_price: Some(Money::from_paise(40000)),
            ..Default::default()
        };
        let hits = db.bills().list(&by_price).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].bill.id, c);

        let unpaid = BillFilter {
            payment_status: Some(PaymentStatus::Unpaid),
            ..Default::default()
        };
        let hits = db.bills().list(&unpaid).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].bill.balance_due, Money::from_paise(50000));
    }

    #[tokio::test]
    async fn test_list_by_date_range() {
        let db = setup().await;
        sell(&db, "Ravi", None, 1, PaymentStatus::Paid).await;
        let today = Utc::now().date_naive();

        let today_only = BillFilter {
            start_date: Some(today),
            end_date: Some(today),
            ..Default::default()
        };
        assert_eq!(db.bills().list(&today_only).await.unwrap().len(), 1);

        let tomorrow = BillFilter {
            start_date: today.succ_opt(),
            ..Default::default()
        };
        assert!(db.bills().list(&tomorrow).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_bill() {
        let db = setup().await;
        assert!(db.bills().get_record(1).await.unwrap().is_none());
        assert!(db.bills().get_by_id(1).await.unwrap().is_none());
    }
}
