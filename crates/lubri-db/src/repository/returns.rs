//! # Return Repository
//!
//! Append-only log of returned goods. A return never edits the bill item it
//! reverses; the quantity still returnable is always derived as
//! `sold - SUM(returned)`.

use chrono::{DateTime, Utc};
use lubri_core::{Money, ProductReturn};
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;

const RETURN_COLUMNS: &str = "id, bill_id, product_id, quantity, refund_amount, reason, date";

/// A return ready to insert.
#[derive(Debug, Clone)]
pub struct ReturnRow {
    pub bill_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub refund_amount: Money,
    pub reason: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ReturnRepository {
    pool: SqlitePool,
}

impl ReturnRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReturnRepository { pool }
    }

    pub async fn list_for_bill(&self, bill_id: i64) -> DbResult<Vec<ProductReturn>> {
        let sql = format!("SELECT {RETURN_COLUMNS} FROM returns WHERE bill_id = ?1 ORDER BY id");

        let returns = sqlx::query_as::<_, ProductReturn>(&sql)
            .bind(bill_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(returns)
    }

    // -------------------------------------------------------------------------
    // Transaction helpers
    // -------------------------------------------------------------------------

    /// Quantity of a product already returned against a bill.
    pub async fn returned_quantity(
        conn: &mut SqliteConnection,
        bill_id: i64,
        product_id: i64,
    ) -> DbResult<i64> {
        let returned: Option<i64> = sqlx::query_scalar(
            "SELECT SUM(quantity) FROM returns WHERE bill_id = ?1 AND product_id = ?2",
        )
        .bind(bill_id)
        .bind(product_id)
        .fetch_one(conn)
        .await?;

        Ok(returned.unwrap_or(0))
    }

    /// Total already refunded for a product on a bill.
    pub async fn refunded_amount(
        conn: &mut SqliteConnection,
        bill_id: i64,
        product_id: i64,
    ) -> DbResult<Money> {
        let refunded: Option<Money> = sqlx::query_scalar(
            "SELECT SUM(refund_amount) FROM returns WHERE bill_id = ?1 AND product_id = ?2",
        )
        .bind(bill_id)
        .bind(product_id)
        .fetch_one(conn)
        .await?;

        Ok(refunded.unwrap_or_default())
    }

    pub async fn insert(conn: &mut SqliteConnection, row: &ReturnRow) -> DbResult<ProductReturn> {
        let result = sqlx::query(
            r#"
            INSERT INTO returns (bill_id, product_id, quantity, refund_amount, reason, date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(row.bill_id)
        .bind(row.product_id)
        .bind(row.quantity)
        .bind(row.refund_amount)
        .bind(&row.reason)
        .bind(row.date)
        .execute(conn)
        .await?;

        Ok(ProductReturn {
            id: result.last_insert_rowid(),
            bill_id: row.bill_id,
            product_id: row.product_id,
            quantity: row.quantity,
            refund_amount: row.refund_amount,
            reason: row.reason.clone(),
            date: row.date,
        })
    }
}
