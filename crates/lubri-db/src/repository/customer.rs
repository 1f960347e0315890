//! # Customer Repository
//!
//! Customers are keyed naturally by phone number. They are never created
//! through a form: the first bill carrying a phone number creates the row,
//! and later bills with the same phone refresh the stored name.

use chrono::Utc;
use lubri_core::validation::{validate_name, validate_phone, validate_search_query};
use lubri_core::{Customer, CustomerSummary, CUSTOMER_SEARCH_LIMIT};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::product::like_pattern;

/// Customer columns plus latest ledger balance and bill count.
const SUMMARY_SELECT: &str = r#"
    SELECT
        c.id, c.name, c.phone, c.created_at,
        COALESCE(
            (SELECT l.balance FROM customer_ledger l
             WHERE l.customer_id = c.id
             ORDER BY l.id DESC LIMIT 1),
            0
        ) AS balance,
        (SELECT COUNT(*) FROM bills b WHERE b.customer_id = c.id) AS bill_count
    FROM customers c
"#;

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Finds customers whose name or phone contains `query`.
    ///
    /// Used by the billing screen's autocomplete, so the default limit is
    /// small.
    pub async fn search(&self, query: &str, limit: Option<i64>) -> DbResult<Vec<CustomerSummary>> {
        let query = validate_search_query(query)?;
        let limit = limit.unwrap_or(CUSTOMER_SEARCH_LIMIT).max(1);
        debug!(query = %query, limit, "Searching customers");

        let sql = format!(
            "{SUMMARY_SELECT} \
             WHERE c.name LIKE ?1 ESCAPE '\\' OR c.phone LIKE ?1 ESCAPE '\\' \
             ORDER BY c.name COLLATE NOCASE, c.id \
             LIMIT ?2"
        );

        let customers = sqlx::query_as::<_, CustomerSummary>(&sql)
            .bind(like_pattern(&query))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Gets a customer with their outstanding balance.
    pub async fn get_summary(&self, id: i64) -> DbResult<Option<CustomerSummary>> {
        let sql = format!("{SUMMARY_SELECT} WHERE c.id = ?1");

        let customer = sqlx::query_as::<_, CustomerSummary>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    pub async fn get_by_phone(&self, phone: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone, created_at FROM customers WHERE phone = ?1",
        )
        .bind(phone.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    // -------------------------------------------------------------------------
    // Transaction helpers
    // -------------------------------------------------------------------------

    /// Resolves a customer by phone inside the checkout transaction.
    ///
    /// Existing phone: the stored name is replaced and the id reused.
    /// New phone: a row is inserted.
    pub async fn upsert_by_phone(
        conn: &mut SqliteConnection,
        name: &str,
        phone: &str,
    ) -> DbResult<i64> {
        let phone = validate_phone(phone)?;
        validate_name("customer name", name)?;
        let name = name.trim();

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM customers WHERE phone = ?1")
            .bind(&phone)
            .fetch_optional(&mut *conn)
            .await?;

        if let Some(id) = existing {
            sqlx::query("UPDATE customers SET name = ?2 WHERE id = ?1")
                .bind(id)
                .bind(name)
                .execute(&mut *conn)
                .await?;
            debug!(customer_id = id, "Customer name refreshed");
            return Ok(id);
        }

        let result = sqlx::query("INSERT INTO customers (name, phone, created_at) VALUES (?1, ?2, ?3)")
            .bind(name)
            .bind(&phone)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;

        let id = result.last_insert_rowid();
        debug!(customer_id = id, "Customer created");
        Ok(id)
    }

    /// Whether a customer row exists.
    pub async fn exists(conn: &mut SqliteConnection, id: i64) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM customers WHERE id = ?1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(found.is_some())
    }
}
