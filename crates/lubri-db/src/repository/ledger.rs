//! # Customer Ledger Repository
//!
//! Append-only running balance per customer.
//!
//! ## Running Balance
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  id  type    amount    balance                                         │
//! │  ──  ──────  ───────   ────────                                        │
//! │   1  debit   212.40    -212.40   ← bill (customer owes more)           │
//! │   2  credit  100.00    -112.40   ← paid at the counter                 │
//! │   3  credit  112.40       0.00   ← settled later                       │
//! │                                                                         │
//! │  balance[n] = balance[n-1] + (credit ? amount : -amount)               │
//! │  balance[-1] = 0                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are only ever written through [`LedgerRepository::append`], inside
//! the same transaction as the bill, payment or return that caused them.
//! The previous balance is read on that same connection, so it always sees
//! the row appended just before it.

use chrono::{DateTime, Utc};
use lubri_core::{CoreError, LedgerEntry, LedgerEntryType, Money};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::error::DbResult;

const LEDGER_COLUMNS: &str = "id, customer_id, bill_id, type, amount, balance, description, date";

/// A ledger movement before its balance is known.
#[derive(Debug, Clone)]
pub struct LedgerPosting {
    pub customer_id: i64,
    pub bill_id: Option<i64>,
    pub entry_type: LedgerEntryType,
    pub amount: Money,
    pub description: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// A customer's ledger, newest first.
    pub async fn list_for_customer(&self, customer_id: i64) -> DbResult<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT {LEDGER_COLUMNS} FROM customer_ledger WHERE customer_id = ?1 ORDER BY id DESC"
        );

        let entries = sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    /// Ledger rows attached to one bill, in insertion order.
    pub async fn list_for_bill(&self, bill_id: i64) -> DbResult<Vec<LedgerEntry>> {
        let sql = format!("SELECT {LEDGER_COLUMNS} FROM customer_ledger WHERE bill_id = ?1 ORDER BY id");

        let entries = sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(bill_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    // -------------------------------------------------------------------------
    // Transaction helpers
    // -------------------------------------------------------------------------

    /// Balance after the customer's most recent entry, zero if none.
    pub async fn current_balance(conn: &mut SqliteConnection, customer_id: i64) -> DbResult<Money> {
        let balance: Option<Money> = sqlx::query_scalar(
            "SELECT balance FROM customer_ledger WHERE customer_id = ?1 ORDER BY id DESC LIMIT 1",
        )
        .bind(customer_id)
        .fetch_optional(conn)
        .await?;

        Ok(balance.unwrap_or_default())
    }

    /// Appends an entry, continuing the customer's running balance.
    pub async fn append(conn: &mut SqliteConnection, posting: &LedgerPosting) -> DbResult<LedgerEntry> {
        let previous = Self::current_balance(&mut *conn, posting.customer_id).await?;
        let balance = previous
            .checked_add(posting.entry_type.signed(posting.amount))
            .ok_or_else(|| {
                warn!(customer_id = posting.customer_id, previous = %previous, "Ledger balance overflow");
                CoreError::LedgerOverflow {
                    customer_id: posting.customer_id,
                }
            })?;

        let result = sqlx::query(
            r#"
            INSERT INTO customer_ledger (
                customer_id, bill_id, type, amount, balance, description, date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(posting.customer_id)
        .bind(posting.bill_id)
        .bind(posting.entry_type)
        .bind(posting.amount)
        .bind(balance)
        .bind(&posting.description)
        .bind(posting.date)
        .execute(&mut *conn)
        .await?;

        let id = result.last_insert_rowid();
        debug!(
            customer_id = posting.customer_id,
            entry_id = id,
            kind = ?posting.entry_type,
            amount = %posting.amount,
            balance = %balance,
            "Ledger entry appended"
        );

        Ok(LedgerEntry {
            id,
            customer_id: posting.customer_id,
            bill_id: posting.bill_id,
            entry_type: posting.entry_type,
            amount: posting.amount,
            balance,
            description: posting.description.clone(),
            date: posting.date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::customer::CustomerRepository;
    use crate::{Database, DbConfig};

    fn posting(customer_id: i64, entry_type: LedgerEntryType, paise: i64) -> LedgerPosting {
        LedgerPosting {
            customer_id,
            bill_id: None,
            entry_type,
            amount: Money::from_paise(paise),
            description: "test".to_string(),
            date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_running_balance_per_customer() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        let a = CustomerRepository::upsert_by_phone(&mut conn, "A", "9000000001").await.unwrap();
        let b = CustomerRepository::upsert_by_phone(&mut conn, "B", "9000000002").await.unwrap();

        LedgerRepository::append(&mut conn, &posting(a, LedgerEntryType::Debit, 21240)).await.unwrap();
        LedgerRepository::append(&mut conn, &posting(b, LedgerEntryType::Debit, 500)).await.unwrap();
        let last = LedgerRepository::append(&mut conn, &posting(a, LedgerEntryType::Credit, 10000))
            .await
            .unwrap();
        assert_eq!(last.balance, Money::from_paise(-11240));
        assert_eq!(
            LedgerRepository::current_balance(&mut conn, b).await.unwrap(),
            Money::from_paise(-500)
        );
        drop(conn);

        let entries = db.ledger().list_for_customer(a).await.unwrap();
        assert_eq!(entries.len(), 2);
        // Newest first.
        assert_eq!(entries[0].entry_type, LedgerEntryType::Credit);
        assert_eq!(entries[1].balance, Money::from_paise(-21240));
    }

    #[tokio::test]
    async fn test_balance_overflow_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        let a = CustomerRepository::upsert_by_phone(&mut conn, "A", "9000000001").await.unwrap();

        let near_max = i64::MAX - 10;
        LedgerRepository::append(&mut conn, &posting(a, LedgerEntryType::Credit, near_max))
            .await
            .unwrap();

        let err = LedgerRepository::append(&mut conn, &posting(a, LedgerEntryType::Credit, 11))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::DbError::Core(CoreError::LedgerOverflow { customer_id }) if customer_id == a
        ));
        assert_eq!(
            LedgerRepository::current_balance(&mut conn, a).await.unwrap(),
            Money::from_paise(near_max)
        );
    }
}
