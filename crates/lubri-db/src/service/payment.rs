//! # Payment/Ledger Update Service
//!
//! Records money received against a bill after checkout.
//!
//! ```text
//! record_payment(bill 12, 112.40, UPI)
//!      │
//!      ▼  BEGIN
//! read bill ── missing ──► BillNotFound
//!      │
//!      ▼
//! settle(total, paid, 112.40) ── > balance ──► PaymentExceedsBalance
//!      │
//!      ▼
//! bill: amount_paid, balance_due, status, payment_mode (latest wins)
//! bill_payments: +112.40
//! customer_ledger: credit 112.40 (when the bill has a customer)
//!      │
//!      ▼  COMMIT
//! ```

use chrono::Utc;
use lubri_core::validation::validate_payment_amount;
use lubri_core::{settle, Bill, CoreError, LedgerEntryType, Money, PaymentMode};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::bill::BillRepository;
use crate::repository::ledger::{LedgerPosting, LedgerRepository};

#[derive(Debug, Clone)]
pub struct PaymentService {
    pool: SqlitePool,
}

impl PaymentService {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentService { pool }
    }

    /// Applies an additional payment and returns the updated bill.
    ///
    /// A non-positive amount is rejected before the transaction opens.
    pub async fn record_payment(&self, bill_id: i64, amount: Money, mode: PaymentMode) -> DbResult<Bill> {
        validate_payment_amount(amount)?;

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let bill = BillRepository::fetch(&mut *tx, bill_id)
            .await?
            .ok_or(CoreError::BillNotFound(bill_id))?;

        let progress = match settle(bill.total_amount, bill.amount_paid, amount) {
            Ok(progress) => progress,
            Err(err) => {
                warn!(bill_id, amount = %amount, balance_due = %bill.balance_due, "Payment rejected");
                return Err(err.into());
            }
        };

        let now = Utc::now();
        BillRepository::update_settlement(&mut *tx, bill_id, &progress, mode).await?;
        BillRepository::insert_payment(&mut *tx, bill_id, amount, now, mode).await?;

        if let Some(customer_id) = bill.customer_id {
            LedgerRepository::append(
                &mut *tx,
                &LedgerPosting {
                    customer_id,
                    bill_id: Some(bill_id),
                    entry_type: LedgerEntryType::Credit,
                    amount,
                    description: format!("Payment for Bill #{bill_id} ({mode})"),
                    date: now,
                },
            )
            .await?;
        }

        tx.commit().await.map_err(DbError::transaction)?;

        info!(
            bill_id,
            amount = %amount,
            balance_due = %progress.balance_due,
            status = ?progress.status,
            "Payment recorded"
        );

        Ok(Bill {
            amount_paid: progress.amount_paid,
            balance_due: progress.balance_due,
            payment_status: progress.status,
            payment_mode: mode,
            ..bill
        })
    }
}
