//! # Dashboard Repository
//!
//! Read-only aggregates for the home screen.

use lubri_core::{DailySales, DashboardStats, Money, RecentBill};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Number of bills listed under "recent".
const RECENT_BILLS: i64 = 5;

#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    /// Collects every dashboard figure.
    ///
    /// `low_stock_threshold`: active products holding fewer units than this
    /// are counted as low stock.
    pub async fn stats(&self, low_stock_threshold: i64) -> DbResult<DashboardStats> {
        debug!(low_stock_threshold, "Loading dashboard stats");

        let product_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
                .fetch_one(&self.pool)
                .await?;

        let employee_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
            .fetch_one(&self.pool)
            .await?;

        let low_stock_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE is_active = 1 AND quantity < ?1",
        )
        .bind(low_stock_threshold)
        .fetch_one(&self.pool)
        .await?;

        let (total_revenue, total_outstanding): (Money, Money) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_amount), 0), COALESCE(SUM(balance_due), 0) FROM bills",
        )
        .fetch_one(&self.pool)
        .await?;

        let recent_bills = sqlx::query_as::<_, RecentBill>(
            r#"
            SELECT b.id, b.date, c.name AS customer_name, b.seller_name,
                   b.total_amount, b.payment_status
            FROM bills b
            LEFT JOIN customers c ON c.id = b.customer_id
            ORDER BY b.date DESC, b.id DESC
            LIMIT ?1
            "#,
        )
        .bind(RECENT_BILLS)
        .fetch_all(&self.pool)
        .await?;

        // Today plus the six days before it
        let daily_sales = sqlx::query_as::<_, DailySales>(
            r#"
            SELECT date(date) AS day, COALESCE(SUM(total_amount), 0) AS total
            FROM bills
            WHERE date(date) >= date('now', '-6 days')
            GROUP BY date(date)
            ORDER BY day
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(DashboardStats {
            product_count,
            employee_count,
            low_stock_count,
            total_revenue,
            total_outstanding,
            recent_bills,
            daily_sales,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::product::NewProduct;
    use crate::{Database, DbConfig};
    use lubri_core::{Money, DEFAULT_LOW_STOCK_THRESHOLD};

    #[tokio::test]
    async fn test_empty_dashboard() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let stats = db.dashboard().stats(DEFAULT_LOW_STOCK_THRESHOLD).await.unwrap();

        assert_eq!(stats.product_count, 0);
        assert_eq!(stats.total_revenue, Money::zero());
        assert!(stats.recent_bills.is_empty());
        assert!(stats.daily_sales.is_empty());
    }

    #[tokio::test]
    async fn test_low_stock_counts_active_only() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut ids = Vec::new();
        for (name, qty) in [("2T Oil", 3), ("Coolant", 40), ("Brake Fluid", 1)] {
            let product = db
                .products()
                .insert(&NewProduct {
                    name: name.to_string(),
                    quantity: qty,
                    price: Money::from_paise(15000),
                    unit_cost: Money::from_paise(12000),
                    batch_number: None,
                    category_id: None,
                    supplier_id: None,
                    description: None,
                })
                .await
                .unwrap();
            ids.push(product.id);
        }
        db.products().deactivate(ids[2]).await.unwrap();

        let stats = db.dashboard().stats(10).await.unwrap();
        assert_eq!(stats.product_count, 2);
        assert_eq!(stats.low_stock_count, 1);
    }
}
