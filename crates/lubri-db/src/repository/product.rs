//! # Product Repository
//!
//! Database operations for products and stock on hand.
//!
//! ## Who Moves Stock
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Product.quantity writers                            │
//! │                                                                         │
//! │  checkout  ──► decrement_stock (guarded, inside the bill transaction)  │
//! │  return    ──► increment_stock (inside the return transaction)         │
//! │  restock   ──► restock()       (single atomic UPDATE)                  │
//! │                                                                         │
//! │  update() never touches quantity.                                      │
//! │  Every write is `quantity = quantity ± ?`, never read-modify-write.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use lubri_core::validation::{validate_name, validate_price, validate_quantity};
use lubri_core::{Money, Product};
use serde::Deserialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

const PRODUCT_COLUMNS: &str = "id, name, quantity, price, unit_cost, batch_number, \
     category_id, supplier_id, description, is_active, created_at, updated_at";

/// Fields for a new product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    /// Opening stock.
    #[serde(default)]
    pub quantity: i64,
    pub price: Money,
    #[serde(default)]
    pub unit_cost: Money,
    #[serde(default)]
    pub batch_number: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub supplier_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Editable product fields. Stock is deliberately absent: it only moves
/// through sales, returns and restocks.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: String,
    pub price: Money,
    pub unit_cost: Money,
    #[serde(default)]
    pub batch_number: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub supplier_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let results = repo.search("20w", 20).await?;
/// let product = repo.get_by_id(7).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products by name.
    pub async fn list(&self, include_inactive: bool) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 OR ?1 \
             ORDER BY name COLLATE NOCASE, id"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Searches active products by name or batch number.
    ///
    /// Case-insensitive substring match. `%` and `_` in the query are
    /// matched literally.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let pattern = like_pattern(query);
        debug!(query = %query, limit, "Searching products");

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 \
               AND (name LIKE ?1 ESCAPE '\\' OR IFNULL(batch_number, '') LIKE ?1 ESCAPE '\\') \
             ORDER BY name COLLATE NOCASE, id \
             LIMIT ?2"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(pattern)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets a product by ID, active or not.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product.
    pub async fn insert(&self, input: &NewProduct) -> DbResult<Product> {
        validate_name("name", &input.name)?;
        validate_price("price", input.price)?;
        validate_price("unit cost", input.unit_cost)?;
        if input.quantity < 0 {
            return Err(lubri_core::ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }

        let now = Utc::now();
        debug!(name = %input.name, quantity = input.quantity, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                name, quantity, price, unit_cost, batch_number,
                category_id, supplier_id, description,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9, ?9)
            "#,
        )
        .bind(input.name.trim())
        .bind(input.quantity)
        .bind(input.price)
        .bind(input.unit_cost)
        .bind(&input.batch_number)
        .bind(input.category_id)
        .bind(input.supplier_id)
        .bind(&input.description)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(product_id = id, name = %input.name, "Product added");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Updates a product's catalogue fields.
    pub async fn update(&self, id: i64, input: &ProductUpdate) -> DbResult<Product> {
        validate_name("name", &input.name)?;
        validate_price("price", input.price)?;
        validate_price("unit cost", input.unit_cost)?;

        debug!(product_id = id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                price = ?3,
                unit_cost = ?4,
                batch_number = ?5,
                category_id = ?6,
                supplier_id = ?7,
                description = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.price)
        .bind(input.unit_cost)
        .bind(&input.batch_number)
        .bind(input.category_id)
        .bind(input.supplier_id)
        .bind(&input.description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Adds `quantity` units to stock on hand.
    pub async fn restock(&self, id: i64, quantity: i64) -> DbResult<Product> {
        validate_quantity(quantity)?;

        let result = sqlx::query(
            "UPDATE products SET quantity = quantity + ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(product_id = id, quantity, "Product restocked");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Soft-deletes a product.
    ///
    /// The row stays so historical bill items keep their product reference.
    pub async fn deactivate(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(product_id = id, "Product deactivated");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Transaction helpers
    // -------------------------------------------------------------------------

    /// Reads a product inside an open transaction.
    pub async fn fetch(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(product)
    }

    /// Decrements stock only if enough is on hand.
    ///
    /// Returns `false` when the guard rejected the update: the product is
    /// missing, inactive, or holds fewer than `quantity` units.
    pub async fn decrement_stock(
        conn: &mut SqliteConnection,
        id: i64,
        quantity: i64,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                quantity = quantity - ?2,
                updated_at = ?3
            WHERE id = ?1 AND is_active = 1 AND quantity >= ?2
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(conn)
        .await?;

        debug!(product_id = id, quantity, applied = result.rows_affected() == 1, "Stock decrement");
        Ok(result.rows_affected() == 1)
    }

    /// Puts returned units back on the shelf.
    pub async fn increment_stock(
        conn: &mut SqliteConnection,
        id: i64,
        quantity: i64,
    ) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET quantity = quantity + ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        debug!(product_id = id, quantity, "Stock increment");
        Ok(())
    }
}

/// Builds a `LIKE` pattern matching `query` as a literal substring.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

// =============================================================================
// Unit Tests
// =============================================================================
