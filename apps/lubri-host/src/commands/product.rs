//! # Product Commands
//!
//! Catalogue maintenance and the billing screen's product lookup.
//!
//! ## Search Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Counter types "20w"                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  {"command": "search_products", "args": {"query": "20w"}}              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  name or batch number contains "20w" (case-insensitive)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<Product>: stock on hand, price, batch for the cart                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is never edited here directly: `restock_product` is an atomic
//! increment and sales/returns move it through the billing services.

use lubri_core::Product;
use lubri_db::repository::product::{NewProduct, ProductUpdate};
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::DbState;

/// Default search result limit.
const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// Maximum search result limit.
const MAX_SEARCH_LIMIT: u32 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsArgs {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchProductsArgs {
    pub query: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductArgs {
    pub id: i64,
    #[serde(flatten)]
    pub product: ProductUpdate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockArgs {
    pub id: i64,
    pub quantity: i64,
}

pub async fn list_products(db: &DbState, args: ListProductsArgs) -> Result<Vec<Product>, ApiError> {
    Ok(db.inner().products().list(args.include_inactive).await?)
}

pub async fn get_product(db: &DbState, id: i64) -> Result<Product, ApiError> {
    db.inner()
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))
}

/// Searches products by name or batch number.
///
/// An empty query returns an empty list rather than the whole catalogue.
pub async fn search_products(db: &DbState, args: SearchProductsArgs) -> Result<Vec<Product>, ApiError> {
    let start = Instant::now();
    let query = args.query.trim();
    let limit = args.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_SEARCH_LIMIT);

    if query.is_empty() {
        return Ok(Vec::new());
    }

    let products = db.inner().products().search(query, limit).await?;

    debug!(
        query = %query,
        count = products.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Product search complete"
    );

    Ok(products)
}

pub async fn add_product(db: &DbState, product: NewProduct) -> Result<Product, ApiError> {
    let created = db.inner().products().insert(&product).await?;
    info!(product_id = created.id, name = %created.name, "Product added");
    Ok(created)
}

pub async fn update_product(db: &DbState, args: UpdateProductArgs) -> Result<Product, ApiError> {
    Ok(db.inner().products().update(args.id, &args.product).await?)
}

pub async fn restock_product(db: &DbState, args: RestockArgs) -> Result<Product, ApiError> {
    Ok(db.inner().products().restock(args.id, args.quantity).await?)
}

/// Soft delete: bill history keeps pointing at the row.
pub async fn delete_product(db: &DbState, id: i64) -> Result<(), ApiError> {
    db.inner().products().deactivate(id).await?;
    Ok(())
}
