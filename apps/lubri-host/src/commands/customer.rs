//! # Customer Commands
//!
//! Lookup only: customers are created and renamed by checkout.

use lubri_core::{CustomerSummary, LedgerEntry};
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::DbState;

#[derive(Debug, Deserialize)]
pub struct SearchCustomersArgs {
    pub query: String,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Autocomplete for the billing screen's customer fields.
pub async fn search_customers(
    db: &DbState,
    args: SearchCustomersArgs,
) -> Result<Vec<CustomerSummary>, ApiError> {
    if args.query.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(db.inner().customers().search(&args.query, args.limit).await?)
}

pub async fn get_customer(db: &DbState, id: i64) -> Result<CustomerSummary, ApiError> {
    db.inner()
        .customers()
        .get_summary(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", id))
}

/// Full ledger, newest first.
pub async fn get_customer_ledger(db: &DbState, customer_id: i64) -> Result<Vec<LedgerEntry>, ApiError> {
    // Distinguish "no such customer" from "no entries yet"
    get_customer(db, customer_id).await?;

    let entries = db.inner().ledger().list_for_customer(customer_id).await?;
    debug!(customer_id, entries = entries.len(), "Ledger loaded");
    Ok(entries)
}
