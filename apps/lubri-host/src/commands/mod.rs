//! # Commands Module
//!
//! Every command the UI process can invoke, plus the dispatcher that routes a
//! command name to it.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (dispatch)
//! ├── product.rs    ◄─── Product search, CRUD, restock
//! ├── catalog.rs    ◄─── Categories, suppliers, employees
//! ├── customer.rs   ◄─── Customer lookup and ledger
//! ├── bill.rs       ◄─── Preview, checkout, history, payments, returns
//! ├── dashboard.rs  ◄─── Dashboard figures
//! └── config.rs     ◄─── Configuration and health
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI process writes one line:                                            │
//! │    {"id": 7, "command": "search_products", "args": {"query": "20w"}}    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  dispatch("search_products", args)                                      │
//! │    args ──► SearchProductsArgs   (bad shape = VALIDATION_ERROR)        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  product::search_products(&db, args) -> Result<Vec<Product>, ApiError>  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  serde_json::Value handed back to the IPC loop                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each command declares only the state it needs: most take `&DbState`,
//! `get_config` takes only `&ConfigState`, the dashboard takes both.

pub mod bill;
pub mod catalog;
pub mod config;
pub mod customer;
pub mod dashboard;
pub mod product;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{ConfigState, DbState};

/// Arguments for commands addressed by a single row id.
#[derive(Debug, Deserialize)]
pub struct IdArgs {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerLedgerArgs {
    pub customer_id: i64,
}

/// Routes a command name to its handler.
///
/// `args` may be `null` for commands without arguments.
pub async fn dispatch(
    db: &DbState,
    config: &ConfigState,
    command: &str,
    args: Value,
) -> Result<Value, ApiError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };

    debug!(command, "Dispatching command");

    match command {
        // Products
        "list_products" => to_data(product::list_products(db, parse(args)?).await?),
        "get_product" => {
            let IdArgs { id } = parse(args)?;
            to_data(product::get_product(db, id).await?)
        }
        "search_products" => to_data(product::search_products(db, parse(args)?).await?),
        "add_product" => to_data(product::add_product(db, parse(args)?).await?),
        "update_product" => to_data(product::update_product(db, parse(args)?).await?),
        "restock_product" => to_data(product::restock_product(db, parse(args)?).await?),
        "delete_product" => {
            let IdArgs { id } = parse(args)?;
            to_data(product::delete_product(db, id).await?)
        }

        // Catalogue
        "list_categories" => to_data(catalog::list_categories(db).await?),
        "add_category" => to_data(catalog::add_category(db, parse(args)?).await?),
        "list_suppliers" => to_data(catalog::list_suppliers(db).await?),
        "add_supplier" => to_data(catalog::add_supplier(db, parse(args)?).await?),
        "update_supplier" => to_data(catalog::update_supplier(db, parse(args)?).await?),
        "delete_supplier" => {
            let IdArgs { id } = parse(args)?;
            to_data(catalog::delete_supplier(db, id).await?)
        }
        "list_employees" => to_data(catalog::list_employees(db).await?),
        "add_employee" => to_data(catalog::add_employee(db, parse(args)?).await?),
        "update_employee" => to_data(catalog::update_employee(db, parse(args)?).await?),
        "delete_employee" => {
            let IdArgs { id } = parse(args)?;
            to_data(catalog::delete_employee(db, id).await?)
        }

        // Customers
        "search_customers" => to_data(customer::search_customers(db, parse(args)?).await?),
        "get_customer" => {
            let IdArgs { id } = parse(args)?;
            to_data(customer::get_customer(db, id).await?)
        }
        "get_customer_ledger" => {
            let CustomerLedgerArgs { customer_id } = parse(args)?;
            to_data(customer::get_customer_ledger(db, customer_id).await?)
        }

        // Bills
        "preview_bill" => to_data(bill::preview_bill(parse(args)?)?),
        "create_bill" => to_data(bill::create_bill(db, parse(args)?).await?),
        "get_bill" => to_data(bill::get_bill(db, parse(args)?).await?),
        "get_bills" => to_data(bill::get_bills(db, parse(args)?).await?),
        "record_payment" => to_data(bill::record_payment(db, parse(args)?).await?),
        "process_return" => to_data(bill::process_return(db, parse(args)?).await?),

        // Dashboard
        "get_dashboard_stats" => to_data(dashboard::get_dashboard_stats(db, config).await?),

        // Config
        "get_config" => to_data(config::get_config(config)),
        "health_check" => to_data(config::health_check(db).await?),

        other => Err(ApiError::unknown_command(other)),
    }
}

/// Deserializes command arguments, reporting shape errors as validation.
fn parse<T: DeserializeOwned>(args: Value) -> Result<T, ApiError> {
    serde_json::from_value(args).map_err(|e| ApiError::validation(format!("invalid arguments: {}", e)))
}

fn to_data<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(format!("failed to encode response: {}", e)))
}
