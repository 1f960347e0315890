//! # Catalogue Commands
//!
//! Categories, suppliers and employees. Plain single-statement CRUD with no
//! stock or ledger effects.

use lubri_core::{Category, Employee, Supplier};
use lubri_db::repository::employee::EmployeeInput;
use lubri_db::repository::supplier::SupplierInput;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::DbState;

#[derive(Debug, Deserialize)]
pub struct AddCategoryArgs {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSupplierArgs {
    pub id: i64,
    #[serde(flatten)]
    pub supplier: SupplierInput,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeArgs {
    pub id: i64,
    #[serde(flatten)]
    pub employee: EmployeeInput,
}

// -----------------------------------------------------------------------------
// Categories
// -----------------------------------------------------------------------------

pub async fn list_categories(db: &DbState) -> Result<Vec<Category>, ApiError> {
    Ok(db.inner().categories().list().await?)
}

pub async fn add_category(db: &DbState, args: AddCategoryArgs) -> Result<Category, ApiError> {
    Ok(db.inner().categories().insert(&args.name).await?)
}

// -----------------------------------------------------------------------------
// Suppliers
// -----------------------------------------------------------------------------

pub async fn list_suppliers(db: &DbState) -> Result<Vec<Supplier>, ApiError> {
    Ok(db.inner().suppliers().list().await?)
}

pub async fn add_supplier(db: &DbState, supplier: SupplierInput) -> Result<Supplier, ApiError> {
    Ok(db.inner().suppliers().insert(&supplier).await?)
}

pub async fn update_supplier(db: &DbState, args: UpdateSupplierArgs) -> Result<Supplier, ApiError> {
    Ok(db.inner().suppliers().update(args.id, &args.supplier).await?)
}

pub async fn delete_supplier(db: &DbState, id: i64) -> Result<(), ApiError> {
    db.inner().suppliers().delete(id).await?;
    Ok(())
}

// -----------------------------------------------------------------------------
// Employees
// -----------------------------------------------------------------------------

pub async fn list_employees(db: &DbState) -> Result<Vec<Employee>, ApiError> {
    Ok(db.inner().employees().list().await?)
}

pub async fn add_employee(db: &DbState, employee: EmployeeInput) -> Result<Employee, ApiError> {
    Ok(db.inner().employees().insert(&employee).await?)
}

pub async fn update_employee(db: &DbState, args: UpdateEmployeeArgs) -> Result<Employee, ApiError> {
    Ok(db.inner().employees().update(args.id, &args.employee).await?)
}

/// Past bills keep the seller name snapshot; their employee link is cleared.
pub async fn delete_employee(db: &DbState, id: i64) -> Result<(), ApiError> {
    db.inner().employees().delete(id).await?;
    Ok(())
}
