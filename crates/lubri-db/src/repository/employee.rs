//! # Employee Repository
//!
//! Staff records. A bill keeps a `seller_name` snapshot, so deleting an
//! employee only clears `bills.employee_id`.

use chrono::{NaiveDate, Utc};
use lubri_core::validation::{validate_name, validate_price};
use lubri_core::{Employee, Money};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

const EMPLOYEE_COLUMNS: &str = "id, name, phone, joining_date, salary, created_at";

/// Employee fields for insert and update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub joining_date: Option<NaiveDate>,
    #[serde(default)]
    pub salary: Money,
}

#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY name COLLATE NOCASE, id");

        let employees = sqlx::query_as::<_, Employee>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(employees)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?1");

        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(employee)
    }

    pub async fn insert(&self, input: &EmployeeInput) -> DbResult<Employee> {
        validate_name("name", &input.name)?;
        validate_price("salary", input.salary)?;

        let result = sqlx::query(
            "INSERT INTO employees (name, phone, joining_date, salary, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(input.joining_date)
        .bind(input.salary)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(employee_id = id, name = %input.name, "Employee added");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Employee", id))
    }

    pub async fn update(&self, id: i64, input: &EmployeeInput) -> DbResult<Employee> {
        validate_name("name", &input.name)?;
        validate_price("salary", input.salary)?;
        debug!(employee_id = id, "Updating employee");

        let result = sqlx::query(
            "UPDATE employees SET name = ?2, phone = ?3, joining_date = ?4, salary = ?5 WHERE id = ?1",
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(input.joining_date)
        .bind(input.salary)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Employee", id))
    }

    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee", id));
        }

        info!(employee_id = id, "Employee deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.employees();

        let e = repo
            .insert(&EmployeeInput {
                name: "Ravi".to_string(),
                phone: Some("9876543210".to_string()),
                joining_date: NaiveDate::from_ymd_opt(2024, 4, 1),
                salary: Money::from_paise(1_800_000),
            })
            .await
            .unwrap();
        assert_eq!(e.joining_date, NaiveDate::from_ymd_opt(2024, 4, 1));
        assert_eq!(e.salary, Money::from_paise(1_800_000));

        let updated = repo
            .update(
                e.id,
                &EmployeeInput {
                    name: "Ravi K".to_string(),
                    phone: None,
                    joining_date: None,
                    salary: Money::from_paise(2_000_000),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Ravi K");
        assert_eq!(updated.phone, None);

        repo.delete(e.id).await.unwrap();
        assert!(repo.get_by_id(e.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_negative_salary_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let result = db
            .employees()
            .insert(&EmployeeInput {
                name: "Anu".to_string(),
                phone: None,
                joining_date: None,
                salary: Money::from_paise(-1),
            })
            .await;
        assert!(matches!(result, Err(DbError::Core(_))));
    }
}
