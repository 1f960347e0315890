//! # Config Commands
//!
//! Shop configuration and a liveness check for the front end.

use chrono::{DateTime, Utc};
use lubri_db::MigrationStatus;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::{ConfigState, DbState};

/// Result of `health_check`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub database: bool,
    pub migrations: Option<MigrationStatus>,
    pub checked_at: DateTime<Utc>,
}

/// Gets the current application configuration.
///
/// ## When Used
/// - App startup (to configure UI)
/// - Bill printing (shop name, address, GSTIN)
/// - Currency formatting
pub fn get_config(config: &ConfigState) -> ConfigState {
    debug!("get_config command");
    config.clone()
}

/// Reports whether the database answers and whether its schema is current.
///
/// Never fails: an unreachable database is reported, not raised.
pub async fn health_check(db: &DbState) -> Result<HealthReport, ApiError> {
    let database = db.inner().health_check().await;

    let migrations = match db.inner().migration_status().await {
        Ok(status) => Some(status),
        Err(e) => {
            warn!(error = %e, "Could not read migration status");
            None
        }
    };

    Ok(HealthReport {
        database,
        migrations,
        checked_at: Utc::now(),
    })
}
