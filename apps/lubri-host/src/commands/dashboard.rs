//! # Dashboard Commands

use lubri_core::DashboardStats;

use crate::error::ApiError;
use crate::state::{ConfigState, DbState};

/// Headline counts, recent bills and the last seven days of sales.
pub async fn get_dashboard_stats(db: &DbState, config: &ConfigState) -> Result<DashboardStats, ApiError> {
    Ok(db.inner().dashboard().stats(config.low_stock_threshold).await?)
}
