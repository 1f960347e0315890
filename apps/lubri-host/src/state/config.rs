//! # Configuration State
//!
//! Shop details and thresholds, loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`LUBRI_*`)
//! 2. Defaults (this file)
//!
//! Read-only after startup, so no lock.

use lubri_core::{Money, PaymentMode, DEFAULT_LOW_STOCK_THRESHOLD};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Shop name (printed on bills)
    pub shop_name: String,

    /// Address lines (printed on bills)
    pub shop_address: Vec<String>,

    /// GST registration number, if the shop has one
    pub gstin: Option<String>,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,

    /// Products with fewer units than this count as low stock
    pub low_stock_threshold: i64,

    /// Preselected payment mode on the billing screen
    pub default_payment_mode: PaymentMode,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            shop_name: "Lubri Oil Store".to_string(),
            shop_address: vec!["Main Road".to_string()],
            gstin: None,
            currency_symbol: "₹".to_string(),
            currency_decimals: 2,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            default_payment_mode: PaymentMode::Cash,
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `LUBRI_SHOP_NAME`: Shop name
    /// - `LUBRI_SHOP_ADDRESS`: Address lines separated by `|`
    /// - `LUBRI_GSTIN`: GST registration number
    /// - `LUBRI_LOW_STOCK_THRESHOLD`: Integer threshold (ignored if unparseable)
    /// - `LUBRI_CURRENCY_SYMBOL`: Display symbol
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ConfigState::default();

        if let Some(name) = lookup("LUBRI_SHOP_NAME") {
            config.shop_name = name;
        }

        if let Some(address) = lookup("LUBRI_SHOP_ADDRESS") {
            config.shop_address = address
                .split('|')
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(gstin) = lookup("LUBRI_GSTIN") {
            let gstin = gstin.trim().to_uppercase();
            config.gstin = (!gstin.is_empty()).then_some(gstin);
        }

        if let Some(threshold) = lookup("LUBRI_LOW_STOCK_THRESHOLD") {
            if let Ok(threshold) = threshold.trim().parse::<i64>() {
                config.low_stock_threshold = threshold.max(0);
            }
        }

        if let Some(symbol) = lookup("LUBRI_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        config
    }

    /// Formats an amount with the configured symbol.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_paise(1234)), "₹12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let paise = amount.paise();
        let divisor = 10_i64.pow(self.currency_decimals as u32);
        let whole = paise / divisor;
        let frac = (paise % divisor).abs();

        format!(
            "{}{}{}",
            if paise < 0 { "-" } else { "" },
            self.currency_symbol,
            if self.currency_decimals > 0 {
                format!(
                    "{}.{:0width$}",
                    whole.abs(),
                    frac,
                    width = self.currency_decimals as usize
                )
            } else {
                whole.abs().to_string()
            }
        )
    }
}
