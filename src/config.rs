use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Shop Configuration
// ============================================================================
//
// Explicitly constructed configuration passed to the components that need
// price formatting or history limits. There is no process-wide instance:
// build one with `ShopConfig::default()`, a preset, JSON, or the environment.
//
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid currency: {0}. Must be EUR or USD")]
    InvalidCurrency(String),

    #[error("Invalid locale: {0}. Must be ro or en")]
    InvalidLocale(String),

    #[error("Invalid delivery method: {0}. Must be pickup or courier")]
    InvalidDelivery(String),

    #[error("Invalid max history size: {0}. Must be a positive integer")]
    InvalidHistorySize(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Usd,
}

impl FromStr for Currency {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            _ => Err(ConfigError::InvalidCurrency(s.to_string())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Eur => write!(f, "EUR"),
            Currency::Usd => write!(f, "USD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Ro,
}

impl FromStr for Locale {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ro" => Ok(Locale::Ro),
            _ => Err(ConfigError::InvalidLocale(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryPreference {
    Pickup,
    Courier,
}

impl FromStr for DeliveryPreference {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pickup" => Ok(DeliveryPreference::Pickup),
            "courier" => Ok(DeliveryPreference::Courier),
            _ => Err(ConfigError::InvalidDelivery(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Currency prices are displayed in (prices are stored in EUR)
    pub currency: Currency,
    /// Stored for display; no text is localised yet
    pub locale: Locale,
    /// Preferred fulfilment, mapped to the default `DeliveryMethod`
    pub delivery: DeliveryPreference,
    /// Maximum number of commands kept in the undo/redo history
    pub max_history_size: usize,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            currency: Currency::Eur,
            locale: Locale::En,
            delivery: DeliveryPreference::Courier,
            max_history_size: 50,
        }
    }
}

impl ShopConfig {
    /// US storefront: dollar prices, English locale
    pub fn us() -> Self {
        Self {
            currency: Currency::Usd,
            ..Self::default()
        }
    }

    /// Parse a JSON document; missing fields fall back to defaults
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build from `SHOP_*` environment variables on top of the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("SHOP_CURRENCY") {
            config.currency = value.parse()?;
        }
        if let Ok(value) = std::env::var("SHOP_LOCALE") {
            config.locale = value.parse()?;
        }
        if let Ok(value) = std::env::var("SHOP_DELIVERY") {
            config.delivery = value.parse()?;
        }
        if let Ok(value) = std::env::var("SHOP_MAX_HISTORY") {
            config.max_history_size = match value.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => return Err(ConfigError::InvalidHistorySize(value)),
            };
        }

        Ok(config)
    }

    pub fn currency_symbol(&self) -> &'static str {
        match self.currency {
            Currency::Eur => "€",
            Currency::Usd => "$",
        }
    }

    /// Rate from the stored EUR amount to the display currency
    pub fn exchange_rate(&self) -> f64 {
        match self.currency {
            Currency::Eur => 1.0,
            Currency::Usd => 1.08,
        }
    }

    pub fn format_price(&self, amount: f64) -> String {
        let converted = amount * self.exchange_rate();
        match self.currency {
            Currency::Eur => format!("{:.2} {}", converted, self.currency_symbol()),
            Currency::Usd => format!("{}{:.2}", self.currency_symbol(), converted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ShopConfig::default();
        assert_eq!(config.currency, Currency::Eur);
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.delivery, DeliveryPreference::Courier);
        assert_eq!(config.max_history_size, 50);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(ShopConfig::default().format_price(75.5), "75.50 €");
        assert_eq!(ShopConfig::us().format_price(100.0), "$108.00");
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = ShopConfig::from_json(r#"{"currency":"USD","max_history_size":5}"#).unwrap();
        assert_eq!(config.currency, Currency::Usd);
        assert_eq!(config.max_history_size, 5);
        assert_eq!(config.locale, Locale::En);
    }

    #[test]
    fn test_invalid_currency() {
        let err = "GBP".parse::<Currency>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid currency: GBP. Must be EUR or USD");
    }

    #[test]
    fn test_parse_preferences() {
        assert_eq!("ro".parse::<Locale>().unwrap(), Locale::Ro);
        assert_eq!("Pickup".parse::<DeliveryPreference>().unwrap(), DeliveryPreference::Pickup);
        assert!("drone".parse::<DeliveryPreference>().is_err());
    }
}
