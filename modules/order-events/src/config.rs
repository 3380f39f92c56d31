use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("unknown log format '{other}', expected 'pretty' or 'json'")),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Payments
    pub payment_gateway_url: String,

    // Demo order
    pub order_status: String,
    pub order_total: f64,

    // Logging
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let order_total = match lookup("ORDER_TOTAL") {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .with_context(|| format!("ORDER_TOTAL must be a number, got '{raw}'"))?,
            None => 100.0,
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().context("invalid LOG_FORMAT")?,
            None => LogFormat::default(),
        };

        Ok(Self {
            payment_gateway_url: lookup("PAYMENT_GATEWAY_URL")
                .unwrap_or_else(|| "https://payments.sandbox.local".to_string()),
            order_status: lookup("ORDER_STATUS").unwrap_or_else(|| "created".to_string()),
            order_total,
            log_format,
        })
    }

    pub fn log_loaded(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  PAYMENT_GATEWAY_URL: {}", self.payment_gateway_url);
        tracing::info!("  ORDER_STATUS: {}", self.order_status);
        tracing::info!("  ORDER_TOTAL: {}", self.order_total);
        tracing::info!("  LOG_FORMAT: {:?}", self.log_format);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.payment_gateway_url, "https://payments.sandbox.local");
        assert_eq!(config.order_status, "created");
        assert_eq!(config.order_total, 100.0);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn values_are_read_from_lookup() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PAYMENT_GATEWAY_URL", "https://pay.example"),
            ("ORDER_STATUS", "paid"),
            ("ORDER_TOTAL", " 12.5 "),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.payment_gateway_url, "https://pay.example");
        assert_eq!(config.order_status, "paid");
        assert_eq!(config.order_total, 12.5);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn bad_total_is_reported() {
        let err = AppConfig::from_lookup(lookup(&[("ORDER_TOTAL", "lots")])).unwrap_err();
        assert!(err.to_string().contains("ORDER_TOTAL must be a number"));
    }

    #[test]
    fn bad_log_format_is_reported() {
        let err = AppConfig::from_lookup(lookup(&[("LOG_FORMAT", "xml")])).unwrap_err();
        assert!(format!("{err:#}").contains("unknown log format 'xml'"));
    }
}
