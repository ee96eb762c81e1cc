use crate::core::{AppError, Currency, DisplayFormat, Locale, Result};
use crate::modules::reports::services::MAX_COST_ANALYSIS_LIMIT;
use crate::modules::reports::ReportPeriod;
use std::env;
use std::str::FromStr;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub reports: ReportsConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    /// `text` or `json`
    pub log_format: String,
}

/// Report presentation settings
#[derive(Debug, Clone)]
pub struct ReportsConfig {
    pub currency: Currency,
    pub locale: Locale,
    /// Period shown before the first explicit selection
    pub default_period: ReportPeriod,
    /// Cost analyses returned when the request sets no limit
    pub cost_analysis_limit: u32,
}

impl ReportsConfig {
    pub fn display_format(&self) -> DisplayFormat {
        DisplayFormat::new(self.currency, self.locale)
    }

    pub fn from_env() -> Result<Self> {
        Ok(ReportsConfig {
            currency: parse_var("REPORT_CURRENCY", "EUR")?,
            locale: parse_var("REPORT_LOCALE", "fr-FR")?,
            default_period: parse_var("REPORT_DEFAULT_PERIOD", "1m")?,
            cost_analysis_limit: parse_var("COST_ANALYSIS_LIMIT", "5")?,
        })
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            currency: Currency::EUR,
            locale: Locale::FrFr,
            default_period: ReportPeriod::OneMonth,
            cost_analysis_limit: 5,
        }
    }
}

/// Reads `key`, falling back to `default`, and parses it
pub(crate) fn parse_var<T: FromStr>(key: &str, default: &str) -> Result<T> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::Configuration(format!("Invalid {}", key)))
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            reports: ReportsConfig::from_env()?,
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.app.log_format.as_str(), "text" | "json") {
            return Err(AppError::Configuration(format!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.app.log_format
            )));
        }

        if self.reports.cost_analysis_limit == 0
            || self.reports.cost_analysis_limit > MAX_COST_ANALYSIS_LIMIT
        {
            return Err(AppError::Configuration(format!(
                "COST_ANALYSIS_LIMIT must be between 1 and {}",
                MAX_COST_ANALYSIS_LIMIT
            )));
        }

        self.database.validate()?;
        self.server.validate()?;

        Ok(())
    }
}
