//! Application configuration

use std::env;

use clinicloud_billing::{BillingError, PricingConfig};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,
    pub cors_allowed_origins: Vec<String>,
    pub log_format: LogFormat,

    // Billing
    pub plan_catalog_path: Option<String>,
    pub registration_api_url: Option<String>,
    pub registration_max_retries: usize,
    pub pricing: PricingConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                "pretty" | "text" => LogFormat::Pretty,
                other => {
                    return Err(ConfigError::Invalid(format!(
                        "LOG_FORMAT must be 'json' or 'pretty', got '{}'",
                        other
                    )))
                }
            },

            // Billing
            plan_catalog_path: env::var("PLAN_CATALOG_PATH").ok().filter(|p| !p.is_empty()),
            registration_api_url: {
                match env::var("REGISTRATION_API_URL").ok().filter(|u| !u.is_empty()) {
                    Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                        return Err(ConfigError::Invalid(format!(
                            "REGISTRATION_API_URL must be an http(s) URL, got '{}'",
                            url
                        )));
                    }
                    other => other,
                }
            },
            registration_max_retries: env::var("REGISTRATION_MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(3),
            pricing: PricingConfig::from_env()?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            cors_allowed_origins: Vec::new(),
            log_format: LogFormat::Pretty,
            plan_catalog_path: None,
            registration_api_url: None,
            registration_max_retries: 3,
            pricing: PricingConfig::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Invalid pricing configuration: {0}")]
    Pricing(#[from] BillingError),
}
