//! Configuration module

use std::env;

use mortality_core::constants;
use mortality_core::TelemetryConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Model artifact path
    pub model_path: String,

    /// Expected SHA-256 of the artifact
    pub model_sha256: Option<String>,

    /// Spreadsheet telemetry settings
    pub telemetry: TelemetryConfig,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            model_path: constants::get_model_path(),

            model_sha256: constants::get_model_sha256(),

            telemetry: TelemetryConfig::from_env(),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
