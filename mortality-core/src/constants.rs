//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden from the environment.

/// Default model artifact path
pub const DEFAULT_MODEL_PATH: &str = "models/rf_mortality_model.json";

/// Default structured secrets file (TOML, `[gsheets]` table)
pub const DEFAULT_SECRETS_PATH: &str = ".streamlit/secrets.toml";

/// Default directory scanned for credential files
pub const DEFAULT_CREDENTIALS_DIR: &str = ".";

/// Credential files tried in this order when no structured secrets exist
pub const CREDENTIAL_FILES: &[&str] = &[
    "google_credentials.json",
    "service_account.json",
    "credentials.json",
];

/// Default per-step timeout for spreadsheet calls (seconds)
pub const DEFAULT_STEP_TIMEOUT_SECS: u64 = 15;

/// Google OAuth token endpoint
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Google Sheets REST base
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

/// OAuth scope for spreadsheet access
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Timestamp layout written to the sheet
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get model artifact path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Expected SHA-256 of the model artifact, if pinned
pub fn get_model_sha256() -> Option<String> {
    std::env::var("MODEL_SHA256")
        .ok()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

/// Check if telemetry is enabled
pub fn is_telemetry_enabled() -> bool {
    std::env::var("TELEMETRY_ENABLED")
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(true)
}

/// Get secrets file path from environment or use default
pub fn get_secrets_path() -> String {
    std::env::var("SECRETS_PATH")
        .unwrap_or_else(|_| DEFAULT_SECRETS_PATH.to_string())
}

/// Get credential directory from environment or use default
pub fn get_credentials_dir() -> String {
    std::env::var("CREDENTIALS_DIR")
        .unwrap_or_else(|_| DEFAULT_CREDENTIALS_DIR.to_string())
}

/// Spreadsheet id used with file credentials
pub fn get_spreadsheet_id() -> Option<String> {
    std::env::var("SHEETS_SPREADSHEET_ID").ok().filter(|s| !s.is_empty())
}

/// Worksheet name used with file credentials
pub fn get_worksheet_name() -> Option<String> {
    std::env::var("SHEETS_WORKSHEET_NAME").ok().filter(|s| !s.is_empty())
}

/// Get telemetry row schema name from environment
pub fn get_row_schema() -> String {
    std::env::var("TELEMETRY_ROW_SCHEMA")
        .unwrap_or_else(|_| "compact".to_string())
}

/// Get per-step timeout from environment or use default
pub fn get_step_timeout_secs() -> u64 {
    std::env::var("TELEMETRY_STEP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|s: &u64| *s > 0)
        .unwrap_or(DEFAULT_STEP_TIMEOUT_SECS)
}

/// Get OAuth token endpoint from environment or use default
pub fn get_token_uri() -> String {
    std::env::var("GOOGLE_TOKEN_URI")
        .unwrap_or_else(|_| DEFAULT_TOKEN_URI.to_string())
}

/// Get Sheets API base from environment or use default
pub fn get_sheets_api_base() -> String {
    std::env::var("SHEETS_API_BASE")
        .unwrap_or_else(|_| DEFAULT_SHEETS_API_BASE.to_string())
}
