//! Telemetry Module - TelemetrySink
//!
//! Best-effort persistence of prediction records to a Google spreadsheet.
//! A failed save never reaches the caller as an error: each call returns a
//! [`SaveReport`] with a success flag and its own diagnostic trail.
//!
//! ## Structure
//! - `credentials.rs` - secrets file first, then credential files
//! - `sheets.rs` - spreadsheet capability trait + Google Sheets v4 client
//! - `worksheet.rs` - worksheet name matching with fallback tiers
//! - `record.rs` - telemetry record and row schema
//! - `sink.rs` - the save protocol, timeouts and fire-and-forget dispatch
//! - `diagnostics.rs` - per-call timestamped messages
//!
//! ## Usage
//! ```ignore
//! let sink = TelemetrySink::google(TelemetryConfig::from_env())?;
//! sink.dispatch(TelemetryRecord::new(input, result));
//! ```

pub mod credentials;
pub mod diagnostics;
pub mod record;
pub mod sheets;
pub mod sink;
pub mod worksheet;


use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::constants;

// Re-export main types
pub use credentials::{CredentialSource, ResolvedCredentials, ServiceAccountKey, SheetTarget};
pub use diagnostics::{DiagnosticLevel, DiagnosticLog, DiagnosticMessage};
pub use record::{RowSchema, TelemetryRecord};
pub use sheets::{AccessToken, GoogleSheetsClient, SheetsError, SpreadsheetApi, SpreadsheetInfo};
pub use sink::{SaveReport, TelemetrySink, Verification};
pub use worksheet::{resolve_worksheet, MatchTier};

// ============================================================================
// ERRORS
// ============================================================================

/// Telemetry failure taxonomy. None of these ever reach the prediction path.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TelemetryError {
    #[error("No usable Google Sheets credentials: {0}")]
    Credential(String),

    #[error("Authorization failed: {0}")]
    Auth(String),

    #[error("Spreadsheet target not found: {0}")]
    TargetNotFound(String),

    #[error("Could not append row: {0}")]
    Write(String),

    #[error("Write could not be verified: {0}")]
    VerifyMismatch(String),
}

impl TelemetryError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Credential(_) => "TelemetryCredentialError",
            Self::Auth(_) => "TelemetryAuthError",
            Self::TargetNotFound(_) => "TelemetryTargetNotFound",
            Self::Write(_) => "TelemetryWriteError",
            Self::VerifyMismatch(_) => "TelemetryVerifyMismatch",
        }
    }
}

/// Serializable form of a telemetry failure
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryFailure {
    pub kind: &'static str,
    pub message: String,
}

impl From<&TelemetryError> for TelemetryFailure {
    fn from(e: &TelemetryError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Master switch
    pub enabled: bool,
    /// Structured secrets (TOML with a `[gsheets]` table)
    pub secrets_path: PathBuf,
    /// Directory scanned for credential files
    pub credentials_dir: PathBuf,
    /// Spreadsheet id used with file credentials
    pub spreadsheet_id: Option<String>,
    /// Worksheet name used with file credentials
    pub worksheet_name: Option<String>,
    /// Columns written per record
    pub row_schema: RowSchema,
    /// Upper bound for each network step
    pub step_timeout: Duration,
    /// OAuth token endpoint when the key does not name one
    pub token_uri: String,
    /// Sheets REST base URL
    pub sheets_api_base: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            secrets_path: PathBuf::from(constants::DEFAULT_SECRETS_PATH),
            credentials_dir: PathBuf::from(constants::DEFAULT_CREDENTIALS_DIR),
            spreadsheet_id: None,
            worksheet_name: None,
            row_schema: RowSchema::default(),
            step_timeout: Duration::from_secs(constants::DEFAULT_STEP_TIMEOUT_SECS),
            token_uri: constants::DEFAULT_TOKEN_URI.to_string(),
            sheets_api_base: constants::DEFAULT_SHEETS_API_BASE.to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        let row_schema = constants::get_row_schema()
            .parse()
            .unwrap_or_else(|e| {
                log::warn!("{} - falling back to compact rows", e);
                RowSchema::default()
            });

        Self {
            enabled: constants::is_telemetry_enabled(),
            secrets_path: PathBuf::from(constants::get_secrets_path()),
            credentials_dir: PathBuf::from(constants::get_credentials_dir()),
            spreadsheet_id: constants::get_spreadsheet_id(),
            worksheet_name: constants::get_worksheet_name(),
            row_schema,
            step_timeout: Duration::from_secs(constants::get_step_timeout_secs()),
            token_uri: constants::get_token_uri(),
            sheets_api_base: constants::get_sheets_api_base(),
        }
    }
}
