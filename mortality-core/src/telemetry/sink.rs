//! TelemetrySink - best-effort save protocol.
//!
//! credentials -> authorize -> open spreadsheet -> resolve worksheet ->
//! pre-read -> append -> verify. Every network step runs under the
//! configured step timeout. Failures end up in the returned [`SaveReport`].

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::credentials;
use super::diagnostics::DiagnosticLog;
use super::record::{RowSchema, TelemetryRecord};
use super::sheets::{AccessToken, GoogleSheetsClient, SheetsError, SpreadsheetApi};
use super::worksheet::{resolve_worksheet, MatchTier};
use super::{TelemetryConfig, TelemetryError, TelemetryFailure};

/// Outcome of the post-write read-back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verification {
    /// Row count grew and the new row carries our timestamp
    Confirmed,
    /// Read-back succeeded but did not show the row
    Mismatch,
    /// Read-back failed
    Inconclusive,
    #[default]
    Skipped,
}

/// Result of one save call
#[derive(Debug, Clone, Serialize)]
pub struct SaveReport {
    pub call_id: Uuid,
    pub saved: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub row_schema: RowSchema,
    pub credential_source: Option<String>,
    pub spreadsheet_title: Option<String>,
    pub worksheet: Option<String>,
    pub match_tier: Option<MatchTier>,
    pub rows_before: Option<usize>,
    pub rows_after: Option<usize>,
    pub verification: Verification,
    pub failure: Option<TelemetryFailure>,
    pub diagnostics: DiagnosticLog,
}

impl SaveReport {
    fn begin(row_schema: RowSchema) -> Self {
        Self {
            call_id: Uuid::new_v4(),
            saved: false,
            started_at: Utc::now(),
            finished_at: None,
            row_schema,
            credential_source: None,
            spreadsheet_title: None,
            worksheet: None,
            match_tier: None,
            rows_before: None,
            rows_after: None,
            verification: Verification::Skipped,
            failure: None,
            diagnostics: DiagnosticLog::new(),
        }
    }

    pub fn failure_kind(&self) -> Option<&'static str> {
        self.failure.as_ref().map(|f| f.kind)
    }
}

/// Persists prediction records to a spreadsheet without ever failing the caller
#[derive(Clone)]
pub struct TelemetrySink {
    api: Arc<dyn SpreadsheetApi>,
    config: Arc<TelemetryConfig>,
    last_report: Arc<RwLock<Option<SaveReport>>>,
    /// Bumped on every dispatch; only the latest dispatch may publish
    generation: Arc<AtomicU64>,
}

impl TelemetrySink {
    pub fn new(api: Arc<dyn SpreadsheetApi>, config: TelemetryConfig) -> Self {
        Self {
            api,
            config: Arc::new(config),
            last_report: Arc::new(RwLock::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Sink backed by the Google Sheets REST API
    pub fn google(config: TelemetryConfig) -> Result<Self, SheetsError> {
        let client = GoogleSheetsClient::new(config.sheets_api_base.clone(), config.step_timeout)?;
        Ok(Self::new(Arc::new(client), config))
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Report of the most recently dispatched save, once it has finished.
    /// Saves overtaken by a later dispatch never show up here.
    pub fn last_report(&self) -> Option<SaveReport> {
        self.last_report.read().clone()
    }

    /// Save in the background. The previous report is cleared immediately.
    pub fn dispatch(&self, record: TelemetryRecord) -> JoinHandle<()> {
        let generation = {
            let mut board = self.last_report.write();
            *board = None;
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        let sink = self.clone();
        tokio::spawn(async move {
            let report = sink.save(&record).await;
            if report.saved {
                log::info!("Telemetry saved ({})", report.call_id);
            } else {
                log::warn!(
                    "Telemetry not saved ({}): {}",
                    report.call_id,
                    report.failure_kind().unwrap_or("disabled")
                );
            }

            let mut board = sink.last_report.write();
            if sink.generation.load(Ordering::SeqCst) == generation {
                *board = Some(report);
            } else {
                log::debug!("Telemetry report {} superseded by a later save", report.call_id);
            }
        })
    }

    /// Run the full save protocol once
    pub async fn save(&self, record: &TelemetryRecord) -> SaveReport {
        let mut report = SaveReport::begin(self.config.row_schema);

        if !self.config.enabled {
            report.diagnostics.info("Telemetry disabled, nothing written");
        } else {
            match self.run(record, &mut report).await {
                Ok(()) => report.saved = true,
                Err(e) => {
                    report.diagnostics.error(format!("{}: {}", e.kind(), e));
                    report.failure = Some(TelemetryFailure::from(&e));
                }
            }
        }

        report.finished_at = Some(Utc::now());
        report
    }

    async fn step<T, F>(&self, name: &str, fut: F) -> Result<T, String>
    where
        F: Future<Output = Result<T, SheetsError>>,
    {
        match tokio::time::timeout(self.config.step_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(format!("{} failed: {}", name, e)),
            Err(_) => Err(format!("{} timed out after {:?}", name, self.config.step_timeout)),
        }
    }

    async fn run(&self, record: &TelemetryRecord, report: &mut SaveReport) -> Result<(), TelemetryError> {
        let creds = credentials::resolve(&self.config, &mut report.diagnostics)?;
        report.credential_source = Some(creds.source.to_string());

        let token = self
            .step("authorize", self.api.authorize(&creds.key))
            .await
            .map_err(TelemetryError::Auth)?;
        report.diagnostics.success(format!("Authorized as {}", creds.key.client_email));

        let spreadsheet_id = creds.target.spreadsheet_id.as_str();
        let info = self
            .step("open spreadsheet", self.api.open(&token, spreadsheet_id))
            .await
            .map_err(TelemetryError::TargetNotFound)?;
        report.diagnostics.success(format!("Opened spreadsheet: {}", info.title));
        report.spreadsheet_title = Some(info.title.clone());

        let wanted = creds.target.worksheet_name.as_str();
        let (worksheet, tier) = resolve_worksheet(wanted, &info.worksheets).ok_or_else(|| {
            TelemetryError::TargetNotFound(format!("spreadsheet '{}' has no worksheets", info.title))
        })?;
        let worksheet = worksheet.to_string();
        if tier == MatchTier::Exact {
            report.diagnostics.success(format!("Found worksheet: {}", worksheet));
        } else {
            report.diagnostics.warn(format!(
                "Worksheet '{}' not found, using '{}' ({} match)",
                wanted,
                worksheet,
                tier.as_str()
            ));
        }
        report.worksheet = Some(worksheet.clone());
        report.match_tier = Some(tier);

        match self
            .step("read rows", self.api.read_rows(&token, spreadsheet_id, &worksheet))
            .await
        {
            Ok(rows) => {
                report.diagnostics.info(format!("Current rows: {}", rows.len()));
                report.rows_before = Some(rows.len());
            }
            Err(e) => report.diagnostics.warn(format!("Could not read current rows: {}", e)),
        }

        let row = record.to_row(self.config.row_schema);
        report.diagnostics.info(format!("Appending {} columns", row.len()));
        self.step("append row", self.api.append_row(&token, spreadsheet_id, &worksheet, &row))
            .await
            .map_err(TelemetryError::Write)?;
        report.diagnostics.success("Row appended");

        report.verification = self
            .verify(&token, spreadsheet_id, &worksheet, &record.timestamp_text(), report)
            .await;
        Ok(())
    }

    async fn verify(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        worksheet: &str,
        timestamp: &str,
        report: &mut SaveReport,
    ) -> Verification {
        let rows = match self
            .step("verify read", self.api.read_rows(token, spreadsheet_id, worksheet))
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                report.diagnostics.warn(TelemetryError::VerifyMismatch(e).to_string());
                return Verification::Inconclusive;
            }
        };
        report.rows_after = Some(rows.len());

        let grew = report.rows_before.map_or(true, |before| rows.len() > before);
        let new_rows = match report.rows_before {
            Some(before) => rows.get(before..).unwrap_or_default(),
            None => rows.last().map(std::slice::from_ref).unwrap_or_default(),
        };
        let found = new_rows
            .iter()
            .any(|r| r.first().is_some_and(|cell| cell.starts_with(timestamp)));

        if grew && found {
            report.diagnostics.success(format!("Verified: row count now {}", rows.len()));
            Verification::Confirmed
        } else {
            let detail = format!(
                "rows before {:?}, after {}, timestamp {} {}",
                report.rows_before,
                rows.len(),
                timestamp,
                if found { "present" } else { "not found" }
            );
            report.diagnostics.warn(TelemetryError::VerifyMismatch(detail).to_string());
            Verification::Mismatch
        }
    }
}
