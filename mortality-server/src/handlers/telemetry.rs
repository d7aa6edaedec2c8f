//! Telemetry diagnostics handler

use axum::{extract::State, Json};
use serde::Serialize;

use mortality_core::telemetry::RowSchema;
use mortality_core::SaveReport;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DiagnosticsResponse {
    pub enabled: bool,
    pub row_schema: RowSchema,
    pub columns: Vec<&'static str>,
    /// Latest finished save; `None` while one is in flight or before the first
    pub report: Option<SaveReport>,
}

pub async fn diagnostics(State(state): State<AppState>) -> Json<DiagnosticsResponse> {
    let config = state.telemetry.config();

    Json(DiagnosticsResponse {
        enabled: config.enabled,
        row_schema: config.row_schema,
        columns: config.row_schema.header(),
        report: state.telemetry.last_report(),
    })
}
