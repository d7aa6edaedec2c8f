//! Prediction handler

use axum::{extract::{rejection::JsonRejection, State}, Json};
use serde::Serialize;

use mortality_core::model::ModelMetrics;
use mortality_core::{features, model, PatientInput, PredictionResult, RiskLabel, TelemetryRecord};

use crate::{AppResult, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryStatus {
    Queued,
    Disabled,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub label: RiskLabel,
    pub prediction: u8,
    pub risk_level: &'static str,
    pub probability: f64,
    pub threshold: f64,
    pub resuscitation: String,
    pub interpretation: String,
    pub metrics: Option<ModelMetrics>,
    pub telemetry: TelemetryStatus,
}

/// Clinical interpretation shown under the result
pub fn interpretation(result: &PredictionResult) -> String {
    let threshold = result.threshold_used();
    match result.label() {
        RiskLabel::HighRisk => format!(
            "HIGH RISK ALERT: this patient has a mortality probability above the optimized \
             threshold of {:.3}. Consider immediate intervention and close monitoring.",
            threshold
        ),
        RiskLabel::LowRisk => format!(
            "LOW RISK: this patient has a mortality probability below the optimized \
             threshold of {:.3}. Continue with standard care protocols while maintaining \
             appropriate monitoring.",
            threshold
        ),
    }
}

/// Encode, classify, respond; telemetry is handed off and never awaited
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PatientInput>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Json(input) = payload?;

    let row = features::build(&input)?;
    let model_state = state.store.load();
    let result = model::predict(model_state, &row)?;
    let metrics = model_state.bundle().and_then(|b| b.metrics().cloned());

    tracing::info!(
        "Prediction {} (p={:.3}, threshold={:.3})",
        result.label(),
        result.probability(),
        result.threshold_used()
    );

    let telemetry = if state.telemetry.is_enabled() {
        state.telemetry.dispatch(TelemetryRecord::new(input.clone(), result));
        TelemetryStatus::Queued
    } else {
        TelemetryStatus::Disabled
    };

    Ok(Json(PredictResponse {
        label: result.label(),
        prediction: result.label().as_flag(),
        risk_level: result.label().risk_level(),
        probability: result.probability(),
        threshold: result.threshold_used(),
        resuscitation: input.resuscitation_value(),
        interpretation: interpretation(&result),
        metrics,
        telemetry,
    }))
}
