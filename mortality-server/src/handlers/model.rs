//! Model status handler

use axum::{extract::State, Json};
use serde::Serialize;

use mortality_core::features::input::bounds;
use mortality_core::features::LayoutInfo;
use mortality_core::model::{engine_stats, BundleSource, EngineStats, ModelMetrics, StoreStatus};
use mortality_core::Resuscitation;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct InputBound {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    #[serde(flatten)]
    pub store: StoreStatus,
    pub classifier: Option<String>,
    pub threshold: Option<f64>,
    pub metrics: Option<ModelMetrics>,
    pub source: Option<BundleSource>,
    pub layout: LayoutInfo,
    pub resuscitation_options: Vec<&'static str>,
    pub input_bounds: Vec<InputBound>,
    pub engine: EngineStats,
}

fn input_bounds() -> Vec<InputBound> {
    [
        ("lactate", bounds::LACTATE),
        ("urea", bounds::UREA),
        ("creatinine", bounds::CREATININE),
        ("platelets", bounds::PLATELETS),
    ]
    .into_iter()
    .map(|(field, (min, max))| InputBound { field, min, max })
    .collect()
}

/// Describe the loaded model and the inputs it expects
pub async fn info(State(state): State<AppState>) -> Json<ModelInfoResponse> {
    let bundle = state.store.load().bundle().cloned();

    Json(ModelInfoResponse {
        store: state.store.status(),
        classifier: bundle.as_ref().map(|b| b.model().name().to_string()),
        threshold: bundle.as_ref().map(|b| b.threshold().value()),
        metrics: bundle.as_ref().and_then(|b| b.metrics().cloned()),
        source: bundle.as_ref().and_then(|b| b.source().cloned()),
        layout: LayoutInfo::current(),
        resuscitation_options: Resuscitation::ALL.iter().map(Resuscitation::as_str).collect(),
        input_bounds: input_bounds(),
        engine: engine_stats(),
    })
}
