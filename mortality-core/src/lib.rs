//! ED Mortality Risk - Core
//!
//! Feature encoding, model loading, thresholded risk prediction and
//! best-effort spreadsheet telemetry for the emergency-department
//! mortality risk demo.
//!
//! Request flow: `PatientInput` -> [`features::build`] -> [`model::predict`]
//! -> result, then [`telemetry::TelemetrySink::dispatch`] in the background.

pub mod constants;
pub mod features;
pub mod model;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use features::{build, FeatureRow, InputError, PatientInput, Resuscitation};
pub use model::{predict, ModelState, ModelStore, PredictError, PredictionResult, RiskLabel};
pub use telemetry::{SaveReport, TelemetryConfig, TelemetryRecord, TelemetrySink};
