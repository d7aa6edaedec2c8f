//! Features Module - FeatureBuilder
//!
//! Maps validated patient input onto the exact column schema the
//! classifier was trained on.

pub mod layout;
pub mod input;
pub mod builder;

#[cfg(test)]
mod tests;

// Re-export common types
pub use builder::{build, FeatureRow, FeatureValue};
pub use input::{InputError, PatientInput, Resuscitation, NO_RESUSCITATION};
pub use layout::{LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT};
