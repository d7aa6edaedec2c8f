//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! The column names and their order must match the frame the classifier was
//! trained on, character for character. Any change here must bump
//! `FEATURE_VERSION`; the model store refuses artifacts whose declared layout
//! hashes differently.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

pub const LACTATE: &str = "Lactate (in ABG)";
pub const UREA: &str = "Urea (mg/dl)";
pub const CREATININE: &str = "Creatinine (mg/dl)";
pub const PLATELETS: &str = "Platelets (10 ^ 6)";
pub const RESUSCITATION: &str = "Resuscitation Received";

/// Feature names in exact order they appear in a feature row
pub const FEATURE_LAYOUT: &[&str] = &[
    LACTATE,       // 0: mmol/L, arterial blood gas
    UREA,          // 1: mg/dl
    CREATININE,    // 2: mg/dl
    PLATELETS,     // 3: 10^6 / uL
    RESUSCITATION, // 4: categorical, joined intervention tags
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 5;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over an arbitrary list of column names (version included)
pub fn hash_columns<S: AsRef<str>>(names: &[S]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for name in names {
        hasher.update(name.as_ref().as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Hash of the current layout
pub fn layout_hash() -> u32 {
    hash_columns(FEATURE_LAYOUT)
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when a model declares a different column layout
#[derive(Debug, Clone, thiserror::Error)]
#[error("Feature layout mismatch: expected {expected:?} (hash: {expected_hash:08x}), got {actual:?} (hash: {actual_hash:08x})")]
pub struct LayoutMismatchError {
    pub expected: Vec<String>,
    pub expected_hash: u32,
    pub actual: Vec<String>,
    pub actual_hash: u32,
}

/// Validate that a declared column list matches the current layout
pub fn validate_columns<S: AsRef<str>>(declared: &[S]) -> Result<(), LayoutMismatchError> {
    let expected_hash = layout_hash();
    let actual_hash = hash_columns(declared);

    if actual_hash != expected_hash || declared.len() != FEATURE_COUNT {
        return Err(LayoutMismatchError {
            expected: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            expected_hash,
            actual: declared.iter().map(|s| s.as_ref().to_string()).collect(),
            actual_hash,
        });
    }

    Ok(())
}

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(layout_hash(), layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_validate_columns_success() {
        assert!(validate_columns(FEATURE_LAYOUT).is_ok());
    }

    #[test]
    fn test_validate_columns_order_matters() {
        let swapped = [UREA, LACTATE, CREATININE, PLATELETS, RESUSCITATION];
        assert!(validate_columns(&swapped).is_err());
    }

    #[test]
    fn test_validate_columns_spelling_matters() {
        let respelled = [LACTATE, UREA, CREATININE, "Platelets (10^6)", RESUSCITATION];
        let err = validate_columns(&respelled).unwrap_err();
        assert_eq!(err.actual[3], "Platelets (10^6)");
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index(LACTATE), Some(0));
        assert_eq!(feature_index(RESUSCITATION), Some(4));
        assert_eq!(feature_index("nonexistent"), None);
    }
}
