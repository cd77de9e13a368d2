//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! The scaler and classifier artifacts were fit against this exact order.
//! Any drift silently produces wrong predictions, so the table below is
//! checked against both artifacts at startup.
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//! 4. Any of the above also means retraining both artifacts

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// One slot of the feature vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSlot {
    pub name: &'static str,
    /// Value used when the field is absent from the input record
    pub default: f64,
}

impl FeatureSlot {
    const fn new(name: &'static str) -> Self {
        Self { name, default: 0.0 }
    }
}

/// Slots in exact vector order. SINGLE SOURCE OF TRUTH for the layout.
///
/// Categoricals arrive already one-hot encoded by the caller. Mutual
/// exclusivity inside a one-hot group is not enforced.
pub const FEATURE_SCHEMA: &[FeatureSlot] = &[
    // === Demographics / history (0-10) ===
    FeatureSlot::new("age"),                    // 0
    FeatureSlot::new("hypertension"),           // 1
    FeatureSlot::new("diabetes"),               // 2
    FeatureSlot::new("cholesterol_level"),      // 3
    FeatureSlot::new("obesity"),                // 4
    FeatureSlot::new("waist_circumference"),    // 5
    FeatureSlot::new("sleep_hours"),            // 6
    FeatureSlot::new("fasting_blood_sugar"),    // 7
    FeatureSlot::new("triglycerides"),          // 8
    FeatureSlot::new("previous_heart_disease"), // 9
    FeatureSlot::new("medication_usage"),       // 10

    // === One-hot groups (11-20) ===
    FeatureSlot::new("region_Urban"),           // 11
    FeatureSlot::new("income_level_middle"),    // 12
    FeatureSlot::new("smoking_status_Never"),   // 13
    FeatureSlot::new("smoking_status_Past"),    // 14
    FeatureSlot::new("smoking_status_Unknown"), // 15
    FeatureSlot::new("physical_activity_Low"),  // 16
    // Both casings came out of the training data; the model weights depend
    // on each position, so neither may be dropped without retraining.
    FeatureSlot::new("stress_level_Moderate"),  // 17
    FeatureSlot::new("stress_level_moderate"),  // 18
    FeatureSlot::new("EKG_results_Normal"),     // 19
    FeatureSlot::new("gender_Male"),            // 20
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_SCHEMA.len()!
pub const FEATURE_COUNT: usize = 21;

/// Fields the request boundary insists on before any encoding happens
pub const REQUIRED_FIELDS: &[&str] = &["age", "gender_Male"];

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for slot in FEATURE_SCHEMA {
        hasher.update(slot.name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout information for the model info route and log entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: String,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: format!("{:08x}", layout_hash()),
            feature_count: FEATURE_COUNT,
            feature_names: feature_names().map(str::to_string).collect(),
        }
    }
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Names in layout order
pub fn feature_names() -> impl Iterator<Item = &'static str> {
    FEATURE_SCHEMA.iter().map(|slot| slot.name)
}

/// Get feature index by name (O(n) but features are few)
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_SCHEMA.iter().position(|slot| slot.name == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_SCHEMA.get(index).map(|slot| slot.name)
}

/// Check a declared name list against the layout, returning the first
/// position where they disagree.
pub fn first_layout_mismatch(names: &[String]) -> Option<usize> {
    if names.len() != FEATURE_COUNT {
        return Some(names.len().min(FEATURE_COUNT));
    }
    names
        .iter()
        .zip(feature_names())
        .position(|(declared, expected)| declared != expected)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 21);
        assert_eq!(FEATURE_SCHEMA.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = feature_names().collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_every_default_is_zero() {
        assert!(FEATURE_SCHEMA.iter().all(|slot| slot.default == 0.0));
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(compute_layout_hash(), compute_layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("age"), Some(0));
        assert_eq!(feature_index("stress_level_Moderate"), Some(17));
        assert_eq!(feature_index("stress_level_moderate"), Some(18));
        assert_eq!(feature_index("gender_Male"), Some(20));
        assert_eq!(feature_index("Age"), None);
    }

    #[test]
    fn test_feature_name() {
        assert_eq!(feature_name(0), Some("age"));
        assert_eq!(feature_name(20), Some("gender_Male"));
        assert_eq!(feature_name(21), None);
    }

    #[test]
    fn test_required_fields_are_in_layout() {
        for name in REQUIRED_FIELDS {
            assert!(feature_index(name).is_some(), "{name} missing from layout");
        }
    }

    #[test]
    fn test_first_layout_mismatch() {
        let mut names: Vec<String> = feature_names().map(str::to_string).collect();
        assert_eq!(first_layout_mismatch(&names), None);

        names.swap(17, 18);
        assert_eq!(first_layout_mismatch(&names), Some(17));

        names.truncate(20);
        assert_eq!(first_layout_mismatch(&names), Some(20));
    }

    #[test]
    fn test_layout_info() {
        let info = LayoutInfo::current();
        assert_eq!(info.version, FEATURE_VERSION);
        assert_eq!(info.feature_count, FEATURE_COUNT);
        assert_eq!(info.feature_names.len(), FEATURE_COUNT);
        assert_eq!(info.hash.len(), 8);
    }
}
