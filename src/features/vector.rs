//! Feature Vector - Core data structure for ML input
//!
//! Fixed width, fixed order. Slot `i` always holds `FEATURE_SCHEMA[i]`.

use serde::{Deserialize, Serialize};

use super::layout::{feature_index, layout_hash, FEATURE_COUNT, FEATURE_SCHEMA, FEATURE_VERSION};

/// Ordered model input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Vector holding every slot's default
    pub fn defaults() -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for (value, slot) in values.iter_mut().zip(FEATURE_SCHEMA) {
            *value = slot.default;
        }
        Self { values }
    }

    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        feature_index(name).and_then(|i| self.get(i))
    }

    pub(crate) fn set(&mut self, index: usize, value: f64) {
        if index < FEATURE_COUNT {
            self.values[index] = value;
        }
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": FEATURE_VERSION,
            "layout_hash": format!("{:08x}", layout_hash()),
            "named_values": FEATURE_SCHEMA.iter()
                .zip(self.values.iter())
                .map(|(slot, value)| (slot.name.to_string(), serde_json::Value::from(*value)))
                .collect::<serde_json::Map<_, _>>(),
        })
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::defaults()
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}
