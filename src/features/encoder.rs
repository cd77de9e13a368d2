//! Feature Encoder - record → fixed-order vector
//!
//! The default (lenient) policy never fails: absent or misspelled fields
//! fall back to the slot default. A typo like `"Age"` therefore yields a
//! vector with age = 0 instead of an error. Strict mode exists for callers
//! who would rather be told.

use serde::{Deserialize, Serialize};

use super::layout::{FEATURE_SCHEMA, REQUIRED_FIELDS};
use super::record::{InputError, InputRecord};
use super::vector::FeatureVector;

/// Map a record onto the layout. Pure; unknown keys are ignored.
pub fn encode(record: &InputRecord) -> FeatureVector {
    let mut vector = FeatureVector::defaults();

    for (index, slot) in FEATURE_SCHEMA.iter().enumerate() {
        if let Some(value) = record.get(slot.name) {
            vector.set(index, value);
        }
    }

    vector
}

/// Boundary gate: the first required field that is absent
pub fn check_required(record: &InputRecord) -> Result<(), InputError> {
    match REQUIRED_FIELDS.iter().find(|name| !record.contains(name)) {
        Some(name) => Err(InputError::MissingRequired(name.to_string())),
        None => Ok(()),
    }
}

/// How the encoder treats fields outside (or missing from) the layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderPolicy {
    /// Ignore unknown fields, default missing ones
    #[default]
    Lenient,
    /// Reject unknown fields and require every layout field
    Strict,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEncoder {
    policy: EncoderPolicy,
}

impl FeatureEncoder {
    pub fn new(policy: EncoderPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> EncoderPolicy {
        self.policy
    }

    pub fn encode(&self, record: &InputRecord) -> Result<FeatureVector, InputError> {
        if self.policy == EncoderPolicy::Strict {
            let unknown = record.unknown_fields();
            if !unknown.is_empty() {
                return Err(InputError::UnknownFields(
                    unknown.into_iter().map(str::to_string).collect(),
                ));
            }

            let missing: Vec<String> = FEATURE_SCHEMA
                .iter()
                .filter(|slot| record.get(slot.name).is_none())
                .map(|slot| slot.name.to_string())
                .collect();
            if !missing.is_empty() {
                return Err(InputError::MissingFields(missing));
            }
        }

        Ok(encode(record))
    }
}
