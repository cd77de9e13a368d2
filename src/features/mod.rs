//! Features Module - input record to model vector
//!
//! Keeps the feature layout, the request record type and the encoder
//! apart from the model artifacts, so the layout can be checked against
//! whatever artifacts get loaded.

pub mod encoder;
pub mod layout;
pub mod record;
pub mod vector;

pub use encoder::{check_required, encode, EncoderPolicy, FeatureEncoder};
pub use layout::{LayoutInfo, FEATURE_COUNT, FEATURE_SCHEMA, REQUIRED_FIELDS};
pub use record::{InputError, InputRecord};
pub use vector::FeatureVector;
