//! Data models

pub mod history;

pub use history::*;
