//! HTTP handlers

pub mod health;
pub mod history;
pub mod model;
pub mod predict;
