//! HTTP handlers

pub mod health;
pub mod model;
pub mod predict;
pub mod telemetry;
