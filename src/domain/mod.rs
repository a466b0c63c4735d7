//! Core domain types and logic.

pub mod trade;
pub mod journal;
pub mod metrics;
pub mod equity;
pub mod validation;
pub mod persistence;
pub mod config_validation;
pub mod format;
pub mod error;
