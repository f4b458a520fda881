//! Core domain types and logic.

pub mod trade;
pub mod strategy;
pub mod simulation;
pub mod summary;
pub mod config_validation;
pub mod error;
