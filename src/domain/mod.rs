//! Core domain types and logic.

pub mod price;
pub mod strategy;
pub mod indicator;
pub mod signal;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod simulation;
pub mod metrics;
pub mod backtest;
pub mod optimizer;
pub mod config_validation;
pub mod error;
