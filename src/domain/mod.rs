//! Core domain types and logic. No I/O happens here.

pub mod analytics;
pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod execution;
pub mod indicator;
pub mod parameter;
pub mod portfolio;
pub mod price;
pub mod report;
pub mod strategies;
pub mod strategy;
