//! Per-kind trading rules driven by [`crate::domain::backtest`].

pub mod crossover;
pub mod roc;
pub mod rsi;
