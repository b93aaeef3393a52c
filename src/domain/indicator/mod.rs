//! Indicators the strategies trade on.
//!
//! - `roc`: rate of change over an exact calendar-day lookback
//! - `rsi`: relative strength index over a rolling window of intraday (close - open) changes
//! - `moving_average`: rolling simple mean and exponential mean over a daily series

pub mod moving_average;
pub mod roc;
pub mod rsi;

use std::fmt;

/// Identity of an indicator and its parameters, as shown in logs and `validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Roc(u32),
    Rsi(usize),
    Sma(usize),
    Ema(usize),
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Roc(days) => write!(f, "ROC({days})"),
            IndicatorType::Rsi(window) => write!(f, "RSI({window})"),
            IndicatorType::Sma(window) => write!(f, "SMA({window})"),
            IndicatorType::Ema(window) => write!(f, "EMA({window})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Roc(5).to_string(), "ROC(5)");
        assert_eq!(IndicatorType::Rsi(14).to_string(), "RSI(14)");
        assert_eq!(IndicatorType::Sma(20).to_string(), "SMA(20)");
        assert_eq!(IndicatorType::Ema(40).to_string(), "EMA(40)");
    }
}
