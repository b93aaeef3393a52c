//! Strategy parameter validation.
//!
//! Each rule returns the first violation it finds; `StrategyConfig::validate`
//! calls them in order (date range, kind-specific rules, shared rules).

use crate::domain::error::TradebenchError;
use crate::domain::strategy::{
    AMOUNT_TO_TRADE, CASH_AMOUNT, CommonParams, FEE_PER_TRADE, STOP_LOSS,
};

pub fn validate_date_range(common: &CommonParams) -> Result<(), TradebenchError> {
    if common.start_date >= common.end_date {
        return Err(TradebenchError::InvalidDateRange {
            start: common.start_date,
            end: common.end_date,
        });
    }
    Ok(())
}

pub fn validate_roc_intervals(short: i64, long: i64) -> Result<(u32, u32), TradebenchError> {
    let invalid = || TradebenchError::InvalidIntervals { short, long };
    if short <= 0 || short >= long {
        return Err(invalid());
    }
    let short = u32::try_from(short).map_err(|_| invalid())?;
    let long = u32::try_from(long).map_err(|_| invalid())?;
    Ok((short, long))
}

pub fn validate_consecutive_days(days: i64) -> Result<(), TradebenchError> {
    if days <= 0 {
        return Err(TradebenchError::InvalidDays { days });
    }
    Ok(())
}

pub fn validate_thresholds(lower: f64, upper: f64) -> Result<(), TradebenchError> {
    let in_range = |v: f64| (0.0..=100.0).contains(&v);
    if !(in_range(lower) && in_range(upper) && lower < upper) {
        return Err(TradebenchError::InvalidThresholds { lower, upper });
    }
    Ok(())
}

/// Windows must be positive and strictly increasing, short to long.
pub fn validate_windows(windows: &[i64]) -> Result<Vec<usize>, TradebenchError> {
    let mut out = Vec::with_capacity(windows.len());
    for &w in windows {
        if w <= 0 {
            return Err(TradebenchError::InvalidMovingAverageWindows {
                reason: format!("window length must be positive (got {w})"),
            });
        }
        let w = usize::try_from(w).map_err(|_| TradebenchError::InvalidMovingAverageWindows {
            reason: format!("window length {w} is too large"),
        })?;
        if let Some(&prev) = out.last() {
            if w <= prev {
                return Err(TradebenchError::InvalidMovingAverageWindows {
                    reason: format!("windows must be strictly increasing ({prev} then {w})"),
                });
            }
        }
        out.push(w);
    }
    Ok(out)
}

pub fn validate_common(common: &CommonParams) -> Result<(), TradebenchError> {
    validate_percentage(STOP_LOSS, common.stop_loss_pct)?;
    validate_percentage(FEE_PER_TRADE, common.fee_pct)?;
    validate_amount(CASH_AMOUNT, common.cash_amount)?;
    validate_amount(AMOUNT_TO_TRADE, common.amount_to_trade)?;
    Ok(())
}

fn validate_percentage(name: &str, value: f64) -> Result<(), TradebenchError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(TradebenchError::invalid_value(
            name,
            format!("{value} must be between 0 and 100"),
        ));
    }
    Ok(())
}

fn validate_amount(name: &str, value: f64) -> Result<(), TradebenchError> {
    if !value.is_finite() || value < 0.0 {
        return Err(TradebenchError::invalid_value(
            name,
            format!("{value} must be a non-negative amount"),
        ));
    }
    Ok(())
}
