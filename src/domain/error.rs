//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for tradebench.
#[derive(Debug, thiserror::Error)]
pub enum TradebenchError {
    #[error("unknown parameter '{name}'")]
    UnknownParameter { name: String },

    #[error("invalid value for parameter '{name}': {reason}")]
    InvalidParameterValue { name: String, reason: String },

    #[error("start date {start} must be before end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid ROC intervals: short ({short}) must be positive and below long ({long})")]
    InvalidIntervals { short: i64, long: i64 },

    #[error("consecutive day run must be positive (got {days})")]
    InvalidDays { days: i64 },

    #[error("invalid RSI thresholds: lower ({lower}) must be below upper ({upper}), both within 0..=100")]
    InvalidThresholds { lower: f64, upper: f64 },

    #[error("invalid moving average windows: {reason}")]
    InvalidMovingAverageWindows { reason: String },

    #[error("requested window {start}..{end} is not covered by price data ({coverage})")]
    DateRangeOutOfBounds {
        start: NaiveDate,
        end: NaiveDate,
        coverage: String,
    },

    #[error("ledger is empty")]
    EmptyLedger,

    #[error("price data error: {reason}")]
    PriceData { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradebenchError {
    pub(crate) fn invalid_value(name: &str, reason: impl Into<String>) -> Self {
        TradebenchError::InvalidParameterValue {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// True for the failures `StrategyConfig::validate` can raise.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TradebenchError::UnknownParameter { .. }
                | TradebenchError::InvalidParameterValue { .. }
                | TradebenchError::InvalidDateRange { .. }
                | TradebenchError::InvalidIntervals { .. }
                | TradebenchError::InvalidDays { .. }
                | TradebenchError::InvalidThresholds { .. }
                | TradebenchError::InvalidMovingAverageWindows { .. }
        )
    }

    /// Process exit status for this failure family.
    pub fn exit_status(&self) -> u8 {
        match self {
            e if e.is_validation() => 4,
            TradebenchError::Io(_) => 1,
            TradebenchError::ConfigParse { .. }
            | TradebenchError::ConfigMissing { .. }
            | TradebenchError::ConfigInvalid { .. }
            | TradebenchError::Json(_) => 2,
            TradebenchError::PriceData { .. } => 3,
            // out-of-range dates and empty ledgers
            _ => 5,
        }
    }
}

impl From<&TradebenchError> for std::process::ExitCode {
    fn from(err: &TradebenchError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn display_date_range() {
        let err = TradebenchError::InvalidDateRange {
            start: date(2018, 1, 1),
            end: date(2017, 1, 1),
        };
        assert_eq!(
            err.to_string(),
            "start date 2018-01-01 must be before end date 2017-01-01"
        );
    }

    #[test]
    fn display_out_of_bounds() {
        let err = TradebenchError::DateRangeOutOfBounds {
            start: date(2017, 1, 1),
            end: date(2017, 6, 1),
            coverage: "2017-02-01..2017-12-31".into(),
        };
        assert!(err.to_string().contains("2017-02-01..2017-12-31"));
    }

    #[test]
    fn validation_classification() {
        assert!(TradebenchError::InvalidDays { days: 0 }.is_validation());
        assert!(
            TradebenchError::UnknownParameter {
                name: "x".into()
            }
            .is_validation()
        );
        assert!(!TradebenchError::EmptyLedger.is_validation());
        assert!(
            !TradebenchError::PriceData {
                reason: "bad".into()
            }
            .is_validation()
        );
    }

    #[test]
    fn exit_status_by_family() {
        assert_eq!(TradebenchError::InvalidDays { days: 0 }.exit_status(), 4);
        assert_eq!(
            TradebenchError::PriceData {
                reason: "bad".into()
            }
            .exit_status(),
            3
        );
        assert_eq!(
            TradebenchError::ConfigMissing {
                section: "data".into(),
                key: "csv".into()
            }
            .exit_status(),
            2
        );
        assert_eq!(TradebenchError::EmptyLedger.exit_status(), 5);
    }
}
