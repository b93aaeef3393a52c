//! Strategy kinds, their parameter sets, and typed per-kind parameters.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::config_validation;
use super::error::TradebenchError;
use super::indicator::IndicatorType;
use super::parameter::{ParamKind, ParamValue, Parameter, ParameterSet};

pub const NAME: &str = "name";
pub const START_DATE: &str = "start_date";
pub const END_DATE: &str = "end_date";
pub const STOP_LOSS: &str = "stop_loss";
pub const CASH_AMOUNT: &str = "cash_amount";
pub const FEE_PER_TRADE: &str = "fee_per_trade";
pub const AMOUNT_TO_TRADE: &str = "amount_to_trade";

pub const SHORT_INTERVAL: &str = "short_interval";
pub const LONG_INTERVAL: &str = "long_interval";
pub const CONSECUTIVE_DAY_RUN: &str = "consecutive_day_run";

pub const UPPER_THRESHOLD: &str = "upper_threshold";
pub const LOWER_THRESHOLD: &str = "lower_threshold";
pub const WINDOW_SIZE: &str = "window_size";

pub const SHORT_WINDOW: &str = "short_window";
pub const MEDIUM_WINDOW: &str = "medium_window";
pub const LONG_WINDOW: &str = "long_window";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Roc,
    Rsi,
    Sma,
    Tma,
    Dema,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::Roc,
        StrategyKind::Rsi,
        StrategyKind::Sma,
        StrategyKind::Tma,
        StrategyKind::Dema,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StrategyKind::Roc => "ROC",
            StrategyKind::Rsi => "RSI",
            StrategyKind::Sma => "SMA",
            StrategyKind::Tma => "TMA",
            StrategyKind::Dema => "DEMA",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StrategyKind::Roc => {
                "Rate of Change. Buys when the short-interval rate of change stays below the \
                 long-interval rate of change for N consecutive days, sells when it stays above."
            }
            StrategyKind::Rsi => {
                "Relative Strength Index mean reversion. Sells when the RSI crosses above the \
                 upper threshold (overbought) and buys when it crosses below the lower \
                 threshold (oversold)."
            }
            StrategyKind::Sma => {
                "Simple Moving Average crossover. Buys when the short average rises above the \
                 long average while flat, sells everything when it falls below."
            }
            StrategyKind::Tma => {
                "Triple Moving Average. Buys when short >= medium >= long while flat, sells \
                 everything when the averages invert or the medium dips below the long average."
            }
            StrategyKind::Dema => {
                "Double Exponential Moving Average crossover. Like SMA, but both averages are \
                 updated exponentially with factor 2/(days+1)."
            }
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StrategyKind {
    type Err = TradebenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "roc" => Ok(StrategyKind::Roc),
            "rsi" => Ok(StrategyKind::Rsi),
            "sma" => Ok(StrategyKind::Sma),
            "tma" => Ok(StrategyKind::Tma),
            "dema" => Ok(StrategyKind::Dema),
            other => Err(TradebenchError::invalid_value(
                "kind",
                format!("unknown strategy kind '{other}' (expected roc, rsi, sma, tma or dema)"),
            )),
        }
    }
}

/// Parameters every strategy kind carries.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonParams {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub stop_loss_pct: f64,
    pub cash_amount: f64,
    pub fee_pct: f64,
    pub amount_to_trade: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RocParams {
    pub common: CommonParams,
    pub short_interval: u32,
    pub long_interval: u32,
    pub consecutive_day_run: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RsiParams {
    pub common: CommonParams,
    pub upper_threshold: f64,
    pub lower_threshold: f64,
    pub window_size: usize,
}

/// Moving-average windows in days, ordered short to long.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossoverParams {
    pub common: CommonParams,
    pub windows: Vec<usize>,
}

/// Validated, typed parameters for one run.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyParams {
    Roc(RocParams),
    Rsi(RsiParams),
    Sma(CrossoverParams),
    Tma(CrossoverParams),
    Dema(CrossoverParams),
}

impl StrategyParams {
    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyParams::Roc(_) => StrategyKind::Roc,
            StrategyParams::Rsi(_) => StrategyKind::Rsi,
            StrategyParams::Sma(_) => StrategyKind::Sma,
            StrategyParams::Tma(_) => StrategyKind::Tma,
            StrategyParams::Dema(_) => StrategyKind::Dema,
        }
    }

    pub fn common(&self) -> &CommonParams {
        match self {
            StrategyParams::Roc(p) => &p.common,
            StrategyParams::Rsi(p) => &p.common,
            StrategyParams::Sma(p) | StrategyParams::Tma(p) | StrategyParams::Dema(p) => &p.common,
        }
    }

    /// Indicators the run computes, in the order the strategy reads them.
    pub fn indicators(&self) -> Vec<IndicatorType> {
        match self {
            StrategyParams::Roc(p) => vec![
                IndicatorType::Roc(p.short_interval),
                IndicatorType::Roc(p.long_interval),
            ],
            StrategyParams::Rsi(p) => vec![IndicatorType::Rsi(p.window_size)],
            StrategyParams::Sma(p) | StrategyParams::Tma(p) => {
                p.windows.iter().map(|&w| IndicatorType::Sma(w)).collect()
            }
            StrategyParams::Dema(p) => p.windows.iter().map(|&w| IndicatorType::Ema(w)).collect(),
        }
    }
}

/// Named parameter set for one strategy kind.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    kind: StrategyKind,
    params: ParameterSet,
}

impl StrategyConfig {
    /// Build a config holding the built-in defaults for `kind`.
    pub fn new(kind: StrategyKind) -> Self {
        let mut params = ParameterSet::new();
        declare_common(&mut params, kind);
        match kind {
            StrategyKind::Roc => {
                params
                    .declare(
                        SHORT_INTERVAL,
                        ParamValue::Integer(5),
                        ParamKind::Integer,
                        "Days of lookback for the short rate of change",
                    )
                    .declare(
                        LONG_INTERVAL,
                        ParamValue::Integer(20),
                        ParamKind::Integer,
                        "Days of lookback for the long rate of change",
                    )
                    .declare(
                        CONSECUTIVE_DAY_RUN,
                        ParamValue::Integer(2),
                        ParamKind::Integer,
                        "Consecutive days one ROC must stay on one side of the other before trading",
                    );
            }
            StrategyKind::Rsi => {
                params
                    .declare(
                        UPPER_THRESHOLD,
                        ParamValue::Decimal(70.0),
                        ParamKind::Decimal,
                        "Sell when the RSI rises above this value",
                    )
                    .declare(
                        LOWER_THRESHOLD,
                        ParamValue::Decimal(30.0),
                        ParamKind::Decimal,
                        "Buy when the RSI falls below this value",
                    )
                    .declare(
                        WINDOW_SIZE,
                        ParamValue::Integer(14),
                        ParamKind::Integer,
                        "Days averaged for the RSI gains and losses",
                    );
            }
            StrategyKind::Sma | StrategyKind::Dema => {
                params
                    .declare(
                        SHORT_WINDOW,
                        ParamValue::Integer(20),
                        ParamKind::Integer,
                        "Length of the short moving average in days",
                    )
                    .declare(
                        LONG_WINDOW,
                        ParamValue::Integer(40),
                        ParamKind::Integer,
                        "Length of the long moving average in days",
                    );
            }
            StrategyKind::Tma => {
                params
                    .declare(
                        SHORT_WINDOW,
                        ParamValue::Integer(10),
                        ParamKind::Integer,
                        "Length of the short moving average in days",
                    )
                    .declare(
                        MEDIUM_WINDOW,
                        ParamValue::Integer(20),
                        ParamKind::Integer,
                        "Length of the medium moving average in days",
                    )
                    .declare(
                        LONG_WINDOW,
                        ParamValue::Integer(40),
                        ParamKind::Integer,
                        "Length of the long moving average in days",
                    );
            }
        }
        StrategyConfig { kind, params }
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn alias(&self) -> &str {
        self.params.text(NAME).unwrap_or(self.kind.label())
    }

    /// Rename the config; the new name also becomes the default `reset_to_default` restores.
    pub fn set_alias(&mut self, alias: &str) -> Result<(), TradebenchError> {
        self.params.set(NAME, ParamValue::Text(alias.to_string()))?;
        self.params.recapture_default(NAME)
    }

    pub fn set_parameter(&mut self, name: &str, value: ParamValue) -> Result<(), TradebenchError> {
        self.params.set(name, value)
    }

    /// Set a parameter from its textual form, parsed by the declared kind.
    pub fn set_parameter_str(&mut self, name: &str, raw: &str) -> Result<(), TradebenchError> {
        self.params.set_str(name, raw)
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.params.get(name)
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    /// Parameters in declaration order, with value, kind, default and help.
    pub fn parameter_table(&self) -> Vec<&Parameter> {
        self.params.iter().collect()
    }

    pub fn reset_to_default(&mut self) {
        self.params.reset_to_default();
    }

    /// Check every invariant and produce the typed parameters for a run.
    pub fn validate(&self) -> Result<StrategyParams, TradebenchError> {
        let common = self.common_params()?;
        config_validation::validate_date_range(&common)?;
        let p = &self.params;
        let params = match self.kind {
            StrategyKind::Roc => {
                let short = p.integer(SHORT_INTERVAL)?;
                let long = p.integer(LONG_INTERVAL)?;
                let run = p.integer(CONSECUTIVE_DAY_RUN)?;
                let (short_interval, long_interval) =
                    config_validation::validate_roc_intervals(short, long)?;
                config_validation::validate_consecutive_days(run)?;
                StrategyParams::Roc(RocParams {
                    common,
                    short_interval,
                    long_interval,
                    consecutive_day_run: run,
                })
            }
            StrategyKind::Rsi => {
                let upper = p.decimal(UPPER_THRESHOLD)?;
                let lower = p.decimal(LOWER_THRESHOLD)?;
                config_validation::validate_thresholds(lower, upper)?;
                let window = config_validation::validate_windows(&[p.integer(WINDOW_SIZE)?])?;
                StrategyParams::Rsi(RsiParams {
                    common,
                    upper_threshold: upper,
                    lower_threshold: lower,
                    window_size: window[0],
                })
            }
            StrategyKind::Sma | StrategyKind::Dema => {
                let windows = config_validation::validate_windows(&[
                    p.integer(SHORT_WINDOW)?,
                    p.integer(LONG_WINDOW)?,
                ])?;
                let params = CrossoverParams { common, windows };
                if self.kind == StrategyKind::Sma {
                    StrategyParams::Sma(params)
                } else {
                    StrategyParams::Dema(params)
                }
            }
            StrategyKind::Tma => {
                let windows = config_validation::validate_windows(&[
                    p.integer(SHORT_WINDOW)?,
                    p.integer(MEDIUM_WINDOW)?,
                    p.integer(LONG_WINDOW)?,
                ])?;
                StrategyParams::Tma(CrossoverParams { common, windows })
            }
        };
        config_validation::validate_common(params.common())?;
        Ok(params)
    }

    fn common_params(&self) -> Result<CommonParams, TradebenchError> {
        let p = &self.params;
        Ok(CommonParams {
            start_date: p.date(START_DATE)?,
            end_date: p.date(END_DATE)?,
            stop_loss_pct: p.decimal(STOP_LOSS)?,
            cash_amount: p.decimal(CASH_AMOUNT)?,
            fee_pct: p.decimal(FEE_PER_TRADE)?,
            amount_to_trade: p.decimal(AMOUNT_TO_TRADE)?,
        })
    }

    /// JSON snapshot: `{"kind": "sma", "parameters": {"name": "SMA", ...}}`.
    pub fn to_json(&self) -> serde_json::Value {
        let parameters: serde_json::Map<String, serde_json::Value> = self
            .params
            .iter()
            .map(|p| {
                let value = serde_json::to_value(&p.value).unwrap_or(serde_json::Value::Null);
                (p.name.clone(), value)
            })
            .collect();
        serde_json::json!({
            "kind": self.kind,
            "parameters": parameters,
        })
    }

    /// Rebuild a config from a [`StrategyConfig::to_json`] snapshot.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, TradebenchError> {
        let kind = value
            .get("kind")
            .and_then(|k| k.as_str())
            .ok_or_else(|| TradebenchError::invalid_value("kind", "missing strategy kind"))?
            .parse::<StrategyKind>()?;
        let mut config = StrategyConfig::new(kind);
        if let Some(parameters) = value.get("parameters").and_then(|p| p.as_object()) {
            for (name, raw) in parameters {
                let param_kind = config.params.kind_of(name)?;
                let parsed = ParamValue::from_json(name, param_kind, raw)?;
                config.params.set(name, parsed)?;
            }
        }
        Ok(config)
    }
}

fn declare_common(params: &mut ParameterSet, kind: StrategyKind) {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
    params
        .declare(
            NAME,
            ParamValue::Text(kind.label().to_string()),
            ParamKind::String,
            "Name of this strategy configuration",
        )
        .declare(
            START_DATE,
            ParamValue::Date(date(2017, 1, 1)),
            ParamKind::Date,
            "First day the strategy trades",
        )
        .declare(
            END_DATE,
            ParamValue::Date(date(2018, 1, 1)),
            ParamKind::Date,
            "Last day the strategy trades",
        )
        .declare(
            STOP_LOSS,
            ParamValue::Decimal(50.0),
            ParamKind::Percentage,
            "(% of last buy price) Sell everything and stop trading if the price drops this far below the last buy",
        )
        .declare(
            CASH_AMOUNT,
            ParamValue::Decimal(10_000.0),
            ParamKind::Money,
            "(USD) Cash the strategy starts with",
        )
        .declare(
            FEE_PER_TRADE,
            ParamValue::Decimal(0.02),
            ParamKind::Percentage,
            "Exchange fee, in % of each trade's value",
        )
        .declare(
            AMOUNT_TO_TRADE,
            ParamValue::Decimal(100.0),
            ParamKind::Money,
            "(USD) Value bought or sold per trade",
        );
}
