//! Typed strategy parameters with defaults and help text.
//!
//! A [`ParameterSet`] is a closed key/value store: keys are declared once when
//! a strategy config is built and every later access goes through a named,
//! typed getter or [`ParameterSet::set`], which rejects unknown names.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;

use super::error::TradebenchError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Date,
    Integer,
    Decimal,
    Money,
    Percentage,
    String,
}

impl ParamKind {
    fn holds_decimal(self) -> bool {
        matches!(
            self,
            ParamKind::Decimal | ParamKind::Money | ParamKind::Percentage
        )
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Date => "date",
            ParamKind::Integer => "integer",
            ParamKind::Decimal => "decimal",
            ParamKind::Money => "money",
            ParamKind::Percentage => "percentage",
            ParamKind::String => "string",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Date(NaiveDate),
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl ParamValue {
    /// Parse a raw string according to `kind`.
    pub fn parse(name: &str, kind: ParamKind, raw: &str) -> Result<Self, TradebenchError> {
        let raw = raw.trim();
        match kind {
            ParamKind::Date => NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map(ParamValue::Date)
                .map_err(|_| {
                    TradebenchError::invalid_value(name, format!("'{raw}' is not a YYYY-MM-DD date"))
                }),
            ParamKind::Integer => raw.parse::<i64>().map(ParamValue::Integer).map_err(|_| {
                TradebenchError::invalid_value(name, format!("'{raw}' is not an integer"))
            }),
            ParamKind::Decimal | ParamKind::Money | ParamKind::Percentage => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(ParamValue::Decimal)
                .ok_or_else(|| {
                    TradebenchError::invalid_value(name, format!("'{raw}' is not a number"))
                }),
            ParamKind::String => Ok(ParamValue::Text(raw.to_string())),
        }
    }

    /// Read a JSON scalar according to `kind`.
    pub fn from_json(
        name: &str,
        kind: ParamKind,
        value: &serde_json::Value,
    ) -> Result<Self, TradebenchError> {
        use serde_json::Value;
        match (kind, value) {
            (ParamKind::Date | ParamKind::String, Value::String(s)) => {
                ParamValue::parse(name, kind, s)
            }
            (ParamKind::Integer, Value::Number(n)) => n
                .as_i64()
                .map(ParamValue::Integer)
                .ok_or_else(|| TradebenchError::invalid_value(name, "expected an integer")),
            (k, Value::Number(n)) if k.holds_decimal() => n
                .as_f64()
                .map(ParamValue::Decimal)
                .ok_or_else(|| TradebenchError::invalid_value(name, "expected a number")),
            (k, other) => Err(TradebenchError::invalid_value(
                name,
                format!("expected a {k} value, got {other}"),
            )),
        }
    }

    /// Coerce into the representation `kind` stores, widening integers to decimals.
    fn coerce(self, name: &str, kind: ParamKind) -> Result<Self, TradebenchError> {
        match (kind, self) {
            (ParamKind::Date, v @ ParamValue::Date(_)) => Ok(v),
            (ParamKind::Integer, v @ ParamValue::Integer(_)) => Ok(v),
            (ParamKind::String, v @ ParamValue::Text(_)) => Ok(v),
            (k, ParamValue::Integer(i)) if k.holds_decimal() => Ok(ParamValue::Decimal(i as f64)),
            (k, ParamValue::Decimal(d)) if k.holds_decimal() => {
                if d.is_finite() {
                    Ok(ParamValue::Decimal(d))
                } else {
                    Err(TradebenchError::invalid_value(name, "value must be finite"))
                }
            }
            (k, v) => Err(TradebenchError::invalid_value(
                name,
                format!("expected a {k} value, got {v}"),
            )),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            ParamValue::Integer(i) => write!(f, "{i}"),
            ParamValue::Decimal(d) => write!(f, "{d}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

/// Dates serialize as `YYYY-MM-DD` strings, everything else as a JSON scalar.
impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Date(d) => serializer.collect_str(&d.format(DATE_FORMAT)),
            ParamValue::Integer(i) => serializer.serialize_i64(*i),
            ParamValue::Decimal(d) => serializer.serialize_f64(*d),
            ParamValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub value: ParamValue,
    pub default: ParamValue,
    pub kind: ParamKind,
    pub help: String,
}

/// Ordered parameter store; declaration order is preserved for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    params: Vec<Parameter>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a parameter; its initial value becomes the captured default.
    pub(crate) fn declare(
        &mut self,
        name: &str,
        value: ParamValue,
        kind: ParamKind,
        help: &str,
    ) -> &mut Self {
        debug_assert!(self.get(name).is_none(), "parameter {name} declared twice");
        self.params.push(Parameter {
            name: name.to_string(),
            default: value.clone(),
            value,
            kind,
            help: help.to_string(),
        });
        self
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Parameter, TradebenchError> {
        self.params
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| TradebenchError::UnknownParameter {
                name: name.to_string(),
            })
    }

    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), TradebenchError> {
        let param = self.get_mut(name)?;
        param.value = value.coerce(name, param.kind)?;
        Ok(())
    }

    pub fn set_str(&mut self, name: &str, raw: &str) -> Result<(), TradebenchError> {
        let kind = self.kind_of(name)?;
        self.set(name, ParamValue::parse(name, kind, raw)?)
    }

    pub fn kind_of(&self, name: &str) -> Result<ParamKind, TradebenchError> {
        self.get(name)
            .map(|p| p.kind)
            .ok_or_else(|| TradebenchError::UnknownParameter {
                name: name.to_string(),
            })
    }

    /// Make the current value of `name` its new default.
    pub(crate) fn recapture_default(&mut self, name: &str) -> Result<(), TradebenchError> {
        let param = self.get_mut(name)?;
        param.default = param.value.clone();
        Ok(())
    }

    pub fn reset_to_default(&mut self) {
        for p in &mut self.params {
            p.value = p.default.clone();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    fn value(&self, name: &str) -> Result<&ParamValue, TradebenchError> {
        self.get(name)
            .map(|p| &p.value)
            .ok_or_else(|| TradebenchError::UnknownParameter {
                name: name.to_string(),
            })
    }

    pub fn date(&self, name: &str) -> Result<NaiveDate, TradebenchError> {
        match self.value(name)? {
            ParamValue::Date(d) => Ok(*d),
            other => Err(TradebenchError::invalid_value(
                name,
                format!("expected a date, got {other}"),
            )),
        }
    }

    pub fn integer(&self, name: &str) -> Result<i64, TradebenchError> {
        match self.value(name)? {
            ParamValue::Integer(i) => Ok(*i),
            other => Err(TradebenchError::invalid_value(
                name,
                format!("expected an integer, got {other}"),
            )),
        }
    }

    pub fn decimal(&self, name: &str) -> Result<f64, TradebenchError> {
        match self.value(name)? {
            ParamValue::Decimal(d) => Ok(*d),
            ParamValue::Integer(i) => Ok(*i as f64),
            other => Err(TradebenchError::invalid_value(
                name,
                format!("expected a number, got {other}"),
            )),
        }
    }

    pub fn text(&self, name: &str) -> Result<&str, TradebenchError> {
        match self.value(name)? {
            ParamValue::Text(s) => Ok(s),
            other => Err(TradebenchError::invalid_value(
                name,
                format!("expected text, got {other}"),
            )),
        }
    }
}
