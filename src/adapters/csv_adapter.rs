//! CSV file price data adapter.
//!
//! Reads `Date,Open,High,Low,Close` exports. The header row is located by
//! name (case-insensitive), so banner lines above it and extra columns such as
//! volume or symbol are ignored. Only the first 10 characters of the date are
//! used, which accepts both `YYYY-MM-DD` and ISO-8601 timestamps.

use crate::domain::error::TradebenchError;
use crate::domain::parameter::DATE_FORMAT;
use crate::domain::price::{PriceRow, PriceSeries};
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

const COLUMNS: [&str; 5] = ["date", "open", "high", "low", "close"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// `symbol` is a file name or path relative to the base path; `.csv` is
    /// appended when it has no extension.
    fn csv_path(&self, symbol: &str) -> PathBuf {
        let path = self.base_path.join(symbol);
        if path.extension().is_none() {
            path.with_extension("csv")
        } else {
            path
        }
    }

    pub fn read_file(path: &Path) -> Result<PriceSeries, TradebenchError> {
        let content = fs::read_to_string(path).map_err(|e| TradebenchError::PriceData {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::parse(&content).map_err(|e| match e {
            TradebenchError::PriceData { reason } => TradebenchError::PriceData {
                reason: format!("{}: {}", path.display(), reason),
            },
            other => other,
        })
    }

    pub fn parse(content: &str) -> Result<PriceSeries, TradebenchError> {
        let header_line = content
            .lines()
            .position(is_header)
            .ok_or_else(|| TradebenchError::PriceData {
                reason: "no Date,Open,High,Low,Close header found".into(),
            })?;
        let body: String = content
            .lines()
            .skip(header_line)
            .collect::<Vec<_>>()
            .join("\n");

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(body.as_bytes());

        let headers = rdr.headers().map_err(|e| TradebenchError::PriceData {
            reason: format!("CSV header error: {}", e),
        })?;
        let mut index = [0usize; 5];
        for (slot, name) in index.iter_mut().zip(COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| TradebenchError::PriceData {
                    reason: format!("missing {} column", name),
                })?;
        }
        let [date_col, open_col, high_col, low_col, close_col] = index;

        let mut rows = Vec::new();
        for (n, result) in rdr.records().enumerate() {
            let line = header_line + n + 2;
            let record = result.map_err(|e| TradebenchError::PriceData {
                reason: format!("CSV parse error: {}", e),
            })?;
            let field = |col: usize, name: &str| {
                record.get(col).ok_or_else(|| TradebenchError::PriceData {
                    reason: format!("line {}: missing {} value", line, name),
                })
            };
            let number = |col: usize, name: &str| -> Result<f64, TradebenchError> {
                let raw = field(col, name)?;
                raw.parse().map_err(|e| TradebenchError::PriceData {
                    reason: format!("line {}: invalid {} value '{}': {}", line, name, raw, e),
                })
            };

            let raw_date = field(date_col, "date")?;
            let date = parse_date(raw_date).ok_or_else(|| TradebenchError::PriceData {
                reason: format!("line {}: invalid date '{}'", line, raw_date),
            })?;

            rows.push(PriceRow {
                date,
                open: number(open_col, "open")?,
                high: number(high_col, "high")?,
                low: number(low_col, "low")?,
                close: number(close_col, "close")?,
            });
        }

        Ok(PriceSeries::new(rows))
    }
}

fn is_header(line: &str) -> bool {
    let cells: Vec<String> = line
        .split(',')
        .map(|c| c.trim().trim_matches('"').to_ascii_lowercase())
        .collect();
    COLUMNS.iter().all(|col| cells.iter().any(|c| c == col))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.get(..10)?;
    NaiveDate::parse_from_str(prefix, DATE_FORMAT).ok()
}

impl PriceDataPort for CsvAdapter {
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, TradebenchError> {
        Self::read_file(&self.csv_path(symbol))
    }
}
