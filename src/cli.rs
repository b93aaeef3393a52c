//! CLI definition and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report::JsonReport;
use crate::adapters::text_report::TextReport;
use crate::domain::analytics::Period;
use crate::domain::backtest;
use crate::domain::error::TradebenchError;
use crate::domain::report::BacktestReport;
use crate::domain::strategy::{StrategyConfig, StrategyKind, StrategyParams};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tradebench", about = "Single-asset trading strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    fn renderer(self) -> &'static dyn ReportPort {
        match self {
            ReportFormat::Text => &TextReport,
            ReportFormat::Json => &JsonReport,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest described by an INI file
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides `[report] period`
        #[arg(long)]
        period: Option<Period>,
        /// Overrides `[report] format`
        #[arg(long, value_enum)]
        format: Option<ReportFormat>,
        /// Append the full ledger to the report
        #[arg(long)]
        ledger: bool,
    },
    /// Run several backtests in parallel and print them side by side
    Compare {
        #[arg(short, long, required = true)]
        config: Vec<PathBuf>,
        #[arg(long)]
        period: Option<Period>,
        #[arg(long, value_enum)]
        format: Option<ReportFormat>,
    },
    /// List the parameters of a strategy kind with their defaults
    Params {
        #[arg(short, long)]
        kind: StrategyKind,
        /// Print the JSON snapshot instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Validate a run configuration without running it
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line overrides applied on top of the `[report]` section.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOverrides {
    pub period: Option<Period>,
    pub format: Option<ReportFormat>,
    pub ledger: bool,
}

/// Everything one INI file describes.
pub struct RunPlan {
    pub strategy: StrategyConfig,
    pub csv: String,
    pub base_dir: PathBuf,
    pub period: Period,
    pub format: ReportFormat,
    pub ledger: bool,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            period,
            format,
            ledger,
        } => backtest_output(
            &config,
            ReportOverrides {
                period,
                format,
                ledger,
            },
        ),
        Command::Compare {
            config,
            period,
            format,
        } => compare_output(
            &config,
            ReportOverrides {
                period,
                format,
                ledger: false,
            },
        ),
        Command::Params { kind, json } => params_output(kind, json),
        Command::Validate { config } => validate_output(&config),
    };

    match result.and_then(|text| {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        Ok(())
    }) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TradebenchError> {
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// Build a strategy from `[strategy]`: `kind` selects the defaults, every
/// other key overrides one parameter.
pub fn build_strategy(adapter: &dyn ConfigPort) -> Result<StrategyConfig, TradebenchError> {
    let kind_str = adapter
        .get_string("strategy", "kind")
        .ok_or_else(|| TradebenchError::ConfigMissing {
            section: "strategy".into(),
            key: "kind".into(),
        })?;
    let kind: StrategyKind = kind_str.parse().map_err(|e: TradebenchError| {
        TradebenchError::ConfigInvalid {
            section: "strategy".into(),
            key: "kind".into(),
            reason: e.to_string(),
        }
    })?;

    let mut strategy = StrategyConfig::new(kind);
    for key in adapter.keys("strategy") {
        if key == "kind" {
            continue;
        }
        if let Some(value) = adapter.get_string("strategy", &key) {
            strategy.set_parameter_str(&key, &value)?;
        }
    }
    Ok(strategy)
}

pub fn build_plan(
    adapter: &FileConfigAdapter,
    overrides: ReportOverrides,
) -> Result<RunPlan, TradebenchError> {
    let strategy = build_strategy(adapter)?;
    let csv = adapter.require("data", "csv")?;

    let period = match (overrides.period, adapter.get_string("report", "period")) {
        (Some(period), _) => period,
        (None, Some(raw)) => raw.parse().map_err(|e: TradebenchError| {
            TradebenchError::ConfigInvalid {
                section: "report".into(),
                key: "period".into(),
                reason: e.to_string(),
            }
        })?,
        (None, None) => Period::Monthly,
    };
    let format = match (overrides.format, adapter.get_string("report", "format")) {
        (Some(format), _) => format,
        (None, Some(raw)) => {
            ReportFormat::from_str(&raw, true).map_err(|_| TradebenchError::ConfigInvalid {
                section: "report".into(),
                key: "format".into(),
                reason: format!("unknown format '{raw}' (expected text or json)"),
            })?
        }
        (None, None) => ReportFormat::Text,
    };

    Ok(RunPlan {
        strategy,
        csv,
        base_dir: adapter.base_dir().to_path_buf(),
        period,
        format,
        ledger: overrides.ledger || adapter.get_bool("report", "ledger", false),
    })
}

/// Load the price data, run the strategy and build its report.
pub fn execute_plan(plan: &RunPlan) -> Result<BacktestReport, TradebenchError> {
    let series = CsvAdapter::new(plan.base_dir.clone()).fetch_series(&plan.csv)?;
    let ledger = backtest::run(&plan.strategy, &series)?;
    BacktestReport::build(&plan.strategy, &ledger, plan.period, plan.ledger)
}

pub fn backtest_output(path: &Path, overrides: ReportOverrides) -> Result<String, TradebenchError> {
    let adapter = load_config(path)?;
    let plan = build_plan(&adapter, overrides)?;
    eprintln!(
        "Running {} ({}) on {}",
        plan.strategy.alias(),
        plan.strategy.kind(),
        plan.csv
    );
    let report = execute_plan(&plan)?;
    plan.format.renderer().render(&report)
}

pub fn compare_output(
    paths: &[PathBuf],
    overrides: ReportOverrides,
) -> Result<String, TradebenchError> {
    if paths.len() < 2 {
        return Err(TradebenchError::ConfigInvalid {
            section: "compare".into(),
            key: "config".into(),
            reason: "at least two configs are required".into(),
        });
    }

    let plans = paths
        .iter()
        .map(|path| build_plan(&load_config(path)?, overrides))
        .collect::<Result<Vec<_>, _>>()?;

    let reports = plans
        .par_iter()
        .map(execute_plan)
        .collect::<Result<Vec<_>, _>>()?;

    let format = overrides.format.unwrap_or(plans[0].format);
    format.renderer().render_comparison(&reports)
}

pub fn params_output(kind: StrategyKind, json: bool) -> Result<String, TradebenchError> {
    let config = StrategyConfig::new(kind);
    if json {
        let mut text = serde_json::to_string_pretty(&config.to_json())?;
        text.push('\n');
        return Ok(text);
    }

    let mut out = format!("{} - {}\n\n", kind.label(), kind.description());
    out.push_str(&format!(
        "{:<20} {:<12} {:<12} {}\n",
        "Parameter", "Kind", "Default", "Description"
    ));
    for param in config.parameter_table() {
        out.push_str(&format!(
            "{:<20} {:<12} {:<12} {}\n",
            param.name,
            param.kind.to_string(),
            param.default.to_string(),
            param.help
        ));
    }
    Ok(out)
}

pub fn validate_output(path: &Path) -> Result<String, TradebenchError> {
    let adapter = load_config(path)?;
    let plan = build_plan(&adapter, ReportOverrides::default())?;
    let params = plan.strategy.validate()?;
    let common = params.common();

    let rules = match &params {
        StrategyParams::Roc(p) => format!(
            "short {} / long {} days, run of {}",
            p.short_interval, p.long_interval, p.consecutive_day_run
        ),
        StrategyParams::Rsi(p) => format!(
            "window {}, thresholds {} / {}",
            p.window_size, p.lower_threshold, p.upper_threshold
        ),
        StrategyParams::Sma(p) | StrategyParams::Tma(p) | StrategyParams::Dema(p) => {
            let windows: Vec<String> = p.windows.iter().map(ToString::to_string).collect();
            format!("windows {}", windows.join(" / "))
        }
    };
    let indicators: Vec<String> = params.indicators().iter().map(ToString::to_string).collect();

    let mut out = String::from("Config validated successfully\n");
    out.push_str(&format!(
        "  strategy: {} ({})\n",
        plan.strategy.alias(),
        params.kind()
    ));
    out.push_str(&format!("  range:    {} .. {}\n", common.start_date, common.end_date));
    out.push_str(&format!("  rules:    {rules}\n"));
    out.push_str(&format!("  computes: {}\n", indicators.join(", ")));
    out.push_str(&format!("  data:     {}\n", plan.csv));
    out.push_str(&format!("  report:   {} ({:?})\n", plan.period, plan.format));
    Ok(out)
}
