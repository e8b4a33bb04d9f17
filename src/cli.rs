//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::{render_summary, CsvReportAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestResult};
use crate::domain::config_validation::{
    required_date, validate_backtest_config, validate_strategy_config,
};
use crate::domain::error::ScanError;
use crate::domain::indicator::describe_indicators;
use crate::domain::optimizer::presets::PRESET_CATALOG;
use crate::domain::strategy::{BacktestMode, IndicatorFamily, StrategyConfig, TradingMode};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceSource;
use crate::ports::report_port::ReportPort;

const DEFAULT_DATA_DIR: &str = "data";
/// One seed day plus one simulated day.
const MIN_SERIES_LEN: usize = 2;

#[derive(Parser, Debug)]
#[command(name = "presetscan", about = "Indicator consensus backtester and preset scanner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest the configured strategy (or scan, when mode = auto)
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides [backtest] symbol
        #[arg(short, long)]
        symbol: Option<String>,
        /// Directory for trades.csv, equity.csv and summary.txt
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Scan the preset catalog and report the best strategy
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols with price files in the data directory
    Symbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Where the prices come from and which window of them to use.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSettings {
    pub symbol: String,
    pub data_dir: PathBuf,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            output,
        } => run_backtest_command(&config, symbol.as_deref(), output.as_deref(), false),
        Command::Scan {
            config,
            symbol,
            output,
        } => run_backtest_command(&config, symbol.as_deref(), output.as_deref(), true),
        Command::Validate { config } => run_validate(&config),
        Command::Symbols { config } => run_symbols(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: &ScanError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn validate_all(adapter: &dyn ConfigPort) -> Result<(), ScanError> {
    validate_backtest_config(adapter)?;
    validate_strategy_config(adapter)
}

fn run_backtest_command(
    config_path: &Path,
    symbol_override: Option<&str>,
    output: Option<&Path>,
    force_scan: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_all(&adapter) {
        return fail(&e);
    }

    let settings = match build_settings(&adapter, symbol_override) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let mut config = match build_strategy_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    if force_scan {
        config.mode = BacktestMode::AutoConfig;
    }

    let source = CsvAdapter::new(settings.data_dir.clone());
    let reporter = CsvReportAdapter::new();
    match run_pipeline(&source, &reporter, &settings, &config, output) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

/// Read `[backtest]` symbol, data directory and date range.
pub fn build_settings(
    adapter: &dyn ConfigPort,
    symbol_override: Option<&str>,
) -> Result<BacktestSettings, ScanError> {
    let symbol = match symbol_override {
        Some(s) => s.trim().to_string(),
        None => adapter
            .get_string("backtest", "symbol")
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    };
    if symbol.is_empty() {
        return Err(ScanError::missing("backtest", "symbol"));
    }

    let data_dir = adapter
        .get_string("backtest", "data_dir")
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

    Ok(BacktestSettings {
        symbol,
        data_dir: PathBuf::from(data_dir),
        start_date: required_date(adapter, "start_date")?,
        end_date: required_date(adapter, "end_date")?,
    })
}

/// Build a [`StrategyConfig`] from `[backtest]` and `[strategy]`, falling
/// back to [`StrategyConfig::default`] for absent keys.
pub fn build_strategy_config(adapter: &dyn ConfigPort) -> Result<StrategyConfig, ScanError> {
    let defaults = StrategyConfig::default();

    let mut indicators = defaults.indicators;
    for family in IndicatorFamily::ALL {
        let enabled = adapter.get_bool(
            "strategy",
            family.config_key(),
            defaults.indicators.is_enabled(family),
        );
        indicators.set(family, enabled);
    }

    let window = |key: &str, default: usize| {
        let value = adapter.get_double("strategy", key, default as f64);
        if value >= 1.0 { value as usize } else { default }
    };

    let mode = match adapter.get_string("backtest", "mode") {
        Some(raw) => raw
            .parse::<BacktestMode>()
            .map_err(|reason| ScanError::invalid("backtest", "mode", reason))?,
        None => defaults.mode,
    };
    let trading_mode = match adapter.get_string("backtest", "trading_mode") {
        Some(raw) => raw
            .parse::<TradingMode>()
            .map_err(|reason| ScanError::invalid("backtest", "trading_mode", reason))?,
        None => defaults.trading_mode,
    };

    Ok(StrategyConfig {
        indicators,
        sma_short: window("sma_short", defaults.sma_short),
        sma_long: window("sma_long", defaults.sma_long),
        ema_short: window("ema_short", defaults.ema_short),
        ema_long: window("ema_long", defaults.ema_long),
        rsi_period: window("rsi_period", defaults.rsi_period),
        rsi_overbought: adapter.get_double("strategy", "rsi_overbought", defaults.rsi_overbought),
        rsi_oversold: adapter.get_double("strategy", "rsi_oversold", defaults.rsi_oversold),
        vwma_period: window("vwma_period", defaults.vwma_period),
        stop_loss_pct: adapter.get_double("strategy", "stop_loss", defaults.stop_loss_pct),
        take_profit_pct: adapter.get_double("strategy", "take_profit", defaults.take_profit_pct),
        commission_rate: adapter.get_double("backtest", "commission_rate", defaults.commission_rate),
        tax_rate: adapter.get_double("backtest", "tax_rate", defaults.tax_rate),
        initial_capital: adapter.get_double("backtest", "initial_capital", defaults.initial_capital),
        trading_mode,
        mode,
    })
}

/// Fetch, backtest (or scan), print the summary and optionally write the report.
pub fn run_pipeline(
    source: &dyn PriceSource,
    reporter: &dyn ReportPort,
    settings: &BacktestSettings,
    config: &StrategyConfig,
    output: Option<&Path>,
) -> Result<BacktestResult, ScanError> {
    let series = source.fetch_series(&settings.symbol, settings.start_date, settings.end_date)?;
    if series.is_empty() {
        return Err(ScanError::NoData {
            symbol: settings.symbol.clone(),
        });
    }
    if series.len() < MIN_SERIES_LEN {
        return Err(ScanError::InsufficientData {
            symbol: settings.symbol.clone(),
            points: series.len(),
            minimum: MIN_SERIES_LEN,
        });
    }

    let scanning = config.mode == BacktestMode::AutoConfig;
    eprintln!(
        "{} {}: {} days, {} to {}",
        if scanning { "Scanning presets on" } else { "Running backtest on" },
        settings.symbol,
        series.len(),
        settings.start_date,
        settings.end_date,
    );
    if !scanning {
        eprintln!("  Indicators: {}", describe_indicators(config).join(", "));
    }

    let result = run_backtest(&series, config);
    info!(symbol = %settings.symbol, trades = result.trade_count(), "pipeline finished");

    if let Some(report) = &result.optimizer {
        eprintln!("\n=== Preset Ranking ===");
        for (rank, item) in report.log.iter().enumerate() {
            let sharpe = item
                .sharpe
                .map_or_else(|| "-".to_string(), |s| format!("{s:.2}"));
            eprintln!(
                "  {}. {:<20} {:>4} {:>4} trades  sharpe {:>6}  score {:>9.3}  {:<8} {}",
                rank + 1,
                item.name,
                item.frequency,
                item.trade_count,
                sharpe,
                item.score,
                item.status,
                item.reason,
            );
        }
    }

    eprintln!("\n=== Results ===");
    eprint!("{}", render_summary(&settings.symbol, &result));

    if let Some(dir) = output {
        reporter.write(&settings.symbol, &result, dir)?;
        eprintln!("\nReport written to: {}", dir.display());
    }

    Ok(result)
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_all(&adapter) {
        return fail(&e);
    }
    let config = match build_strategy_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    eprintln!("\nMode:         {:?}", config.mode);
    eprintln!("Trading mode: {:?}", config.trading_mode);
    if config.mode == BacktestMode::AutoConfig {
        eprintln!("Presets:");
        for preset in &PRESET_CATALOG {
            eprintln!("  {:<20} {}", preset.name, preset.indicators.join(", "));
        }
    } else {
        eprintln!("Indicators:   {}", describe_indicators(&config).join(", "));
    }
    eprintln!(
        "Risk:         stop {}%, take {}%",
        config.stop_loss_pct, config.take_profit_pct
    );
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_symbols(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let data_dir = adapter
        .get_string("backtest", "data_dir")
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

    let symbols = match CsvAdapter::new(PathBuf::from(&data_dir)).list_symbols() {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    if symbols.is_empty() {
        eprintln!("No price files found in {data_dir}");
    } else {
        for symbol in &symbols {
            println!("{symbol}");
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}
