//! Configuration validation.
//!
//! Checks every `[backtest]` and `[strategy]` key before a
//! [`StrategyConfig`](crate::domain::strategy::StrategyConfig) is built, so
//! that bad windows or rates fail loudly instead of degrading to undefined
//! indicator values.

use chrono::NaiveDate;

use crate::domain::error::ScanError;
use crate::domain::strategy::{BacktestMode, StrategyConfig, TradingMode};
use crate::ports::config_port::ConfigPort;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), ScanError> {
    let defaults = StrategyConfig::default();

    validate_symbol(config)?;
    validate_dates(config)?;

    let capital = number(config, "backtest", "initial_capital", defaults.initial_capital)?;
    if capital <= 0.0 {
        return Err(ScanError::invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }

    for (key, default) in [
        ("commission_rate", defaults.commission_rate),
        ("tax_rate", defaults.tax_rate),
    ] {
        let rate = number(config, "backtest", key, default)?;
        if !(0.0..1.0).contains(&rate) {
            return Err(ScanError::invalid(
                "backtest",
                key,
                format!("{key} must be at least 0 and below 1"),
            ));
        }
    }

    if let Some(mode) = config.get_string("backtest", "mode") {
        mode.parse::<BacktestMode>()
            .map_err(|reason| ScanError::invalid("backtest", "mode", reason))?;
    }
    if let Some(mode) = config.get_string("backtest", "trading_mode") {
        mode.parse::<TradingMode>()
            .map_err(|reason| ScanError::invalid("backtest", "trading_mode", reason))?;
    }

    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), ScanError> {
    let defaults = StrategyConfig::default();

    for (key, default) in [
        ("sma_short", defaults.sma_short),
        ("sma_long", defaults.sma_long),
        ("ema_short", defaults.ema_short),
        ("ema_long", defaults.ema_long),
        ("rsi_period", defaults.rsi_period),
        ("vwma_period", defaults.vwma_period),
    ] {
        let window = number(config, "strategy", key, default as f64)?;
        if window < 1.0 || window.fract() != 0.0 {
            return Err(ScanError::invalid(
                "strategy",
                key,
                format!("{key} must be a positive whole number"),
            ));
        }
    }

    for (key, default) in [
        ("stop_loss", defaults.stop_loss_pct),
        ("take_profit", defaults.take_profit_pct),
    ] {
        if number(config, "strategy", key, default)? < 0.0 {
            return Err(ScanError::invalid(
                "strategy",
                key,
                format!("{key} must be non-negative"),
            ));
        }
    }

    let overbought = number(config, "strategy", "rsi_overbought", defaults.rsi_overbought)?;
    let oversold = number(config, "strategy", "rsi_oversold", defaults.rsi_oversold)?;
    for (key, value) in [("rsi_overbought", overbought), ("rsi_oversold", oversold)] {
        if !(0.0..=100.0).contains(&value) {
            return Err(ScanError::invalid(
                "strategy",
                key,
                format!("{key} must be between 0 and 100"),
            ));
        }
    }
    if oversold >= overbought {
        return Err(ScanError::invalid(
            "strategy",
            "rsi_oversold",
            "rsi_oversold must be below rsi_overbought",
        ));
    }

    Ok(())
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), ScanError> {
    match config.get_string("backtest", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(ScanError::missing("backtest", "symbol")),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), ScanError> {
    let start_date = required_date(config, "start_date")?;
    let end_date = required_date(config, "end_date")?;

    if start_date >= end_date {
        return Err(ScanError::invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

/// Parse a required `[backtest]` date.
pub fn required_date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, ScanError> {
    let value = config
        .get_string("backtest", key)
        .ok_or_else(|| ScanError::missing("backtest", key))?;
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        ScanError::invalid(
            "backtest",
            key,
            format!("invalid {key} format, expected YYYY-MM-DD"),
        )
    })
}

/// A numeric key, `default` when absent, an error when present but not a number.
fn number(config: &dyn ConfigPort, section: &str, key: &str, default: f64) -> Result<f64, ScanError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ScanError::invalid(section, key, format!("'{raw}' is not a number"))),
    }
}
