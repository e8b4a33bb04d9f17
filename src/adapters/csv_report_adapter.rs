//! CSV report writer.
//!
//! Writes into `output_dir`:
//! - `trades.csv`: one row per trade
//! - `equity.csv`: the daily equity curve
//! - `scan_log.csv`: the preset decision log (scans only)
//! - `summary.txt`: headline metrics, plus the recommendation for scans

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::ScanError;
use crate::domain::optimizer::OptimizerReport;
use crate::ports::report_port::ReportPort;

pub const TRADES_FILE: &str = "trades.csv";
pub const EQUITY_FILE: &str = "equity.csv";
pub const SCAN_LOG_FILE: &str = "scan_log.csv";
pub const SUMMARY_FILE: &str = "summary.txt";

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn report_err(e: impl std::fmt::Display) -> ScanError {
    ScanError::Report {
        reason: e.to_string(),
    }
}

fn opt_f64(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_trades(result: &BacktestResult, path: &Path) -> Result<(), ScanError> {
    let mut wtr = csv::Writer::from_path(path).map_err(report_err)?;
    wtr.write_record([
        "id",
        "side",
        "shares",
        "entry_date",
        "entry_price",
        "exit_date",
        "exit_price",
        "status",
        "pnl_pct",
        "exit_reason",
        "fees",
        "tax",
    ])
    .map_err(report_err)?;

    for trade in &result.trades {
        wtr.write_record([
            trade.id.clone(),
            trade.side.to_string(),
            trade.shares.to_string(),
            trade.entry_date.to_string(),
            trade.entry_price.to_string(),
            trade.exit_date.map(|d| d.to_string()).unwrap_or_default(),
            opt_f64(trade.exit_price),
            trade.status.to_string(),
            opt_f64(trade.pnl_pct),
            trade.exit_reason.map(|r| r.to_string()).unwrap_or_default(),
            format!("{:.2}", trade.fees),
            format!("{:.2}", trade.tax),
        ])
        .map_err(report_err)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_equity(result: &BacktestResult, path: &Path) -> Result<(), ScanError> {
    let mut wtr = csv::Writer::from_path(path).map_err(report_err)?;
    wtr.write_record(["date", "equity"]).map_err(report_err)?;
    for point in &result.equity_curve {
        wtr.write_record([point.date.to_string(), format!("{:.2}", point.equity)])
            .map_err(report_err)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_scan_log(report: &OptimizerReport, path: &Path) -> Result<(), ScanError> {
    let mut wtr = csv::Writer::from_path(path).map_err(report_err)?;
    wtr.write_record([
        "rank",
        "name",
        "logic_type",
        "timeframe",
        "frequency",
        "trade_count",
        "win_rate",
        "total_return",
        "max_drawdown",
        "sharpe",
        "score",
        "status",
        "reason",
        "indicators",
        "role_description",
    ])
    .map_err(report_err)?;

    for (rank, item) in report.log.iter().enumerate() {
        wtr.write_record([
            (rank + 1).to_string(),
            item.name.clone(),
            item.logic_type.clone(),
            item.timeframe.clone(),
            item.frequency.to_string(),
            item.trade_count.to_string(),
            item.win_rate.to_string(),
            item.total_return.to_string(),
            item.max_drawdown.to_string(),
            opt_f64(item.sharpe),
            format!("{:.4}", item.score),
            item.status.to_string(),
            item.reason.to_string(),
            item.indicators.join(" "),
            item.role_description.clone(),
        ])
        .map_err(report_err)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Plain-text summary of a result.
pub fn render_summary(symbol: &str, result: &BacktestResult) -> String {
    let mut out = String::new();
    let sharpe = result
        .sharpe_ratio
        .map_or_else(|| "undefined".to_string(), |s| format!("{s:.2}"));
    let annualized = result
        .annualized_return
        .map_or_else(|| "n/a".to_string(), |a| format!("{a:.2}%"));

    let _ = writeln!(out, "Symbol:           {symbol}");
    let _ = writeln!(out, "Total Return:     {:.2}%", result.total_return);
    let _ = writeln!(out, "Annualized:       {annualized}");
    let _ = writeln!(out, "Final Capital:    {:.2}", result.final_capital);
    let _ = writeln!(out, "Win Rate:         {:.2}%", result.win_rate);
    let _ = writeln!(out, "Max Drawdown:     {:.2}%", result.max_drawdown);
    let _ = writeln!(out, "Sharpe Ratio:     {sharpe}");
    let _ = writeln!(out, "Total Trades:     {}", result.trade_count());
    let _ = writeln!(out, "Total Fees:       {:.2}", result.total_fees);
    let _ = writeln!(out, "Total Tax:        {:.2}", result.total_tax);

    if let Some(report) = &result.optimizer {
        let _ = writeln!(out, "Best Combination: {}", report.best_combination.join(", "));
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", report.recommendation);
    }
    out
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, symbol: &str, result: &BacktestResult, output_dir: &Path) -> Result<(), ScanError> {
        fs::create_dir_all(output_dir)?;

        write_trades(result, &output_dir.join(TRADES_FILE))?;
        write_equity(result, &output_dir.join(EQUITY_FILE))?;
        if let Some(report) = &result.optimizer {
            write_scan_log(report, &output_dir.join(SCAN_LOG_FILE))?;
        }
        fs::write(output_dir.join(SUMMARY_FILE), render_summary(symbol, result))?;

        info!(symbol, dir = %output_dir.display(), "report written");
        Ok(())
    }
}
