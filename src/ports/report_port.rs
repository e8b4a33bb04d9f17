//! Report output port.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::ScanError;

/// Persists a finished backtest (and its scan log, when present).
pub trait ReportPort {
    fn write(&self, symbol: &str, result: &BacktestResult, output_dir: &Path) -> Result<(), ScanError>;
}
