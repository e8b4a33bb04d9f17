//! Single-configuration backtest pipeline and its reported result.
//!
//! `run_backtest` dispatches on [`BacktestMode`]: `Single` runs
//! indicators -> simulation -> metrics once, `AutoConfig` hands the series to
//! the preset optimizer.

use tracing::info;

use super::indicator::compute_indicators;
use super::metrics::Metrics;
use super::optimizer::{OptimizerReport, StrategyOptimizer};
use super::portfolio::EquityPoint;
use super::position::Trade;
use super::price::PricePoint;
use super::simulation::{run_simulation, SimulationOutcome};
use super::strategy::{BacktestMode, StrategyConfig};

/// Reported outcome of a backtest. Percent fields are scaled by 100 and
/// rounded to 2 decimals; `sharpe_ratio` is `None` when undefined.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub total_return: f64,
    pub annualized_return: Option<f64>,
    pub final_capital: f64,
    pub win_rate: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: Option<f64>,
    pub equity_curve: Vec<EquityPoint>,
    pub total_fees: f64,
    pub total_tax: f64,
    pub optimizer: Option<OptimizerReport>,
}

impl BacktestResult {
    /// Result for an empty input series.
    pub fn empty(initial_capital: f64) -> Self {
        BacktestResult {
            trades: Vec::new(),
            total_return: 0.0,
            annualized_return: None,
            final_capital: initial_capital,
            win_rate: 0.0,
            max_drawdown: 0.0,
            sharpe_ratio: None,
            equity_curve: Vec::new(),
            total_fees: 0.0,
            total_tax: 0.0,
            optimizer: None,
        }
    }

    pub(crate) fn from_outcome(outcome: SimulationOutcome, initial_capital: f64) -> Self {
        let metrics = Metrics::compute(initial_capital, &outcome.trades, &outcome.equity_curve);
        BacktestResult {
            total_return: metrics.total_return,
            annualized_return: metrics.annualized_return,
            final_capital: metrics.final_capital,
            win_rate: metrics.win_rate,
            max_drawdown: metrics.max_drawdown,
            sharpe_ratio: metrics.sharpe_ratio,
            total_fees: metrics.total_fees,
            total_tax: metrics.total_tax,
            trades: outcome.trades,
            equity_curve: outcome.equity_curve,
            optimizer: None,
        }
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }
}

/// Backtest `series` under `config`.
pub fn run_backtest(series: &[PricePoint], config: &StrategyConfig) -> BacktestResult {
    if series.is_empty() {
        return BacktestResult::empty(config.initial_capital);
    }

    if config.mode == BacktestMode::AutoConfig {
        return StrategyOptimizer::default().run(series, config);
    }

    let enriched = compute_indicators(series, config);
    let outcome = run_simulation(&enriched, config);
    let result = BacktestResult::from_outcome(outcome, config.initial_capital);

    info!(
        points = series.len(),
        trades = result.trade_count(),
        total_return = result.total_return,
        max_drawdown = result.max_drawdown,
        "backtest complete"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_series;
    use crate::domain::position::{ExitReason, TradeStatus};

    #[test]
    fn empty_series_is_zeroed() {
        let config = StrategyConfig::default();
        let result = run_backtest(&[], &config);
        assert_eq!(result, BacktestResult::empty(config.initial_capital));
        assert_eq!(result.sharpe_ratio, None);
    }

    #[test]
    fn single_point_is_zeroed() {
        let config = StrategyConfig::default();
        let result = run_backtest(&make_series(&[100.0]), &config);
        assert!(result.trades.is_empty());
        assert_eq!(result.total_return, 0.0);
        assert_eq!(result.final_capital, config.initial_capital);
        assert_eq!(result.sharpe_ratio, None);
    }

    #[test]
    fn single_mode_reports_rounded_metrics() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let result = run_backtest(&make_series(&prices), &StrategyConfig::default());

        assert_eq!(result.trade_count(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.status, TradeStatus::Closed);
        assert_eq!(trade.exit_reason, Some(ExitReason::ForceClose));
        assert_eq!(result.win_rate, 100.0);
        assert!(result.total_return > 0.0);
        assert!(result.total_fees > 0.0);
        assert!(result.total_tax > 0.0);
        assert!(result.optimizer.is_none());
        assert_eq!(result.equity_curve.len(), 39);
    }

    #[test]
    fn auto_mode_attaches_optimizer_report() {
        let prices: Vec<f64> = (0..50).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let config = StrategyConfig {
            mode: BacktestMode::AutoConfig,
            ..StrategyConfig::default()
        };
        let result = run_backtest(&make_series(&prices), &config);
        let report = result.optimizer.expect("optimizer report");
        assert_eq!(report.log.len(), 5);
    }
}
