//! Day-by-day trade simulation over an enriched series.
//!
//! Day `i` is scored on the indicator values of day `i - 1` and filled at the
//! close of day `i`. The portfolio is either flat or long one position; on the
//! final bar any open position is closed.

use tracing::debug;

use super::execution::{check_exit, enter_long, exit_position, EntryResult};
use super::indicator::EnrichedPoint;
use super::metrics;
use super::portfolio::{EquityPoint, Portfolio};
use super::position::{ExitReason, Trade};
use super::signal;
use super::strategy::StrategyConfig;

/// Raw simulation output. Ratios are unscaled and unrounded.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub max_drawdown: f64,
    pub sharpe: Option<f64>,
    pub total_return: f64,
    pub final_equity: f64,
}

impl SimulationOutcome {
    fn empty(initial_capital: f64) -> Self {
        SimulationOutcome {
            trades: Vec::new(),
            equity_curve: Vec::new(),
            max_drawdown: 0.0,
            sharpe: None,
            total_return: 0.0,
            final_equity: initial_capital,
        }
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }
}

/// Run the FLAT/LONG state machine over `series`.
///
/// Fewer than two points produce an empty outcome with undefined Sharpe.
pub fn run_simulation(series: &[EnrichedPoint], config: &StrategyConfig) -> SimulationOutcome {
    let capital = config.initial_capital;
    if series.len() < 2 {
        return SimulationOutcome::empty(capital);
    }

    let mut portfolio = Portfolio::new(capital);
    let last = series.len() - 1;

    for i in 1..series.len() {
        let prev = &series[i - 1];
        let today = &series[i];
        let price = today.close;
        let consensus = signal::score(prev, config);

        let exit_reason = match portfolio.position.as_mut() {
            Some(position) => {
                position.raise_trailing_high(price);
                let reason = check_exit(position, price, prev.atr, &consensus, config);
                Some(reason.or((i == last).then_some(ExitReason::ForceClose)))
            }
            None => None,
        };

        match exit_reason {
            Some(Some(reason)) => {
                if let Some(exit) = exit_position(&mut portfolio, price, today.date, reason, config) {
                    debug!(
                        date = %today.date,
                        price,
                        shares = exit.shares,
                        pnl_pct = exit.pnl_pct,
                        reason = %exit.reason,
                        "exit"
                    );
                }
            }
            Some(None) => {}
            None => {
                if i < last && signal::is_warmed_up(i - 1, config) && consensus.is_bull() {
                    match enter_long(&mut portfolio, price, today.date, i, config) {
                        EntryResult::Entered { shares, cost, .. } => {
                            debug!(date = %today.date, price, shares, cost, "entry");
                        }
                        EntryResult::InsufficientCapital => {
                            debug!(date = %today.date, price, cash = portfolio.cash, "entry skipped: insufficient capital");
                        }
                    }
                }
            }
        }

        let equity = portfolio.equity(price);
        portfolio.record_equity(today.date, equity);
    }

    let final_equity = portfolio.final_equity();
    let returns = metrics::daily_returns(capital, &portfolio.equity_curve);

    SimulationOutcome {
        max_drawdown: metrics::max_drawdown(capital, &portfolio.equity_curve),
        sharpe: metrics::sharpe(&returns),
        total_return: metrics::total_return(capital, final_equity),
        final_equity,
        trades: portfolio.trades,
        equity_curve: portfolio.equity_curve,
    }
}
