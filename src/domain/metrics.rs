//! Performance metrics over a finished simulation.
//!
//! Ratios are kept unrounded internally; [`Metrics::compute`] produces the
//! reported, percent-scaled and rounded figures.

use super::portfolio::EquityPoint;
use super::position::Trade;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Sample standard deviation at or below which Sharpe is undefined.
pub const MIN_RETURN_STDDEV: f64 = 1e-6;

/// Round half-up to 2 decimals, nudged by one epsilon so that values such as
/// 2.345 stored as 2.34499... still round up.
pub fn round2(value: f64) -> f64 {
    ((value + f64::EPSILON) * 100.0 + 0.5).floor() / 100.0
}

/// Final equity over initial capital, minus one. Zero capital yields 0.
pub fn total_return(initial_capital: f64, final_equity: f64) -> f64 {
    if initial_capital != 0.0 {
        final_equity / initial_capital - 1.0
    } else {
        0.0
    }
}

/// Largest peak-to-trough decline as a ratio of the peak. The running peak
/// starts at `initial_capital`.
pub fn max_drawdown(initial_capital: f64, curve: &[EquityPoint]) -> f64 {
    let mut peak = initial_capital;
    let mut max_dd = 0.0_f64;

    for point in curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            let dd = (peak - point.equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

/// One simple return per curve point; the first is measured against
/// `initial_capital`.
pub fn daily_returns(initial_capital: f64, curve: &[EquityPoint]) -> Vec<f64> {
    let mut prev = initial_capital;
    curve
        .iter()
        .map(|point| {
            let r = if prev != 0.0 {
                (point.equity - prev) / prev
            } else {
                0.0
            };
            prev = point.equity;
            r
        })
        .collect()
}

/// Annualized Sharpe ratio from daily returns, zero risk-free rate.
///
/// `None` with fewer than two samples or a sample stdev of at most
/// [`MIN_RETURN_STDDEV`].
pub fn sharpe(returns: &[f64]) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    (stddev > MIN_RETURN_STDDEV).then(|| mean / stddev * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Compound annual growth implied by `total_return` over `days` trading days.
pub fn annualized_return(total_return: f64, days: usize) -> Option<f64> {
    if days == 0 || total_return <= -1.0 {
        return None;
    }
    let years = days as f64 / TRADING_DAYS_PER_YEAR;
    let value = (1.0 + total_return).powf(1.0 / years) - 1.0;
    value.is_finite().then_some(value)
}

/// Winning closed trades over all closed trades, as a ratio.
pub fn win_rate(trades: &[Trade]) -> f64 {
    let closed = trades.iter().filter(|t| !t.is_open()).count();
    if closed == 0 {
        return 0.0;
    }
    let won = trades
        .iter()
        .filter(|t| !t.is_open() && t.is_winner())
        .count();
    won as f64 / closed as f64
}

/// Reported figures. Percentages are scaled by 100 and rounded with [`round2`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: Option<f64>,
    pub final_capital: f64,
    pub win_rate: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: Option<f64>,
    pub total_fees: f64,
    pub total_tax: f64,
    pub trade_count: usize,
}

impl Metrics {
    pub fn compute(initial_capital: f64, trades: &[Trade], equity_curve: &[EquityPoint]) -> Self {
        let final_capital = equity_curve
            .last()
            .map_or(initial_capital, |p| p.equity);
        let ret = total_return(initial_capital, final_capital);
        let returns = daily_returns(initial_capital, equity_curve);

        Metrics {
            total_return: round2(ret * 100.0),
            annualized_return: annualized_return(ret, equity_curve.len()).map(|r| round2(r * 100.0)),
            final_capital,
            win_rate: round2(win_rate(trades) * 100.0),
            max_drawdown: round2(max_drawdown(initial_capital, equity_curve) * 100.0),
            sharpe_ratio: sharpe(&returns).map(round2),
            total_fees: round2(trades.iter().map(|t| t.fees).sum()),
            total_tax: round2(trades.iter().map(|t| t.tax).sum()),
            trade_count: trades.len(),
        }
    }
}
