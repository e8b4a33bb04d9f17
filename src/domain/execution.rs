//! Trade execution and fill simulation.
//!
//! Implements long entry sizing with commission, exit proceeds net of
//! commission and tax, and the ordered exit rule checks.

use chrono::NaiveDate;

use super::metrics::round2;
use super::portfolio::Portfolio;
use super::position::{ExitReason, Position, Side, Trade, TradeStatus};
use super::signal::Consensus;
use super::strategy::{IndicatorFamily, StrategyConfig};

/// Share of available cash committed on entry.
pub const CAPITAL_FRACTION: f64 = 0.95;

/// Trailing stop distance below the high-water mark, in ATRs.
pub const ATR_STOP_MULTIPLE: f64 = 2.5;

/// Price per share including the entry commission.
pub fn entry_price_with_fee(price: f64, commission_rate: f64) -> f64 {
    price * (1.0 + commission_rate)
}

/// Net proceeds of selling `shares` at `price` after commission and tax.
pub fn exit_proceeds(shares: u64, price: f64, config: &StrategyConfig) -> f64 {
    shares as f64 * price * (1.0 - config.commission_rate - config.tax_rate)
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered { shares: u64, cost: f64, commission: f64 },
    InsufficientCapital,
}

/// Open a long position.
///
/// 1. Price each share with commission
/// 2. shares = floor(cash * 0.95 / priced share)
/// 3. If shares == 0, return InsufficientCapital
/// 4. Deduct cost from cash, push an OPEN trade, reset the trailing high
pub fn enter_long(
    portfolio: &mut Portfolio,
    price: f64,
    date: NaiveDate,
    day_index: usize,
    config: &StrategyConfig,
) -> EntryResult {
    let priced = entry_price_with_fee(price, config.commission_rate);
    if priced <= 0.0 || portfolio.cash <= 0.0 {
        return EntryResult::InsufficientCapital;
    }

    let shares = ((portfolio.cash * CAPITAL_FRACTION) / priced).floor() as u64;
    if shares == 0 {
        return EntryResult::InsufficientCapital;
    }

    let cost = shares as f64 * priced;
    let commission = cost - shares as f64 * price;
    portfolio.cash -= cost;

    portfolio.trades.push(Trade {
        id: format!("T-{day_index}"),
        side: Side::Long,
        shares,
        entry_date: date,
        entry_price: price,
        exit_date: None,
        exit_price: None,
        status: TradeStatus::Open,
        pnl_pct: None,
        exit_reason: None,
        fees: commission,
        tax: 0.0,
    });

    portfolio.position = Some(Position {
        trade_index: portfolio.trades.len() - 1,
        shares,
        entry_price: price,
        entry_date: date,
        trailing_high: price,
    });

    EntryResult::Entered {
        shares,
        cost,
        commission,
    }
}

/// Result of an exit.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitResult {
    pub shares: u64,
    pub exit_price: f64,
    pub proceeds: f64,
    pub pnl_pct: f64,
    pub reason: ExitReason,
}

/// Close the open position, if any.
///
/// Credits net proceeds to cash and closes the trade with its rounded P&L
/// percentage relative to the entry notional.
pub fn exit_position(
    portfolio: &mut Portfolio,
    price: f64,
    date: NaiveDate,
    reason: ExitReason,
    config: &StrategyConfig,
) -> Option<ExitResult> {
    let position = portfolio.position.take()?;

    let gross = position.market_value(price);
    let proceeds = exit_proceeds(position.shares, price, config);
    let notional = position.entry_notional();
    let pnl_pct = if notional > 0.0 {
        round2((proceeds / notional - 1.0) * 100.0)
    } else {
        0.0
    };

    portfolio.cash += proceeds;

    if let Some(trade) = portfolio.trades.get_mut(position.trade_index) {
        trade.exit_date = Some(date);
        trade.exit_price = Some(price);
        trade.status = TradeStatus::Closed;
        trade.pnl_pct = Some(pnl_pct);
        trade.exit_reason = Some(reason);
        trade.fees += gross * config.commission_rate;
        trade.tax = gross * config.tax_rate;
    }

    Some(ExitResult {
        shares: position.shares,
        exit_price: price,
        proceeds,
        pnl_pct,
        reason,
    })
}

/// Evaluate the exit rules for an open position, in priority order:
///
/// 1. stop-loss
/// 2. ATR trailing stop (ATR enabled and the previous day's ATR positive)
/// 3. take-profit
/// 4. bearish consensus
///
/// Once the trailing stop is armed, rules 3 and 4 are not consulted.
///
/// `position.trailing_high` must already include `price`.
pub fn check_exit(
    position: &Position,
    price: f64,
    prev_atr: Option<f64>,
    consensus: &Consensus,
    config: &StrategyConfig,
) -> Option<ExitReason> {
    if position.should_stop_loss(price, config.stop_loss_pct) {
        return Some(ExitReason::StopLoss);
    }

    if config.uses(IndicatorFamily::Atr) {
        if let Some(atr) = prev_atr.filter(|a| *a > 0.0) {
            // an armed trailing stop replaces take-profit and reversal exits
            return (price < position.trailing_stop_level(atr, ATR_STOP_MULTIPLE))
                .then_some(ExitReason::TrailingStop);
        }
    }

    if position.should_take_profit(price, config.take_profit_pct) {
        return Some(ExitReason::TakeProfit);
    }

    if consensus.is_bear() {
        return Some(ExitReason::Strategy);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::IndicatorToggles;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn make_config() -> StrategyConfig {
        StrategyConfig {
            commission_rate: 0.001,
            tax_rate: 0.003,
            initial_capital: 100_000.0,
            ..StrategyConfig::default()
        }
    }

    fn open_position(entry: f64) -> Position {
        Position {
            trade_index: 0,
            shares: 100,
            entry_price: entry,
            entry_date: date(),
            trailing_high: entry,
        }
    }

    fn bear() -> Consensus {
        Consensus {
            bull_score: 0.0,
            bear_score: 1.0,
            active: 1,
        }
    }

    #[test]
    fn enter_long_sizes_with_commission() {
        let config = make_config();
        let mut portfolio = Portfolio::new(100_000.0);
        let result = enter_long(&mut portfolio, 100.0, date(), 3, &config);

        // floor(95_000 / 100.1) = 949
        let EntryResult::Entered { shares, cost, .. } = result else {
            panic!("expected entry");
        };
        assert_eq!(shares, 949);
        assert!((cost - 949.0 * 100.1).abs() < 1e-9);
        assert!((portfolio.cash - (100_000.0 - cost)).abs() < 1e-9);

        let trade = &portfolio.trades[0];
        assert_eq!(trade.id, "T-3");
        assert!(trade.is_open());
        assert_eq!(trade.pnl_pct, None);
        assert!((trade.fees - 949.0 * 0.1).abs() < 1e-6);
        assert!((portfolio.position.as_ref().unwrap().trailing_high - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn enter_long_insufficient_capital() {
        let config = make_config();
        let mut portfolio = Portfolio::new(50.0);
        let result = enter_long(&mut portfolio, 100.0, date(), 1, &config);
        assert_eq!(result, EntryResult::InsufficientCapital);
        assert!(portfolio.position.is_none());
        assert!(portfolio.trades.is_empty());
        assert!((portfolio.cash - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn exit_credits_net_proceeds_and_closes_trade() {
        let config = make_config();
        let mut portfolio = Portfolio::new(100_000.0);
        enter_long(&mut portfolio, 100.0, date(), 1, &config);
        let cash_after_entry = portfolio.cash;

        let exit_date = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        let result = exit_position(&mut portfolio, 110.0, exit_date, ExitReason::TakeProfit, &config)
            .unwrap();

        let expected_proceeds = 949.0 * 110.0 * (1.0 - 0.001 - 0.003);
        assert!((result.proceeds - expected_proceeds).abs() < 1e-6);
        assert!((portfolio.cash - (cash_after_entry + expected_proceeds)).abs() < 1e-6);
        assert!(portfolio.position.is_none());

        let trade = &portfolio.trades[0];
        assert_eq!(trade.status, TradeStatus::Closed);
        assert_eq!(trade.exit_date, Some(exit_date));
        assert_eq!(trade.exit_reason, Some(ExitReason::TakeProfit));
        // (110 * 0.996 / 100 - 1) * 100 = 9.56
        assert_eq!(trade.pnl_pct, Some(9.56));
        assert!((trade.tax - 949.0 * 110.0 * 0.003).abs() < 1e-6);
    }

    #[test]
    fn exit_without_position_is_none() {
        let config = make_config();
        let mut portfolio = Portfolio::new(1_000.0);
        assert!(exit_position(&mut portfolio, 10.0, date(), ExitReason::Strategy, &config).is_none());
    }

    #[test]
    fn stop_loss_takes_priority() {
        let config = StrategyConfig {
            stop_loss_pct: 10.0,
            take_profit_pct: 5.0,
            ..make_config()
        };
        let pos = open_position(100.0);
        assert_eq!(
            check_exit(&pos, 90.0, None, &bear(), &config),
            Some(ExitReason::StopLoss)
        );
    }

    #[test]
    fn trailing_stop_requires_atr_enabled() {
        let mut pos = open_position(100.0);
        pos.trailing_high = 120.0;
        let price = 110.0;

        let without = make_config();
        assert_eq!(check_exit(&pos, price, Some(3.0), &Consensus::default(), &without), None);

        let with = StrategyConfig {
            indicators: IndicatorToggles::NONE
                .with(IndicatorFamily::Sma)
                .with(IndicatorFamily::Atr),
            ..make_config()
        };
        // 120 - 2.5 * 3 = 112.5 > 110
        assert_eq!(
            check_exit(&pos, price, Some(3.0), &Consensus::default(), &with),
            Some(ExitReason::TrailingStop)
        );
        // zero or missing ATR disarms the stop
        assert_eq!(check_exit(&pos, price, Some(0.0), &Consensus::default(), &with), None);
        assert_eq!(check_exit(&pos, price, None, &Consensus::default(), &with), None);
    }

    #[test]
    fn armed_trailing_stop_suppresses_take_profit_and_reversal() {
        let config = StrategyConfig {
            indicators: IndicatorToggles::NONE.with(IndicatorFamily::Atr),
            take_profit_pct: 20.0,
            ..make_config()
        };
        let mut pos = open_position(100.0);
        pos.trailing_high = 125.0;
        // stop level 122.5 < 124: armed, not triggered
        assert_eq!(check_exit(&pos, 124.0, Some(1.0), &Consensus::default(), &config), None);
        assert_eq!(check_exit(&pos, 124.0, Some(1.0), &bear(), &config), None);

        // unarmed stop lets take-profit through
        assert_eq!(
            check_exit(&pos, 124.0, None, &Consensus::default(), &config),
            Some(ExitReason::TakeProfit)
        );
    }

    #[test]
    fn bearish_consensus_exits_last() {
        let config = make_config();
        let pos = open_position(100.0);
        assert_eq!(
            check_exit(&pos, 101.0, None, &bear(), &config),
            Some(ExitReason::Strategy)
        );
        assert_eq!(check_exit(&pos, 101.0, None, &Consensus::default(), &config), None);
    }
}
