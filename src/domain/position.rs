//! Trade records and the open position they belong to.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TradeStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Side {
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ExitReason {
    Strategy,
    StopLoss,
    TakeProfit,
    TrailingStop,
    ForceClose,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => f.write_str("LONG"),
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::Strategy => "STRATEGY",
            ExitReason::StopLoss => "STOP_LOSS",
            ExitReason::TakeProfit => "TAKE_PROFIT",
            ExitReason::TrailingStop => "TRAILING_STOP",
            ExitReason::ForceClose => "FORCE_CLOSE",
        };
        f.write_str(s)
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TradeStatus::Open => "OPEN",
            TradeStatus::Closed => "CLOSED",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Trade {
    pub id: String,
    pub side: Side,
    pub shares: u64,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: Option<NaiveDate>,
    pub exit_price: Option<f64>,
    pub status: TradeStatus,
    /// Realized P&L in percent of entry notional, rounded to 2 decimals.
    /// Set at close only.
    pub pnl_pct: Option<f64>,
    pub exit_reason: Option<ExitReason>,
    /// Entry plus exit commission.
    pub fees: f64,
    pub tax: f64,
}

impl Trade {
    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }

    pub fn is_winner(&self) -> bool {
        self.pnl_pct.is_some_and(|p| p > 0.0)
    }
}

/// Live long position; `trade_index` points at its OPEN [`Trade`].
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub trade_index: usize,
    pub shares: u64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    /// Highest close seen since entry, including the entry day.
    pub trailing_high: f64,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.shares as f64 * price
    }

    pub fn entry_notional(&self) -> f64 {
        self.shares as f64 * self.entry_price
    }

    /// Unrealized move in percent of the entry price, before costs.
    pub fn pnl_pct(&self, price: f64) -> f64 {
        let base = if self.entry_price != 0.0 {
            self.entry_price
        } else {
            1.0
        };
        (price - self.entry_price) / base * 100.0
    }

    pub fn should_stop_loss(&self, price: f64, stop_loss_pct: f64) -> bool {
        stop_loss_pct > 0.0 && self.pnl_pct(price) <= -stop_loss_pct
    }

    pub fn should_take_profit(&self, price: f64, take_profit_pct: f64) -> bool {
        take_profit_pct > 0.0 && self.pnl_pct(price) >= take_profit_pct
    }

    /// Price below which the trailing stop fires.
    pub fn trailing_stop_level(&self, atr: f64, multiple: f64) -> f64 {
        self.trailing_high - atr * multiple
    }

    pub fn raise_trailing_high(&mut self, price: f64) {
        if price > self.trailing_high {
            self.trailing_high = price;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_position() -> Position {
        Position {
            trade_index: 0,
            shares: 100,
            entry_price: 50.0,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            trailing_high: 50.0,
        }
    }

    #[test]
    fn market_value_and_notional() {
        let pos = sample_position();
        assert!((pos.market_value(55.0) - 5500.0).abs() < f64::EPSILON);
        assert!((pos.entry_notional() - 5000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pnl_pct_is_percent() {
        let pos = sample_position();
        assert!((pos.pnl_pct(55.0) - 10.0).abs() < 1e-12);
        assert!((pos.pnl_pct(45.0) + 10.0).abs() < 1e-12);
    }

    #[test]
    fn stop_loss_triggers_at_boundary() {
        let pos = Position {
            entry_price: 100.0,
            ..sample_position()
        };
        assert!(pos.should_stop_loss(90.0, 10.0));
        assert!(pos.should_stop_loss(89.0, 10.0));
        assert!(!pos.should_stop_loss(91.0, 10.0));
    }

    #[test]
    fn stop_loss_disabled_at_zero() {
        let pos = sample_position();
        assert!(!pos.should_stop_loss(0.01, 0.0));
    }

    #[test]
    fn take_profit_triggers_at_boundary() {
        let pos = Position {
            entry_price: 100.0,
            ..sample_position()
        };
        assert!(pos.should_take_profit(130.0, 30.0));
        assert!(!pos.should_take_profit(129.0, 30.0));
        assert!(!pos.should_take_profit(1_000.0, 0.0));
    }

    #[test]
    fn trailing_high_only_rises() {
        let mut pos = sample_position();
        pos.raise_trailing_high(60.0);
        pos.raise_trailing_high(55.0);
        assert!((pos.trailing_high - 60.0).abs() < f64::EPSILON);
        assert!((pos.trailing_stop_level(2.0, 2.5) - 55.0).abs() < f64::EPSILON);
    }

    #[test]
    fn exit_reason_display() {
        assert_eq!(Side::Long.to_string(), "LONG");
        assert_eq!(ExitReason::TrailingStop.to_string(), "TRAILING_STOP");
        assert_eq!(ExitReason::ForceClose.to_string(), "FORCE_CLOSE");
        assert_eq!(TradeStatus::Closed.to_string(), "CLOSED");
    }

    #[test]
    fn trade_helpers() {
        let trade = Trade {
            id: "T-3".into(),
            side: Side::Long,
            shares: 10,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            entry_price: 10.0,
            exit_date: NaiveDate::from_ymd_opt(2024, 1, 11),
            exit_price: Some(11.0),
            status: TradeStatus::Closed,
            pnl_pct: Some(9.5),
            exit_reason: Some(ExitReason::Strategy),
            fees: 0.3,
            tax: 0.33,
        };
        assert!(!trade.is_open());
        assert!(trade.is_winner());
    }
}
