//! Weighted bull/bear consensus over the enabled indicator families.
//!
//! Each enabled family whose values are defined on the scored point is
//! *active* and casts at most one weighted vote:
//!
//! | family | bull | bear |
//! |---|---|---|
//! | SMA, EMA | short > long (1.0) | otherwise (1.0) |
//! | MACD | histogram > 0 (1.0) | otherwise (1.0) |
//! | VWMA | close > VWMA (1.0) | otherwise (1.0) |
//! | RSI | below oversold (1.2) | above overbought (1.2) |
//! | KD | K > D (0.8) | otherwise (0.8) |
//!
//! Bull and bear ratios are the vote sums over the active count, each
//! compared against the entry threshold independently.
//!
//! Warm-up is a property of the day index, not of the values: a family whose
//! window has filled but whose value is still undefined (VWMA over a window
//! with no volume) is simply inactive.

use crate::domain::indicator::stochastic::LOOKBACK;
use crate::domain::indicator::EnrichedPoint;
use crate::domain::strategy::{IndicatorFamily, StrategyConfig};

pub const CROSS_WEIGHT: f64 = 1.0;
pub const RSI_WEIGHT: f64 = 1.2;
pub const STOCHASTIC_WEIGHT: f64 = 0.8;

/// Threshold when a single family is active.
pub const SINGLE_FAMILY_THRESHOLD: f64 = 0.9;
/// Threshold when two or more families are active.
pub const MULTI_FAMILY_THRESHOLD: f64 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Consensus {
    pub bull_score: f64,
    pub bear_score: f64,
    pub active: usize,
}

impl Consensus {
    pub fn threshold(&self) -> f64 {
        if self.active == 1 {
            SINGLE_FAMILY_THRESHOLD
        } else {
            MULTI_FAMILY_THRESHOLD
        }
    }

    pub fn bull_ratio(&self) -> Option<f64> {
        (self.active > 0).then(|| self.bull_score / self.active as f64)
    }

    pub fn bear_ratio(&self) -> Option<f64> {
        (self.active > 0).then(|| self.bear_score / self.active as f64)
    }

    pub fn is_bull(&self) -> bool {
        self.bull_ratio().is_some_and(|r| r >= self.threshold())
    }

    pub fn is_bear(&self) -> bool {
        self.bear_ratio().is_some_and(|r| r >= self.threshold())
    }
}

/// Score one enriched point under `config`.
pub fn score(point: &EnrichedPoint, config: &StrategyConfig) -> Consensus {
    let mut consensus = Consensus::default();

    for family in config.indicators.enabled().filter(|f| f.votes()) {
        if let Some((bull, bear)) = vote(point, family, config) {
            consensus.active += 1;
            consensus.bull_score += bull;
            consensus.bear_score += bear;
        }
    }

    consensus
}

/// First day index at which `family` can be defined under `config`.
pub fn warm_up_index(family: IndicatorFamily, config: &StrategyConfig) -> usize {
    match family {
        IndicatorFamily::Sma => config.sma_short.max(config.sma_long).saturating_sub(1),
        IndicatorFamily::Ema | IndicatorFamily::Macd => 0,
        IndicatorFamily::Rsi => config.rsi_period,
        IndicatorFamily::Stochastic => LOOKBACK - 1,
        IndicatorFamily::Vwma => config.vwma_period.saturating_sub(1),
        IndicatorFamily::Atr => 1,
    }
}

/// True once the series is long enough at `index` for every enabled voting
/// family's window.
pub fn is_warmed_up(index: usize, config: &StrategyConfig) -> bool {
    config
        .indicators
        .enabled()
        .filter(|f| f.votes())
        .all(|family| index >= warm_up_index(family, config))
}

/// (bull, bear) weights for one family, or `None` if its values are undefined.
fn vote(point: &EnrichedPoint, family: IndicatorFamily, config: &StrategyConfig) -> Option<(f64, f64)> {
    let split = |bullish: bool, weight: f64| {
        if bullish { (weight, 0.0) } else { (0.0, weight) }
    };

    match family {
        IndicatorFamily::Sma => {
            let (short, long) = (point.sma_short?, point.sma_long?);
            Some(split(short > long, CROSS_WEIGHT))
        }
        IndicatorFamily::Ema => {
            let (short, long) = (point.ema_short?, point.ema_long?);
            Some(split(short > long, CROSS_WEIGHT))
        }
        IndicatorFamily::Macd => Some(split(point.macd?.histogram > 0.0, CROSS_WEIGHT)),
        IndicatorFamily::Vwma => Some(split(point.close > point.vwma?, CROSS_WEIGHT)),
        IndicatorFamily::Stochastic => {
            let kd = point.stochastic?;
            Some(split(kd.k > kd.d, STOCHASTIC_WEIGHT))
        }
        IndicatorFamily::Rsi => {
            let rsi = point.rsi?;
            if rsi < config.rsi_oversold {
                Some((RSI_WEIGHT, 0.0))
            } else if rsi > config.rsi_overbought {
                Some((0.0, RSI_WEIGHT))
            } else {
                Some((0.0, 0.0))
            }
        }
        IndicatorFamily::Atr => None,
    }
}
