//! Technical indicator pipeline.
//!
//! Each submodule computes one family as a column aligned with the input
//! series; `None` marks a value that is not (yet) defined. Index `i` of any
//! column depends only on input indices `<= i`.
//!
//! [`compute_indicators`] assembles the enabled columns into
//! [`EnrichedPoint`]s without touching the input series.

pub mod atr;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod vwma;

pub use atr::calculate_atr;
pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stochastic::calculate_stochastic;
pub use vwma::calculate_vwma;

use chrono::NaiveDate;

use crate::domain::price::PricePoint;
use crate::domain::strategy::{IndicatorFamily, StrategyConfig};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MacdValue {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StochasticValue {
    pub k: f64,
    pub d: f64,
}

/// A price point plus one optional field per indicator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EnrichedPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub ema_short: Option<f64>,
    pub ema_long: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<MacdValue>,
    pub stochastic: Option<StochasticValue>,
    pub vwma: Option<f64>,
    pub atr: Option<f64>,
}

impl EnrichedPoint {
    pub fn bare(point: &PricePoint) -> Self {
        EnrichedPoint {
            date: point.date,
            close: point.close,
            volume: point.volume,
            sma_short: None,
            sma_long: None,
            ema_short: None,
            ema_long: None,
            rsi: None,
            macd: None,
            stochastic: None,
            vwma: None,
            atr: None,
        }
    }
}

/// Compute every enabled indicator family over `series`.
///
/// Disabled families stay `None` on every point. The output has the same
/// length and dates as the input.
pub fn compute_indicators(series: &[PricePoint], config: &StrategyConfig) -> Vec<EnrichedPoint> {
    let mut enriched: Vec<EnrichedPoint> = series.iter().map(EnrichedPoint::bare).collect();
    if series.is_empty() {
        return enriched;
    }

    if config.uses(IndicatorFamily::Sma) {
        let short = calculate_sma(series, config.sma_short);
        let long = calculate_sma(series, config.sma_long);
        for (point, (s, l)) in enriched.iter_mut().zip(short.into_iter().zip(long)) {
            point.sma_short = s;
            point.sma_long = l;
        }
    }

    if config.uses(IndicatorFamily::Ema) {
        let short = calculate_ema(series, config.ema_short);
        let long = calculate_ema(series, config.ema_long);
        for (point, (s, l)) in enriched.iter_mut().zip(short.into_iter().zip(long)) {
            point.ema_short = s;
            point.ema_long = l;
        }
    }

    if config.uses(IndicatorFamily::Macd) {
        for (point, value) in enriched.iter_mut().zip(calculate_macd(series)) {
            point.macd = value;
        }
    }

    if config.uses(IndicatorFamily::Stochastic) {
        for (point, value) in enriched.iter_mut().zip(calculate_stochastic(series)) {
            point.stochastic = value;
        }
    }

    if config.uses(IndicatorFamily::Vwma) {
        for (point, value) in enriched
            .iter_mut()
            .zip(calculate_vwma(series, config.vwma_period))
        {
            point.vwma = value;
        }
    }

    if config.uses(IndicatorFamily::Atr) {
        for (point, value) in enriched
            .iter_mut()
            .zip(calculate_atr(series, atr::ATR_PERIOD))
        {
            point.atr = value;
        }
    }

    if config.uses(IndicatorFamily::Rsi) {
        for (point, value) in enriched
            .iter_mut()
            .zip(calculate_rsi(series, config.rsi_period))
        {
            point.rsi = value;
        }
    }

    enriched
}

/// Human-readable parameterised names of the enabled families, e.g.
/// `["SMA(5,20)", "RSI(14)"]`.
pub fn describe_indicators(config: &StrategyConfig) -> Vec<String> {
    config
        .indicators
        .enabled()
        .map(|family| match family {
            IndicatorFamily::Sma => format!("SMA({},{})", config.sma_short, config.sma_long),
            IndicatorFamily::Ema => format!("EMA({},{})", config.ema_short, config.ema_long),
            IndicatorFamily::Rsi => format!("RSI({})", config.rsi_period),
            IndicatorFamily::Macd => format!(
                "MACD({},{},{})",
                macd::FAST_PERIOD,
                macd::SLOW_PERIOD,
                macd::SIGNAL_PERIOD
            ),
            IndicatorFamily::Stochastic => format!("KD({},3,3)", stochastic::LOOKBACK),
            IndicatorFamily::Vwma => format!("VWMA({})", config.vwma_period),
            IndicatorFamily::Atr => format!("ATR({})", atr::ATR_PERIOD),
        })
        .collect()
}
