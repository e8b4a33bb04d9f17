//! The fixed catalog of preset strategies scanned by the optimizer.

use std::fmt;

use crate::domain::indicator::describe_indicators;
use crate::domain::strategy::{BacktestMode, IndicatorFamily, IndicatorToggles, StrategyConfig};

/// Expected trading frequency of a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FrequencyTier {
    High,
    Mid,
    Low,
}

impl FrequencyTier {
    /// Trading style phrase used in the recommendation text.
    pub fn style(self) -> &'static str {
        match self {
            FrequencyTier::High => "high-frequency trading",
            FrequencyTier::Mid => "swing trading",
            FrequencyTier::Low => "long-term holding",
        }
    }
}

impl fmt::Display for FrequencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FrequencyTier::High => "HIGH",
            FrequencyTier::Mid => "MID",
            FrequencyTier::Low => "LOW",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiOverride {
    pub period: usize,
    pub overbought: f64,
    pub oversold: f64,
}

/// Settings a preset forces over the base configuration. Families not in
/// `indicators` are switched off; `None` windows inherit from the base.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetOverrides {
    pub indicators: IndicatorToggles,
    pub sma: Option<(usize, usize)>,
    pub ema: Option<(usize, usize)>,
    pub rsi: Option<RsiOverride>,
    pub vwma_period: Option<usize>,
    pub stop_loss_pct: f64,
}

impl PresetOverrides {
    pub fn apply(&self, base: &StrategyConfig) -> StrategyConfig {
        let mut config = base.clone();
        config.indicators = self.indicators;
        config.mode = BacktestMode::Single;
        config.stop_loss_pct = self.stop_loss_pct;

        if let Some((short, long)) = self.sma {
            config.sma_short = short;
            config.sma_long = long;
        }
        if let Some((short, long)) = self.ema {
            config.ema_short = short;
            config.ema_long = long;
        }
        if let Some(rsi) = self.rsi {
            config.rsi_period = rsi.period;
            config.rsi_overbought = rsi.overbought;
            config.rsi_oversold = rsi.oversold;
        }
        if let Some(period) = self.vwma_period {
            config.vwma_period = period;
        }

        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyPreset {
    pub name: &'static str,
    pub frequency: FrequencyTier,
    pub logic_type: &'static str,
    pub role_description: &'static str,
    /// Catalog label, in disclosure order, as run on the default config.
    pub indicators: &'static [&'static str],
    pub overrides: PresetOverrides,
}

impl StrategyPreset {
    pub fn configure(&self, base: &StrategyConfig) -> StrategyConfig {
        self.overrides.apply(base)
    }

    /// Parameterised indicator names as run on top of `base`.
    pub fn applied_indicators(&self, base: &StrategyConfig) -> Vec<String> {
        describe_indicators(&self.configure(base))
    }
}

const fn toggles(families: &[IndicatorFamily]) -> IndicatorToggles {
    let mut t = IndicatorToggles::NONE;
    let mut i = 0;
    while i < families.len() {
        t = t.with(families[i]);
        i += 1;
    }
    t
}

pub const PRESET_CATALOG: [StrategyPreset; 5] = [
    StrategyPreset {
        name: "Aggressive Momentum",
        frequency: FrequencyTier::High,
        logic_type: "Momentum / Trend",
        role_description: "SMA: short-term trend confirmation | RSI+KD: momentum entry signals | ATR: dynamic trailing stop",
        indicators: &["SMA(3,8)", "RSI(7)", "KD(9,3,3)", "ATR(14)"],
        overrides: PresetOverrides {
            indicators: toggles(&[
                IndicatorFamily::Sma,
                IndicatorFamily::Rsi,
                IndicatorFamily::Stochastic,
                IndicatorFamily::Atr,
            ]),
            sma: Some((3, 8)),
            ema: None,
            rsi: Some(RsiOverride {
                period: 7,
                overbought: 80.0,
                oversold: 20.0,
            }),
            vwma_period: None,
            stop_loss_pct: 5.0,
        },
    },
    StrategyPreset {
        name: "Balanced Swing",
        frequency: FrequencyTier::Mid,
        logic_type: "Trend Following",
        role_description: "EMA: primary trend direction | MACD: momentum confirmation | RSI: filters extremes | ATR: swing risk control",
        indicators: &["EMA(10,20)", "RSI(14)", "MACD(12,26,9)", "ATR(14)"],
        overrides: PresetOverrides {
            indicators: toggles(&[
                IndicatorFamily::Ema,
                IndicatorFamily::Rsi,
                IndicatorFamily::Macd,
                IndicatorFamily::Atr,
            ]),
            sma: None,
            ema: Some((10, 20)),
            rsi: Some(RsiOverride {
                period: 14,
                overbought: 70.0,
                oversold: 30.0,
            }),
            vwma_period: None,
            stop_loss_pct: 10.0,
        },
    },
    StrategyPreset {
        name: "Conservative Filter",
        frequency: FrequencyTier::Low,
        logic_type: "Trend / Volume",
        role_description: "SMA: long-term moving average support | MACD: momentum filter | VWMA: volume-weighted trend confirmation",
        indicators: &["SMA(20,60)", "MACD(12,26,9)", "VWMA(20)"],
        overrides: PresetOverrides {
            indicators: toggles(&[
                IndicatorFamily::Sma,
                IndicatorFamily::Macd,
                IndicatorFamily::Vwma,
            ]),
            sma: Some((20, 60)),
            ema: None,
            rsi: None,
            vwma_period: Some(20),
            stop_loss_pct: 15.0,
        },
    },
    StrategyPreset {
        name: "Mixed Momentum",
        frequency: FrequencyTier::Mid,
        logic_type: "Consensus",
        role_description: "KD+RSI+MACD: three-indicator consensus entry (voting) | ATR: volatility protection",
        indicators: &["RSI(14)", "MACD(12,26,9)", "KD(9,3,3)", "ATR(14)"],
        overrides: PresetOverrides {
            indicators: toggles(&[
                IndicatorFamily::Rsi,
                IndicatorFamily::Macd,
                IndicatorFamily::Stochastic,
                IndicatorFamily::Atr,
            ]),
            sma: None,
            ema: None,
            rsi: None,
            vwma_period: None,
            stop_loss_pct: 8.0,
        },
    },
    StrategyPreset {
        name: "Volume Breakout",
        frequency: FrequencyTier::High,
        logic_type: "Volume / Momentum",
        role_description: "VWMA: volume breakout detection | EMA: short-term acceleration confirmation | ATR: fast stop",
        indicators: &["EMA(5,10)", "VWMA(5)", "ATR(14)"],
        overrides: PresetOverrides {
            indicators: toggles(&[
                IndicatorFamily::Ema,
                IndicatorFamily::Vwma,
                IndicatorFamily::Atr,
            ]),
            sma: None,
            ema: Some((5, 10)),
            rsi: None,
            vwma_period: Some(5),
            stop_loss_pct: 6.0,
        },
    },
];
