//! Preset scanner: backtests every catalog preset on one series, ranks them by
//! a penalized Sharpe score and explains why each loser was rejected.
//!
//! Evaluation is a pure function of the series, the base configuration and the
//! catalog. Presets are run in catalog order and ranked with a stable sort, so
//! equal scores keep catalog order.

pub mod presets;

pub use presets::{FrequencyTier, PresetOverrides, RsiOverride, StrategyPreset, PRESET_CATALOG};

use std::fmt;

use tracing::{debug, info};

use super::backtest::BacktestResult;
use super::indicator::{compute_indicators, describe_indicators};
use super::metrics::Metrics;
use super::price::PricePoint;
use super::simulation::{run_simulation, SimulationOutcome};
use super::strategy::StrategyConfig;

/// Score assigned when Sharpe is undefined.
pub const UNDEFINED_SHARPE_SCORE: f64 = -999.0;
pub const FEW_TRADES: usize = 5;
pub const MIN_TRADES: usize = 10;
pub const FEW_TRADES_PENALTY: f64 = 0.5;
pub const SOME_TRADES_PENALTY: f64 = 0.8;
/// Drawdown ratio above which the score is penalized.
pub const DEEP_DRAWDOWN: f64 = 0.40;
pub const DEEP_DRAWDOWN_PENALTY: f64 = 0.6;
/// Drawdown ratio above which a non-winning preset is rejected as too risky.
pub const REJECT_DRAWDOWN: f64 = 0.30;
/// Fraction of the winner's return below which a preset underperforms.
pub const UNDERPERFORMANCE_RATIO: f64 = 0.5;

pub const TIMEFRAME: &str = "Daily";

/// Sharpe (or [`UNDEFINED_SHARPE_SCORE`]) scaled by the trade-count and
/// drawdown penalties.
pub fn penalized_score(sharpe: Option<f64>, trade_count: usize, max_drawdown: f64) -> f64 {
    let mut score = sharpe.unwrap_or(UNDEFINED_SHARPE_SCORE);
    if trade_count < FEW_TRADES {
        score *= FEW_TRADES_PENALTY;
    } else if trade_count < MIN_TRADES {
        score *= SOME_TRADES_PENALTY;
    }
    if max_drawdown > DEEP_DRAWDOWN {
        score *= DEEP_DRAWDOWN_PENALTY;
    }
    score
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LogStatus {
    Optimal,
    Rejected,
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogStatus::Optimal => "OPTIMAL",
            LogStatus::Rejected => "REJECTED",
        })
    }
}

/// Why a preset won or was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LogReason {
    OptimalRiskReward,
    InsufficientTrades,
    HighDrawdown,
    NegativeSharpe,
    Underperformance,
    Suboptimal,
}

impl fmt::Display for LogReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogReason::OptimalRiskReward => "Optimal risk-adjusted return",
            LogReason::InsufficientTrades => "Insufficient trades",
            LogReason::HighDrawdown => "High drawdown",
            LogReason::NegativeSharpe => "Negative Sharpe",
            LogReason::Underperformance => "Underperformance",
            LogReason::Suboptimal => "Suboptimal",
        })
    }
}

/// First matching rejection reason for a non-winning preset. Returns and
/// drawdown are ratios.
pub fn rejection_reason(
    trade_count: usize,
    max_drawdown: f64,
    sharpe: Option<f64>,
    total_return: f64,
    best_return: f64,
) -> LogReason {
    if trade_count < MIN_TRADES {
        LogReason::InsufficientTrades
    } else if max_drawdown > REJECT_DRAWDOWN {
        LogReason::HighDrawdown
    } else if sharpe.is_some_and(|s| s < 0.0) {
        LogReason::NegativeSharpe
    } else if total_return < best_return * UNDERPERFORMANCE_RATIO {
        LogReason::Underperformance
    } else {
        LogReason::Suboptimal
    }
}

/// One row of the decision log. Percentages are rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BacktestLogItem {
    pub name: String,
    pub logic_type: String,
    pub timeframe: String,
    pub frequency: FrequencyTier,
    pub trade_count: usize,
    pub win_rate: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub sharpe: Option<f64>,
    pub score: f64,
    pub status: LogStatus,
    pub reason: LogReason,
    pub indicators: Vec<String>,
    pub role_description: String,
}

/// Headline figures of the winning preset.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WinnerMetrics {
    pub sharpe: Option<f64>,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OptimizerReport {
    pub best_combination: Vec<String>,
    pub metrics: WinnerMetrics,
    /// Every preset in rank order; the first row is the winner.
    pub log: Vec<BacktestLogItem>,
    pub recommendation: String,
}

impl OptimizerReport {
    pub fn winner(&self) -> Option<&BacktestLogItem> {
        self.log.iter().find(|item| item.status == LogStatus::Optimal)
    }
}

/// A preset after its backtest, before ranking.
#[derive(Debug, Clone)]
pub struct PresetEvaluation<'p> {
    pub preset: &'p StrategyPreset,
    pub config: StrategyConfig,
    pub outcome: SimulationOutcome,
    pub score: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct StrategyOptimizer<'a> {
    catalog: &'a [StrategyPreset],
}

impl Default for StrategyOptimizer<'static> {
    fn default() -> Self {
        StrategyOptimizer::new(&PRESET_CATALOG)
    }
}

impl<'a> StrategyOptimizer<'a> {
    pub const fn new(catalog: &'a [StrategyPreset]) -> Self {
        StrategyOptimizer { catalog }
    }

    /// Backtest and score every preset, returned in rank order.
    pub fn evaluate(&self, series: &[PricePoint], base: &StrategyConfig) -> Vec<PresetEvaluation<'a>> {
        let mut evaluations: Vec<PresetEvaluation<'a>> = self
            .catalog
            .iter()
            .map(|preset| {
                let config = preset.configure(base);
                let enriched = compute_indicators(series, &config);
                let outcome = run_simulation(&enriched, &config);
                let score = penalized_score(outcome.sharpe, outcome.trade_count(), outcome.max_drawdown);
                debug!(
                    preset = preset.name,
                    trades = outcome.trade_count(),
                    sharpe = ?outcome.sharpe,
                    max_drawdown = outcome.max_drawdown,
                    score,
                    "preset evaluated"
                );
                PresetEvaluation {
                    preset,
                    config,
                    outcome,
                    score,
                }
            })
            .collect();

        evaluations.sort_by(|a, b| b.score.total_cmp(&a.score));
        evaluations
    }

    /// Full scan: the winner's result with the decision log attached.
    ///
    /// An empty catalog yields an empty result without a report.
    pub fn run(&self, series: &[PricePoint], base: &StrategyConfig) -> BacktestResult {
        let evaluations = self.evaluate(series, base);
        let Some(best) = evaluations.first() else {
            return BacktestResult::empty(base.initial_capital);
        };
        let best_return = best.outcome.total_return;

        let log: Vec<BacktestLogItem> = evaluations
            .iter()
            .enumerate()
            .map(|(rank, eval)| {
                let reason = if rank == 0 {
                    LogReason::OptimalRiskReward
                } else {
                    rejection_reason(
                        eval.outcome.trade_count(),
                        eval.outcome.max_drawdown,
                        eval.outcome.sharpe,
                        eval.outcome.total_return,
                        best_return,
                    )
                };
                log_item(eval, base, rank == 0, reason)
            })
            .collect();

        let Some(best) = evaluations.into_iter().next() else {
            return BacktestResult::empty(base.initial_capital);
        };
        let preset = best.preset;
        let mut result = BacktestResult::from_outcome(best.outcome, base.initial_capital);

        info!(
            winner = preset.name,
            trades = result.trade_count(),
            total_return = result.total_return,
            sharpe = ?result.sharpe_ratio,
            "preset scan complete"
        );

        let metrics = WinnerMetrics {
            sharpe: result.sharpe_ratio,
            total_return: result.total_return,
            max_drawdown: result.max_drawdown,
            win_rate: result.win_rate,
        };
        let recommendation = log
            .first()
            .map(|winner| recommendation(preset, winner))
            .unwrap_or_default();

        result.optimizer = Some(OptimizerReport {
            best_combination: vec![preset.name.to_string()],
            metrics,
            log,
            recommendation,
        });
        result
    }
}

/// Scan the default preset catalog.
pub fn run_strategy_optimizer(series: &[PricePoint], base: &StrategyConfig) -> BacktestResult {
    StrategyOptimizer::default().run(series, base)
}

fn log_item(
    eval: &PresetEvaluation<'_>,
    base: &StrategyConfig,
    optimal: bool,
    reason: LogReason,
) -> BacktestLogItem {
    let metrics = Metrics::compute(
        base.initial_capital,
        &eval.outcome.trades,
        &eval.outcome.equity_curve,
    );
    BacktestLogItem {
        name: eval.preset.name.to_string(),
        logic_type: eval.preset.logic_type.to_string(),
        timeframe: TIMEFRAME.to_string(),
        frequency: eval.preset.frequency,
        trade_count: metrics.trade_count,
        win_rate: metrics.win_rate,
        total_return: metrics.total_return,
        max_drawdown: metrics.max_drawdown,
        sharpe: metrics.sharpe_ratio,
        score: eval.score,
        status: if optimal {
            LogStatus::Optimal
        } else {
            LogStatus::Rejected
        },
        reason,
        indicators: describe_indicators(&eval.config),
        role_description: eval.preset.role_description.to_string(),
    }
}

fn recommendation(preset: &StrategyPreset, winner: &BacktestLogItem) -> String {
    format!(
        "Scan selected \"{name}\" as the best strategy for the current market regime.\n\
         \n\
         1. Indicator combination: the strategy combines [{indicators}].\n\
         2. Indicator roles: {roles}.\n\
         3. Strategy profile: {logic} logic in a {style} style.\n\
         4. Performance summary: {trades} trades over the backtest period, with maximum drawdown held to {mdd}%.\n\
         \n\
         Compared with the presets rejected for thin samples or excess risk, this configuration \
         strikes the best balance between signal coverage and risk control.",
        name = winner.name,
        indicators = winner.indicators.join(", "),
        roles = preset.role_description,
        logic = preset.logic_type,
        style = preset.frequency.style(),
        trades = winner.trade_count,
        mdd = winner.max_drawdown,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_series;
    use crate::domain::strategy::{IndicatorFamily, IndicatorToggles};

    fn wavy(n: usize) -> Vec<PricePoint> {
        let prices: Vec<f64> = (0..n)
            .map(|i| 100.0 + (i as f64 * 0.35).sin() * 8.0 + (i as f64 * 0.05))
            .collect();
        make_series(&prices)
    }

    #[test]
    fn score_penalties() {
        assert_eq!(penalized_score(None, 0, 0.0), -499.5);
        assert_eq!(penalized_score(Some(2.0), 4, 0.0), 1.0);
        assert_eq!(penalized_score(Some(2.0), 5, 0.0), 1.6);
        assert_eq!(penalized_score(Some(2.0), 10, 0.0), 2.0);
        assert!((penalized_score(Some(2.0), 12, 0.45) - 1.2).abs() < 1e-12);
        assert_eq!(penalized_score(Some(2.0), 12, 0.40), 2.0);
    }

    #[test]
    fn rejection_reasons_in_order() {
        assert_eq!(rejection_reason(3, 0.9, Some(-1.0), -0.5, 0.2), LogReason::InsufficientTrades);
        assert_eq!(rejection_reason(12, 0.31, Some(-1.0), -0.5, 0.2), LogReason::HighDrawdown);
        assert_eq!(rejection_reason(12, 0.30, Some(-0.1), 0.15, 0.2), LogReason::NegativeSharpe);
        assert_eq!(rejection_reason(12, 0.1, None, 0.05, 0.2), LogReason::Underperformance);
        assert_eq!(rejection_reason(12, 0.1, Some(0.5), 0.15, 0.2), LogReason::Suboptimal);
    }

    #[test]
    fn exactly_one_optimal_and_it_ranks_first() {
        let result = run_strategy_optimizer(&wavy(200), &StrategyConfig::default());
        let report = result.optimizer.as_ref().unwrap();

        assert_eq!(report.log.len(), PRESET_CATALOG.len());
        assert_eq!(report.log[0].status, LogStatus::Optimal);
        assert_eq!(report.log[0].reason, LogReason::OptimalRiskReward);
        assert_eq!(
            report.log.iter().filter(|i| i.status == LogStatus::Optimal).count(),
            1
        );
        assert!(report.log.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(report.best_combination, vec![report.log[0].name.clone()]);
        assert_eq!(report.winner().map(|w| w.trade_count), Some(result.trade_count()));
        assert_eq!(report.metrics.total_return, result.total_return);
    }

    #[test]
    fn scan_is_deterministic() {
        let series = wavy(150);
        let base = StrategyConfig::default();
        let a = run_strategy_optimizer(&series, &base);
        let b = run_strategy_optimizer(&series, &base);
        assert_eq!(a, b);
    }

    #[test]
    fn conservative_preset_inert_on_short_series() {
        let result = run_strategy_optimizer(&wavy(55), &StrategyConfig::default());
        let report = result.optimizer.unwrap();
        let conservative = report
            .log
            .iter()
            .find(|i| i.name == "Conservative Filter")
            .unwrap();

        assert_eq!(conservative.trade_count, 0);
        assert_eq!(conservative.status, LogStatus::Rejected);
        assert_eq!(conservative.reason, LogReason::InsufficientTrades);
        assert_eq!(conservative.sharpe, None);
        assert_eq!(conservative.indicators, vec!["SMA(20,60)", "MACD(12,26,9)", "VWMA(20)"]);
    }

    fn sma_preset(name: &'static str) -> StrategyPreset {
        StrategyPreset {
            name,
            frequency: FrequencyTier::Low,
            logic_type: "Trend",
            role_description: "SMA: trend",
            indicators: &["SMA(5,20)"],
            overrides: PresetOverrides {
                indicators: IndicatorToggles::NONE.with(IndicatorFamily::Sma),
                sma: Some((5, 20)),
                ema: None,
                rsi: None,
                vwma_period: None,
                stop_loss_pct: 10.0,
            },
        }
    }

    #[test]
    fn equal_scores_keep_catalog_order() {
        // flat prices never cross, so both presets stay idle and tie
        let catalog = [sma_preset("first"), sma_preset("second")];
        let optimizer = StrategyOptimizer::new(&catalog);
        let ranked = optimizer.evaluate(&make_series(&[100.0; 30]), &StrategyConfig::default());

        let names: Vec<_> = ranked.iter().map(|e| e.preset.name).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(ranked[0].score, ranked[1].score);
        assert_eq!(ranked[0].outcome.trade_count(), 0);
    }

    #[test]
    fn custom_catalog() {
        let only = [sma_preset("SMA only")];
        let optimizer = StrategyOptimizer::new(&only);
        let result = optimizer.run(&wavy(120), &StrategyConfig::default());
        let report = result.optimizer.unwrap();
        assert_eq!(report.best_combination, vec!["SMA only".to_string()]);
        assert_eq!(report.log.len(), 1);
        assert!(report.recommendation.contains("\"SMA only\""));
        assert!(report.recommendation.contains("[SMA(5,20)]"));
        assert!(report.recommendation.contains("long-term holding"));
    }

    #[test]
    fn empty_catalog_yields_empty_result() {
        let optimizer = StrategyOptimizer::new(&[]);
        let result = optimizer.run(&wavy(50), &StrategyConfig::default());
        assert!(result.optimizer.is_none());
        assert!(result.trades.is_empty());
    }

    #[test]
    fn log_rows_carry_disclosure() {
        let result = run_strategy_optimizer(&wavy(100), &StrategyConfig::default());
        for item in &result.optimizer.unwrap().log {
            assert_eq!(item.timeframe, "Daily");
            assert!(!item.indicators.is_empty());
            assert!(!item.role_description.is_empty());
        }
    }
}
