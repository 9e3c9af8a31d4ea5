//! Rule evaluation engine.
//!
//! Tree-walking interpreter over a compiled [`Strategy`]. Indicator series are
//! computed once per run, then every rule is evaluated bar by bar.
//!
//! # Evaluation Semantics
//!
//! - Operands resolve to the bar's field, a constant, or the indicator value
//!   at that bar
//! - `==`/`!=` compare with an absolute tolerance of `1e-9`
//! - `AND`/`OR` combine elementwise
//! - If any operand anywhere in a rule is undefined at a bar (indicator
//!   warm-up), the whole rule is `false` at that bar

use crate::domain::error::PhraseTraderError;
use crate::domain::indicator::{compute_indicators, IndicatorSeries};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::rule::{CompareOp, IndicatorCall, LogicOp, Operand, Rule, MAX_COMPARISONS};
use crate::domain::strategy::Strategy;
use std::collections::HashMap;

const EPSILON: f64 = 1e-9;

/// Per-bar entry/exit decisions, aligned by index to the input series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signals {
    pub entry: Vec<bool>,
    pub exit: Vec<bool>,
}

impl Signals {
    pub fn len(&self) -> usize {
        self.entry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_empty()
    }
}

/// A validated strategy ready to run against any number of series.
#[derive(Debug, Clone)]
pub struct CompiledStrategy {
    strategy: Strategy,
    indicators: Vec<IndicatorCall>,
}

/// Validate a strategy for evaluation. Fails on rules larger than
/// [`MAX_COMPARISONS`] and on indicator calls that the registry cannot
/// compute (a zero period).
pub fn compile(strategy: &Strategy) -> Result<CompiledStrategy, PhraseTraderError> {
    for (label, rule) in [("entry", &strategy.entry), ("exit", &strategy.exit)] {
        let count = rule.comparison_count();
        if count > MAX_COMPARISONS {
            return Err(PhraseTraderError::MalformedAst {
                reason: format!(
                    "{} rule has {} comparisons, limit is {}",
                    label, count, MAX_COMPARISONS
                ),
            });
        }
    }

    let indicators = strategy.indicators();
    if let Some(call) = indicators.iter().find(|call| call.period == 0) {
        return Err(PhraseTraderError::MalformedAst {
            reason: format!("{} has a zero period", call),
        });
    }
    Ok(CompiledStrategy {
        strategy: strategy.clone(),
        indicators,
    })
}

impl CompiledStrategy {
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Longest indicator warm-up; bars before this index can never signal.
    pub fn warmup(&self) -> usize {
        self.indicators
            .iter()
            .map(|call| call.period - 1)
            .max()
            .unwrap_or(0)
    }

    pub fn evaluate(&self, bars: &[OhlcvBar]) -> Signals {
        let indicators = compute_indicators(&self.indicators, bars);
        let entry = (0..bars.len())
            .map(|i| evaluate(&self.strategy.entry, bars, &indicators, i))
            .collect();
        let exit = (0..bars.len())
            .map(|i| evaluate(&self.strategy.exit, bars, &indicators, i))
            .collect();
        Signals { entry, exit }
    }
}

/// Evaluate `rule` at `bar_index`; undefined operands make it `false`.
pub fn evaluate(
    rule: &Rule,
    bars: &[OhlcvBar],
    indicators: &HashMap<IndicatorCall, IndicatorSeries>,
    bar_index: usize,
) -> bool {
    evaluate_defined(rule, bars, indicators, bar_index).unwrap_or(false)
}

fn evaluate_defined(
    rule: &Rule,
    bars: &[OhlcvBar],
    indicators: &HashMap<IndicatorCall, IndicatorSeries>,
    bar_index: usize,
) -> Option<bool> {
    match rule {
        Rule::Comparison { op, left, right } => {
            let l = resolve_operand(left, bars, indicators, bar_index)?;
            let r = resolve_operand(right, bars, indicators, bar_index)?;
            Some(compare(*op, l, r))
        }
        Rule::BinaryLogic { op, left, right } => {
            let l = evaluate_defined(left, bars, indicators, bar_index)?;
            let r = evaluate_defined(right, bars, indicators, bar_index)?;
            Some(match op {
                LogicOp::And => l && r,
                LogicOp::Or => l || r,
            })
        }
    }
}

fn compare(op: CompareOp, left: f64, right: f64) -> bool {
    match op {
        CompareOp::Gt => left > right,
        CompareOp::Lt => left < right,
        CompareOp::Gte => left >= right,
        CompareOp::Lte => left <= right,
        CompareOp::Eq => (left - right).abs() < EPSILON,
        CompareOp::Neq => (left - right).abs() >= EPSILON,
    }
}

fn resolve_operand(
    operand: &Operand,
    bars: &[OhlcvBar],
    indicators: &HashMap<IndicatorCall, IndicatorSeries>,
    bar_index: usize,
) -> Option<f64> {
    match operand {
        Operand::Value(v) => Some(*v),
        Operand::Series(field) => bars.get(bar_index).map(|bar| bar.field(*field)),
        Operand::Indicator(call) => indicators.get(call)?.value_at(bar_index),
    }
}
