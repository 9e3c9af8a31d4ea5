//! End-to-end compile and run.
//!
//! Ties the stages together: text → [`normalize`] → DSL → [`compile_dsl`] →
//! [`compile`] → signals → [`run_backtest`]. Every stage is a pure function
//! of its input, so independent runs can proceed in parallel.

use crate::domain::ast_builder::compile_dsl;
use crate::domain::backtest::{run_backtest, BacktestReport};
use crate::domain::error::PhraseTraderError;
use crate::domain::normalizer::{normalize, NormalizedRules};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::rule_eval::{compile, CompiledStrategy};
use std::thread;
use tracing::{debug, warn};

/// A natural-language rule carried through every compile stage.
#[derive(Debug, Clone)]
pub struct CompiledText {
    pub normalized: NormalizedRules,
    pub dsl: String,
    pub compiled: CompiledStrategy,
}

pub fn compile_text(text: &str) -> Result<CompiledText, PhraseTraderError> {
    let normalized = normalize(text);
    if normalized.exit_synthesized {
        warn!("no exit clause found; positions will never be closed");
    }
    let dsl = normalized.to_dsl();
    debug!(%dsl, "normalized");
    let compiled = compile_dsl_text(&dsl)?;
    Ok(CompiledText {
        normalized,
        dsl,
        compiled,
    })
}

/// Compile DSL text directly, skipping the normalizer.
pub fn compile_dsl_text(dsl: &str) -> Result<CompiledStrategy, PhraseTraderError> {
    let strategy = compile_dsl(dsl)?;
    debug!(ast = ?strategy, "built rule tree");
    compile(&strategy)
}

pub fn backtest_compiled(
    compiled: &CompiledStrategy,
    bars: &[OhlcvBar],
) -> Result<BacktestReport, PhraseTraderError> {
    let signals = compiled.evaluate(bars);
    run_backtest(bars, &signals)
}

pub fn backtest_text(text: &str, bars: &[OhlcvBar]) -> Result<BacktestReport, PhraseTraderError> {
    let compiled = compile_text(text)?;
    backtest_compiled(&compiled.compiled, bars)
}

pub fn backtest_dsl(dsl: &str, bars: &[OhlcvBar]) -> Result<BacktestReport, PhraseTraderError> {
    let compiled = compile_dsl_text(dsl)?;
    backtest_compiled(&compiled, bars)
}

/// Run each strategy against `bars` on its own scoped thread.
///
/// Results come back in the order of `strategies`.
pub fn backtest_many(
    strategies: &[CompiledStrategy],
    bars: &[OhlcvBar],
) -> Vec<Result<BacktestReport, PhraseTraderError>> {
    thread::scope(|scope| {
        let handles: Vec<_> = strategies
            .iter()
            .map(|compiled| scope.spawn(move || backtest_compiled(compiled, bars)))
            .collect();
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}
