//! Backtest engine.
//!
//! A single long-only position driven by per-bar entry/exit signals. The
//! engine is a two-state machine (flat, in position); fills happen at the
//! bar's close. Equity is realized only when a trade closes and carried
//! forward otherwise, so an open position is never marked to market.

use crate::domain::error::PhraseTraderError;
use crate::domain::ohlcv::{validate_series, OhlcvBar};
use crate::domain::position::{Position, Trade};
use crate::domain::rule_eval::Signals;
use serde::Serialize;
use tracing::{debug, info, warn};

const INITIAL_EQUITY: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    /// `final_equity - 1`.
    pub total_return: f64,
    /// Largest fractional decline from a running equity peak; never negative.
    pub max_drawdown: f64,
    pub trade_count: usize,
    /// Closed trades in chronological order.
    pub trades: Vec<Trade>,
    /// Starts at 1.0, then one value per bar processed.
    pub equity_curve: Vec<f64>,
    /// Position still held after the last bar; excluded from every return figure.
    pub open_position: Option<Position>,
}

impl BacktestReport {
    pub fn final_equity(&self) -> f64 {
        self.equity_curve.last().copied().unwrap_or(INITIAL_EQUITY)
    }
}

/// Simulate `signals` over `bars`.
///
/// The series is validated before the first bar is processed, and the
/// signal vectors must be aligned with it.
pub fn run_backtest(bars: &[OhlcvBar], signals: &Signals) -> Result<BacktestReport, PhraseTraderError> {
    validate_series(bars)?;
    if signals.entry.len() != bars.len() || signals.exit.len() != bars.len() {
        return Err(PhraseTraderError::Data {
            reason: format!(
                "signal length mismatch: {} bars, {} entry, {} exit",
                bars.len(),
                signals.entry.len(),
                signals.exit.len()
            ),
        });
    }

    let mut position: Option<Position> = None;
    let mut trades = Vec::new();
    let mut equity = INITIAL_EQUITY;
    let mut equity_curve = Vec::with_capacity(bars.len() + 1);
    equity_curve.push(equity);
    let mut peak = equity;
    let mut max_drawdown = 0.0_f64;

    for (i, bar) in bars.iter().enumerate() {
        match position.take() {
            None if signals.entry[i] => {
                if bar.close <= 0.0 {
                    return Err(PhraseTraderError::Data {
                        reason: format!("cannot enter at a zero close on {}", bar.date),
                    });
                }
                debug!(date = %bar.date, price = bar.close, "enter");
                position = Some(Position {
                    entry_date: bar.date,
                    entry_price: bar.close,
                });
            }
            Some(open) if signals.exit[i] => {
                let trade = open.close(bar.date, bar.close);
                debug!(date = %bar.date, price = bar.close, ret = trade.return_pct, "exit");
                equity *= 1.0 + trade.return_pct;
                trades.push(trade);
            }
            held => position = held,
        }

        equity_curve.push(equity);
        peak = peak.max(equity);
        max_drawdown = max_drawdown.max((peak - equity) / peak);
    }

    if let Some(open) = &position {
        warn!(
            entry_date = %open.entry_date,
            entry_price = open.entry_price,
            "position still open at end of data; excluded from results"
        );
    }

    let report = BacktestReport {
        total_return: equity - INITIAL_EQUITY,
        max_drawdown,
        trade_count: trades.len(),
        trades,
        equity_curve,
        open_position: position,
    };
    info!(
        bars = bars.len(),
        trades = report.trade_count,
        total_return = report.total_return,
        max_drawdown = report.max_drawdown,
        "backtest complete"
    );
    Ok(report)
}
