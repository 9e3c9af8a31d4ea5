//! Trade statistics derived from a closed-trade log.

use super::position::Trade;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeStats {
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub win_rate: f64,
    pub avg_return: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub best_return: f64,
    pub worst_return: f64,
    /// Mean calendar days between entry and exit.
    pub avg_holding_days: f64,
}

impl TradeStats {
    pub fn compute(trades: &[Trade]) -> Self {
        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut total_return = 0.0_f64;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut best_return = f64::NEG_INFINITY;
        let mut worst_return = f64::INFINITY;
        let mut total_days = 0i64;

        for trade in trades {
            let r = trade.return_pct;
            if r > 0.0 {
                trades_won += 1;
                total_wins += r;
            } else if r < 0.0 {
                trades_lost += 1;
                total_losses += r;
            } else {
                trades_breakeven += 1;
            }
            total_return += r;
            best_return = best_return.max(r);
            worst_return = worst_return.min(r);
            total_days += (trade.exit_date - trade.entry_date).num_days();
        }

        let count = trades.len();
        if count == 0 {
            return TradeStats {
                trades_won,
                trades_lost,
                trades_breakeven,
                win_rate: 0.0,
                avg_return: 0.0,
                avg_win: 0.0,
                avg_loss: 0.0,
                best_return: 0.0,
                worst_return: 0.0,
                avg_holding_days: 0.0,
            };
        }

        TradeStats {
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate: trades_won as f64 / count as f64,
            avg_return: total_return / count as f64,
            avg_win: mean(total_wins, trades_won),
            avg_loss: mean(total_losses, trades_lost),
            best_return,
            worst_return,
            avg_holding_days: total_days as f64 / count as f64,
        }
    }
}

fn mean(total: f64, n: usize) -> f64 {
    if n > 0 { total / n as f64 } else { 0.0 }
}
