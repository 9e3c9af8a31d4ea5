//! Plain-text report for the terminal.

use crate::domain::backtest::BacktestReport;
use crate::domain::metrics::TradeStats;

fn pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

pub fn render_report(report: &BacktestReport, stats: &TradeStats, show_trades: bool) -> String {
    let mut out = String::new();

    out.push_str("=== Backtest Results ===\n");
    out.push_str(&format!("Total Return:     {}\n", pct(report.total_return)));
    out.push_str(&format!("Max Drawdown:     {}\n", pct(report.max_drawdown)));
    out.push_str(&format!("Total Trades:     {}\n", report.trade_count));
    if report.trade_count > 0 {
        out.push_str(&format!("Win Rate:         {}\n", pct(stats.win_rate)));
        out.push_str(&format!("Average Return:   {}\n", pct(stats.avg_return)));
        out.push_str(&format!("Best Trade:       {}\n", pct(stats.best_return)));
        out.push_str(&format!("Worst Trade:      {}\n", pct(stats.worst_return)));
        out.push_str(&format!("Avg Holding:      {:.1} days\n", stats.avg_holding_days));
    }

    if let Some(open) = &report.open_position {
        out.push_str(&format!(
            "Open Position:    entered {} at {:.2} (not included above)\n",
            open.entry_date, open.entry_price
        ));
    }

    if show_trades && !report.trades.is_empty() {
        out.push_str("\n=== Trade Log ===\n");
        out.push_str(&format!(
            "{:<12} {:>10} {:<12} {:>10} {:>9}\n",
            "Entry", "Price", "Exit", "Price", "Return"
        ));
        for trade in &report.trades {
            out.push_str(&format!(
                "{:<12} {:>10.2} {:<12} {:>10.2} {:>9}\n",
                trade.entry_date.to_string(),
                trade.entry_price,
                trade.exit_date.to_string(),
                trade.exit_price,
                pct(trade.return_pct)
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::{Position, Trade};
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    fn scenario_report() -> BacktestReport {
        let trade = Trade {
            entry_date: date(2),
            entry_price: 11.0,
            exit_date: date(4),
            exit_price: 9.0,
            return_pct: 9.0 / 11.0 - 1.0,
        };
        BacktestReport {
            total_return: trade.return_pct,
            max_drawdown: -trade.return_pct,
            trade_count: 1,
            trades: vec![trade],
            equity_curve: vec![1.0, 1.0, 1.0, 1.0, 9.0 / 11.0, 9.0 / 11.0],
            open_position: Some(Position {
                entry_date: date(5),
                entry_price: 13.0,
            }),
        }
    }

    #[test]
    fn percentages_have_two_decimals() {
        let report = scenario_report();
        let text = render_report(&report, &TradeStats::compute(&report.trades), false);
        assert!(text.contains("Total Return:     -18.18%"));
        assert!(text.contains("Max Drawdown:     18.18%"));
        assert!(text.contains("Total Trades:     1"));
        assert!(!text.contains("Trade Log"));
    }

    #[test]
    fn trade_log_listed_when_requested() {
        let report = scenario_report();
        let text = render_report(&report, &TradeStats::compute(&report.trades), true);
        assert!(text.contains("=== Trade Log ==="));
        assert!(text.contains("2023-01-02"));
        assert!(text.contains("-18.18%"));
    }

    #[test]
    fn open_position_is_flagged() {
        let report = scenario_report();
        let text = render_report(&report, &TradeStats::compute(&report.trades), false);
        assert!(text.contains("Open Position:    entered 2023-01-05 at 13.00"));
    }

    #[test]
    fn report_lines_are_laid_out_in_order() {
        let report = scenario_report();
        let text = render_report(&report, &TradeStats::compute(&report.trades), true);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "=== Backtest Results ===");
        assert_eq!(lines[1], "Total Return:     -18.18%");
        assert_eq!(lines[2], "Max Drawdown:     18.18%");
        assert_eq!(lines[3], "Total Trades:     1");
        assert_eq!(lines[4], "Win Rate:         0.00%");
        assert_eq!(
            lines.last().copied(),
            Some("2023-01-02        11.00 2023-01-04         9.00   -18.18%")
        );
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn no_trades_skips_trade_stats() {
        let report = BacktestReport {
            total_return: 0.0,
            max_drawdown: 0.0,
            trade_count: 0,
            trades: vec![],
            equity_curve: vec![1.0],
            open_position: None,
        };
        let text = render_report(&report, &TradeStats::compute(&[]), true);
        assert!(text.contains("Total Return:     0.00%"));
        assert!(!text.contains("Win Rate"));
    }
}
