//! JSON report adapter implementing ReportPort.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::domain::backtest::BacktestReport;
use crate::domain::error::PhraseTraderError;
use crate::domain::metrics::TradeStats;
use crate::domain::strategy::Strategy;
use crate::ports::report_port::ReportPort;

#[derive(Serialize)]
struct ReportDocument<'a> {
    strategy: String,
    #[serde(flatten)]
    report: &'a BacktestReport,
    stats: TradeStats,
}

pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        report: &BacktestReport,
        strategy: &Strategy,
    ) -> Result<String, PhraseTraderError> {
        let document = ReportDocument {
            strategy: strategy.to_string(),
            report,
            stats: TradeStats::compute(&report.trades),
        };
        serde_json::to_string_pretty(&document)
            .map_err(|e| PhraseTraderError::Io(std::io::Error::other(e)))
    }
}

impl Default for JsonReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        report: &BacktestReport,
        strategy: &Strategy,
        output_path: &str,
    ) -> Result<(), PhraseTraderError> {
        let json = self.render(report, strategy)?;

        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast_builder::compile_dsl;
    use crate::domain::position::Trade;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_report() -> BacktestReport {
        let trade = Trade {
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            entry_price: 11.0,
            exit_date: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
            exit_price: 9.0,
            return_pct: 9.0 / 11.0 - 1.0,
        };
        BacktestReport {
            total_return: trade.return_pct,
            max_drawdown: -trade.return_pct,
            trade_count: 1,
            trades: vec![trade],
            equity_curve: vec![1.0, 1.0, 1.0, 1.0, 9.0 / 11.0, 9.0 / 11.0],
            open_position: None,
        }
    }

    fn sample_strategy() -> Strategy {
        compile_dsl("ENTRY: CLOSE > SMA(CLOSE, 2) EXIT: CLOSE < SMA(CLOSE, 2)").unwrap()
    }

    #[test]
    fn write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/nested/report.json");
        JsonReportAdapter::new()
            .write(&sample_report(), &sample_strategy(), path.to_str().unwrap())
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn document_contains_strategy_and_report_fields() {
        let json = JsonReportAdapter::new()
            .render(&sample_report(), &sample_strategy())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value["strategy"],
            "ENTRY: CLOSE > SMA(CLOSE, 2) EXIT: CLOSE < SMA(CLOSE, 2)"
        );
        assert_eq!(value["trade_count"], 1);
        assert_eq!(value["trades"][0]["exit_date"], "2024-01-04");
        assert_eq!(value["stats"]["trades_lost"], 1);
        assert_eq!(value["equity_curve"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn render_is_deterministic() {
        let adapter = JsonReportAdapter::new();
        let a = adapter.render(&sample_report(), &sample_strategy()).unwrap();
        let b = adapter.render(&sample_report(), &sample_strategy()).unwrap();
        assert_eq!(a, b);
    }
}
