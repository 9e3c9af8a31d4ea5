//! Report output port trait.

use crate::domain::backtest::BacktestReport;
use crate::domain::error::PhraseTraderError;
use crate::domain::strategy::Strategy;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        report: &BacktestReport,
        strategy: &Strategy,
        output_path: &str,
    ) -> Result<(), PhraseTraderError>;
}
