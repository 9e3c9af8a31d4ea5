//! Open position and closed trade records.

use chrono::NaiveDate;
use serde::Serialize;

/// A single long position held by the backtest engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
}

impl Position {
    /// Fractional return of closing this position at `exit_price`.
    pub fn return_at(&self, exit_price: f64) -> f64 {
        exit_price / self.entry_price - 1.0
    }

    pub fn close(self, exit_date: NaiveDate, exit_price: f64) -> Trade {
        Trade {
            entry_date: self.entry_date,
            entry_price: self.entry_price,
            exit_date,
            exit_price,
            return_pct: self.return_at(exit_price),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    /// Fractional return, e.g. `-0.18` for an 18% loss.
    #[serde(rename = "return")]
    pub return_pct: f64,
}
