#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use phrasetrader::domain::error::PhraseTraderError;
pub use phrasetrader::domain::ohlcv::OhlcvBar;
use phrasetrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, source: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(source.to_string(), bars);
        self
    }

    pub fn with_error(mut self, source: &str, reason: &str) -> Self {
        self.errors.insert(source.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(&self, source: &str) -> Result<Vec<OhlcvBar>, PhraseTraderError> {
        if let Some(reason) = self.errors.get(source) {
            return Err(PhraseTraderError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(source).cloned().unwrap_or_default())
    }
}

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

pub fn make_bar(day: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> OhlcvBar {
    OhlcvBar {
        date: start_date() + Duration::days(day),
        open,
        high,
        low,
        close,
        volume,
    }
}

/// One bar per close on consecutive days, with a flat intraday range.
pub fn closes_to_bars(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i as i64, c, c, c, c, 1_000_000.0))
        .collect()
}

pub fn csv_text(bars: &[OhlcvBar]) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for bar in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume
        ));
    }
    out
}
