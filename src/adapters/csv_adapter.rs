//! CSV file data adapter.
//!
//! Expects a header row naming `date, open, high, low, close, volume` in any
//! order and case. Extra columns are ignored.

use crate::domain::error::PhraseTraderError;
use crate::domain::ohlcv::{OhlcvBar, PriceField};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// `source` relative to the base path; absolute paths are used as-is.
    fn csv_path(&self, source: &str) -> PathBuf {
        self.base_path.join(source)
    }
}

impl Default for CsvAdapter {
    fn default() -> Self {
        Self::new(PathBuf::from("."))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(&self, source: &str) -> Result<Vec<OhlcvBar>, PhraseTraderError> {
        let path = self.csv_path(source);
        let content = fs::read_to_string(&path).map_err(|e| {
            PhraseTraderError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read {}: {}", path.display(), e),
            ))
        })?;
        parse_ohlcv_csv(&content)
    }
}

struct Columns {
    date: usize,
    fields: [usize; 5],
}

fn locate_columns(headers: &csv::StringRecord) -> Result<Columns, PhraseTraderError> {
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| data_error(format!("missing {} column", name.to_ascii_lowercase())))
    };
    let date = find("date")?;
    let mut fields = [0usize; 5];
    for (slot, field) in fields.iter_mut().zip(PriceField::ALL) {
        *slot = find(field.as_str())?;
    }
    Ok(Columns { date, fields })
}

/// Parse CSV text into bars, in file order.
pub fn parse_ohlcv_csv(content: &str) -> Result<Vec<OhlcvBar>, PhraseTraderError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| data_error(format!("CSV header error: {}", e)))?
        .clone();
    let columns = locate_columns(&headers)?;

    let mut bars = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| data_error(format!("CSV parse error: {}", e)))?;
        let line = row + 2;

        let date_str = record
            .get(columns.date)
            .ok_or_else(|| data_error(format!("line {}: missing date", line)))?;
        let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).map_err(|e| {
            data_error(format!("line {}: invalid date '{}': {}", line, date_str, e))
        })?;

        let mut values = [0.0_f64; 5];
        for ((value, &index), field) in values.iter_mut().zip(&columns.fields).zip(PriceField::ALL) {
            let raw = record
                .get(index)
                .ok_or_else(|| data_error(format!("line {}: missing {}", line, field)))?;
            *value = raw.parse::<f64>().map_err(|e| {
                data_error(format!("line {}: invalid {} value '{}': {}", line, field, raw, e))
            })?;
        }
        let [open, high, low, close, volume] = values;

        bars.push(OhlcvBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    Ok(bars)
}

fn data_error(reason: String) -> PhraseTraderError {
    PhraseTraderError::Data { reason }
}
