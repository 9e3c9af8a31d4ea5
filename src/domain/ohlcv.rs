//! OHLCV bar representation and price-series validation.

use crate::domain::error::PhraseTraderError;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A column of the price series that a rule can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl PriceField {
    pub const ALL: [PriceField; 5] = [
        PriceField::Open,
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
        PriceField::Volume,
    ];

    /// Case-insensitive lookup of a column name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "OPEN" => Some(PriceField::Open),
            "HIGH" => Some(PriceField::High),
            "LOW" => Some(PriceField::Low),
            "CLOSE" => Some(PriceField::Close),
            "VOLUME" => Some(PriceField::Volume),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceField::Open => "OPEN",
            PriceField::High => "HIGH",
            PriceField::Low => "LOW",
            PriceField::Close => "CLOSE",
            PriceField::Volume => "VOLUME",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl OhlcvBar {
    pub fn field(&self, field: PriceField) -> f64 {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
            PriceField::Volume => self.volume,
        }
    }
}

/// Reject series that would make the simulation produce silently wrong
/// metrics: empty input, dates that do not strictly increase, and negative
/// or non-finite values.
pub fn validate_series(bars: &[OhlcvBar]) -> Result<(), PhraseTraderError> {
    if bars.is_empty() {
        return Err(PhraseTraderError::Data {
            reason: "price series is empty".to_string(),
        });
    }

    for (i, bar) in bars.iter().enumerate() {
        for field in PriceField::ALL {
            let value = bar.field(field);
            if !value.is_finite() || value < 0.0 {
                return Err(PhraseTraderError::Data {
                    reason: format!(
                        "bar {} ({}): {} must be a non-negative number, got {}",
                        i, bar.date, field, value
                    ),
                });
            }
        }
        if i > 0 && bar.date <= bars[i - 1].date {
            return Err(PhraseTraderError::Data {
                reason: format!(
                    "bar {} ({}) is not after previous bar ({})",
                    i,
                    bar.date,
                    bars[i - 1].date
                ),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> OhlcvBar {
        OhlcvBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn field_accessor() {
        let b = OhlcvBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: 50_000.0,
        };
        assert_eq!(b.field(PriceField::Open), 100.0);
        assert_eq!(b.field(PriceField::High), 110.0);
        assert_eq!(b.field(PriceField::Low), 90.0);
        assert_eq!(b.field(PriceField::Close), 105.0);
        assert_eq!(b.field(PriceField::Volume), 50_000.0);
    }

    #[test]
    fn field_names_are_case_insensitive() {
        assert_eq!(PriceField::from_name("close"), Some(PriceField::Close));
        assert_eq!(PriceField::from_name("Volume"), Some(PriceField::Volume));
        assert_eq!(PriceField::from_name("adj_close"), None);
    }

    #[test]
    fn valid_series_passes() {
        assert!(validate_series(&[bar(1, 10.0), bar(2, 11.0), bar(3, 12.0)]).is_ok());
    }

    #[test]
    fn empty_series_rejected() {
        let err = validate_series(&[]).unwrap_err();
        assert!(matches!(err, PhraseTraderError::Data { .. }));
    }

    #[test]
    fn duplicate_date_rejected() {
        let err = validate_series(&[bar(1, 10.0), bar(1, 11.0)]).unwrap_err();
        assert!(matches!(err, PhraseTraderError::Data { reason } if reason.contains("not after")));
    }

    #[test]
    fn descending_dates_rejected() {
        assert!(validate_series(&[bar(2, 10.0), bar(1, 11.0)]).is_err());
    }

    #[test]
    fn negative_value_rejected() {
        let mut b = bar(1, 10.0);
        b.volume = -5.0;
        let err = validate_series(&[b]).unwrap_err();
        assert!(matches!(err, PhraseTraderError::Data { reason } if reason.contains("VOLUME")));
    }

    #[test]
    fn nan_rejected() {
        let mut b = bar(1, 10.0);
        b.close = f64::NAN;
        assert!(validate_series(&[b]).is_err());
    }
}
