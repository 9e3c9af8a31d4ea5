//! Indicator registry and indicator series types.
//!
//! - `IndicatorKind`: the registry of implemented indicators, looked up by name
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorSeries`: A time series of indicator values aligned to the bars
//!
//! Adding an indicator means adding a variant, its name in `from_name`/`name`,
//! and a calculation module dispatched from `compute`.

pub mod sma;

use crate::domain::ohlcv::{OhlcvBar, PriceField};
use crate::domain::rule::IndicatorCall;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Sma,
}

impl IndicatorKind {
    /// Registry lookup. Names are matched case-insensitively; anything not
    /// implemented here (including `RSI`) is unknown.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "SMA" => Some(IndicatorKind::Sma),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IndicatorKind::Sma => "SMA",
        }
    }

    pub fn compute(&self, bars: &[OhlcvBar], field: PriceField, period: usize) -> IndicatorSeries {
        match self {
            IndicatorKind::Sma => sma::calculate_sma(bars, field, period),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub call: IndicatorCall,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// The value at `index`, or `None` during warm-up or past the end.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|point| point.valid)
            .map(|point| point.value)
    }
}

/// Compute each distinct indicator call once over the whole series.
pub fn compute_indicators(
    calls: &[IndicatorCall],
    bars: &[OhlcvBar],
) -> HashMap<IndicatorCall, IndicatorSeries> {
    calls
        .iter()
        .map(|call| (*call, call.kind.compute(bars, call.field, call.period)))
        .collect()
}
