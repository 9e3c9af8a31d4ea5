//! Simple Moving Average.
//!
//! SMA(field, n)[i] = sum(field[i-j] for j in 0..n) / n, kept as a running
//! window sum so each bar costs O(1).
//! Warmup: first (n-1) bars are invalid. A period of zero yields no valid bars.

use crate::domain::indicator::{IndicatorKind, IndicatorPoint, IndicatorSeries};
use crate::domain::ohlcv::{OhlcvBar, PriceField};
use crate::domain::rule::IndicatorCall;

pub fn calculate_sma(bars: &[OhlcvBar], field: PriceField, period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let mut window_sum: f64 = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        window_sum += bar.field(field);
        if i >= period {
            window_sum -= bars[i - period].field(field);
        }

        let valid = period > 0 && i + 1 >= period;
        let value = if valid {
            window_sum / period as f64
        } else {
            0.0
        };

        values.push(IndicatorPoint {
            date: bar.date,
            valid,
            value,
        });
    }

    IndicatorSeries {
        call: IndicatorCall {
            kind: IndicatorKind::Sma,
            field,
            period,
        },
        values,
    }
}
