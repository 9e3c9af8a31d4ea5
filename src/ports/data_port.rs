//! Price data access port trait.

use crate::domain::error::PhraseTraderError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// Load the bars identified by `source`, in source order.
    ///
    /// Ordering and value checks belong to the caller
    /// ([`validate_series`](crate::domain::ohlcv::validate_series)).
    fn fetch_ohlcv(&self, source: &str) -> Result<Vec<OhlcvBar>, PhraseTraderError>;
}
