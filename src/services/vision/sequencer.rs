//! Merges per-color candle lists into chart order.

use crate::types::{Candle, CandleSequence};

/// Merge bullish and bearish candles and order them left to right.
///
/// The masks are disjoint, so no deduplication is needed.
pub fn sequence(bullish: Vec<Candle>, bearish: Vec<Candle>) -> CandleSequence {
    let mut candles = bullish;
    candles.extend(bearish);
    CandleSequence::new(candles)
}
