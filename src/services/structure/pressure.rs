//! Directional pressure from bullish vs bearish candle area.

use crate::types::{Candle, ColorClass};

/// `(bullArea - bearArea) / (bullArea + bearArea) * 100`, in [-100, 100].
///
/// Returns 0 when there are no candles.
pub fn pressure_score(candles: &[Candle]) -> f64 {
    let (bull, bear) = candles.iter().fold((0u64, 0u64), |(bull, bear), c| match c.color {
        ColorClass::Bullish => (bull + c.area(), bear),
        ColorClass::Bearish => (bull, bear + c.area()),
    });

    let total = bull + bear;
    if total == 0 {
        return 0.0;
    }
    ((bull as f64 - bear as f64) / total as f64 * 100.0).clamp(-100.0, 100.0)
}
