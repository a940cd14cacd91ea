//! Market phase classification.

use crate::types::{Candle, Phase};

/// Pressure magnitude above which one side is said to dominate.
pub const EXPANSION_THRESHOLD: f64 = 30.0;

/// How many preceding candles form the baseline for a size spike.
const SPIKE_LOOKBACK: usize = 5;

/// Phase implied by pressure alone.
pub fn phase_from_pressure(pressure_score: f64) -> Phase {
    if pressure_score > EXPANSION_THRESHOLD {
        Phase::BullishExpansion
    } else if pressure_score < -EXPANSION_THRESHOLD {
        Phase::BearishExpansion
    } else {
        Phase::Consolidation
    }
}

/// Whether the latest candle is a size spike against its recent predecessors.
pub fn is_size_spike(candles: &[Candle], multiplier: f64) -> bool {
    let Some((latest, previous)) = candles.split_last() else {
        return false;
    };
    if previous.is_empty() {
        return false;
    }

    let baseline = &previous[previous.len().saturating_sub(SPIKE_LOOKBACK)..];
    let avg = baseline.iter().map(|c| c.height as f64).sum::<f64>() / baseline.len() as f64;
    avg > 0.0 && latest.height as f64 > avg * multiplier
}

/// Length of the same-color run ending at the latest candle.
pub fn trailing_run(candles: &[Candle]) -> usize {
    let Some(last) = candles.last() else {
        return 0;
    };
    candles
        .iter()
        .rev()
        .take_while(|c| c.color == last.color)
        .count()
}

/// Whether the move is overextended: a size spike or a long one-color run.
pub fn is_exhausted(candles: &[Candle], multiplier: f64, max_run: usize) -> bool {
    is_size_spike(candles, multiplier) || trailing_run(candles) >= max_run
}

/// Classify the phase, letting exhaustion override pressure.
///
/// Neutral until `min_candles` candles are visible.
pub fn classify_phase(
    candles: &[Candle],
    pressure_score: f64,
    min_candles: usize,
    exhaustion_multiplier: f64,
    exhaustion_run: usize,
) -> Phase {
    if candles.is_empty() || candles.len() < min_candles {
        return Phase::Neutral;
    }
    if is_exhausted(candles, exhaustion_multiplier, exhaustion_run) {
        return Phase::Exhaustion;
    }
    phase_from_pressure(pressure_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColorClass;

    fn c(color: ColorClass, height: u32) -> Candle {
        Candle::new(0, 0, 6, height, color)
    }

    #[test]
    fn test_phase_from_pressure_thresholds() {
        assert_eq!(phase_from_pressure(0.0), Phase::Consolidation);
        assert_eq!(phase_from_pressure(30.0), Phase::Consolidation);
        assert_eq!(phase_from_pressure(-30.0), Phase::Consolidation);
        assert_eq!(phase_from_pressure(30.1), Phase::BullishExpansion);
        assert_eq!(phase_from_pressure(-75.0), Phase::BearishExpansion);
    }

    #[test]
    fn test_phase_is_deterministic() {
        let candles = vec![
            c(ColorClass::Bullish, 20),
            c(ColorClass::Bearish, 22),
            c(ColorClass::Bullish, 21),
        ];
        for p in [-100.0, -31.0, 0.0, 12.5, 31.0, 100.0] {
            assert_eq!(
                classify_phase(&candles, p, 3, 3.0, 5),
                classify_phase(&candles, p, 3, 3.0, 5)
            );
            assert_eq!(classify_phase(&candles, p, 3, 3.0, 5), phase_from_pressure(p));
        }
    }

    #[test]
    fn test_size_spike_overrides_pressure() {
        let candles = vec![
            c(ColorClass::Bearish, 20),
            c(ColorClass::Bullish, 20),
            c(ColorClass::Bearish, 20),
            c(ColorClass::Bullish, 80),
        ];
        assert!(is_size_spike(&candles, 3.0));
        assert_eq!(classify_phase(&candles, 60.0, 3, 3.0, 5), Phase::Exhaustion);
    }

    #[test]
    fn test_spike_needs_predecessor() {
        assert!(!is_size_spike(&[c(ColorClass::Bullish, 200)], 3.0));
    }

    #[test]
    fn test_long_run_is_exhaustion() {
        let mut candles = vec![c(ColorClass::Bearish, 20)];
        candles.extend((0..5).map(|_| c(ColorClass::Bullish, 20)));
        assert_eq!(trailing_run(&candles), 5);
        assert_eq!(classify_phase(&candles, 90.0, 3, 3.0, 5), Phase::Exhaustion);

        candles.pop();
        assert_eq!(trailing_run(&candles), 4);
        assert_eq!(classify_phase(&candles, 90.0, 3, 3.0, 5), Phase::BullishExpansion);
    }

    #[test]
    fn test_empty_is_neutral() {
        assert_eq!(classify_phase(&[], 0.0, 3, 3.0, 5), Phase::Neutral);
    }

    #[test]
    fn test_too_few_candles_is_neutral() {
        let one = vec![c(ColorClass::Bullish, 20)];
        let two = vec![c(ColorClass::Bearish, 20), c(ColorClass::Bearish, 25)];
        assert_eq!(classify_phase(&one, 100.0, 3, 3.0, 5), Phase::Neutral);
        assert_eq!(classify_phase(&two, -100.0, 3, 3.0, 5), Phase::Neutral);
        assert_eq!(classify_phase(&two, -100.0, 2, 3.0, 5), Phase::BearishExpansion);
    }
}
