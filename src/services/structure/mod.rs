//! Market structure analysis.
//!
//! Derives pressure, phase, support/resistance levels and the moving band from
//! one frame's candle sequence.

pub mod band;
pub mod levels;
pub mod phase;
pub mod pressure;

pub use band::MovingBand;
pub use levels::{cluster_levels, detect_levels};
pub use phase::{classify_phase, phase_from_pressure};
pub use pressure::pressure_score;

use crate::config::StructureConfig;
use crate::types::{CandleSequence, MarketStructure};

/// Computes [`MarketStructure`] for a candle sequence.
pub struct StructureAnalyzer {
    config: StructureConfig,
    band: MovingBand,
    /// Below this many candles the phase stays neutral.
    min_candles: usize,
}

impl StructureAnalyzer {
    pub fn new(config: StructureConfig) -> Self {
        let band = MovingBand::new(config.band_period, config.band_deviation);
        Self {
            config,
            band,
            min_candles: 3,
        }
    }

    /// Match the classifier's minimum candle count.
    pub fn with_min_candles(mut self, min_candles: usize) -> Self {
        self.min_candles = min_candles;
        self
    }

    pub fn analyze(&self, sequence: &CandleSequence) -> MarketStructure {
        let candles = sequence.as_slice();
        let pressure = pressure_score(candles);
        let phase = classify_phase(
            candles,
            pressure,
            self.min_candles,
            self.config.exhaustion_multiplier,
            self.config.exhaustion_run,
        );
        let (resistance, support) = detect_levels(
            candles,
            self.config.level_tolerance_px,
            self.config.min_level_touches,
        );

        MarketStructure {
            pressure_score: pressure,
            phase,
            resistance,
            support,
            band: self.band.calculate(candles),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Candle, ColorClass, Phase};

    #[test]
    fn test_analyze_empty_sequence() {
        let analyzer = StructureAnalyzer::new(StructureConfig::default());
        let result = analyzer.analyze(&CandleSequence::default());
        assert_eq!(result.pressure_score, 0.0);
        assert_eq!(result.phase, Phase::Neutral);
        assert!(result.support.is_empty());
        assert!(result.resistance.is_empty());
        assert!(result.band.is_none());
    }

    #[test]
    fn test_analyze_two_candles_phase_neutral() {
        let sequence = CandleSequence::new(vec![
            Candle::new(0, 100, 6, 20, ColorClass::Bullish),
            Candle::new(10, 90, 6, 20, ColorClass::Bullish),
        ]);

        let result = StructureAnalyzer::new(StructureConfig::default()).analyze(&sequence);
        assert_eq!(result.phase, Phase::Neutral);
        assert_eq!(result.pressure_score, 100.0);

        let result = StructureAnalyzer::new(StructureConfig::default())
            .with_min_candles(2)
            .analyze(&sequence);
        assert_eq!(result.phase, Phase::BullishExpansion);
    }

    #[test]
    fn test_analyze_band_appears_at_period() {
        let analyzer = StructureAnalyzer::new(StructureConfig::default());
        let colors = [ColorClass::Bullish, ColorClass::Bearish];
        let make = |n: u32| {
            CandleSequence::new(
                (0..n)
                    .map(|i| Candle::new(i * 10, 100 + i, 6, 20, colors[i as usize % 2]))
                    .collect(),
            )
        };

        assert!(analyzer.analyze(&make(8)).band.is_none());
        assert!(analyzer.analyze(&make(9)).band.is_some());
        assert!(analyzer.analyze(&make(12)).band.is_some());
    }
}
