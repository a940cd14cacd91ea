//! Time-gated signal classification.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::StrategyConfig;
use crate::types::{
    CandleSequence, MarketData, MarketStructure, Phase, SignalData, SignalType, Zone, NO_LABEL,
};

use super::{default_strategies, SignalWindow, Strategy, StrategyContext, StrategyMatch};

/// Evaluates the strategy rules for one frame and assembles [`SignalData`].
///
/// Stateless across cycles: the output depends only on the frame's features
/// and the instant passed in.
pub struct SignalClassifier {
    config: StrategyConfig,
    window: SignalWindow,
    strategies: Vec<Box<dyn Strategy>>,
}

impl SignalClassifier {
    pub fn new(config: StrategyConfig) -> Self {
        let window = SignalWindow::new(config.window_start_second, config.window_end_second);
        Self {
            config,
            window,
            strategies: default_strategies(),
        }
    }

    /// Run the rules in priority order, ignoring the time gate.
    pub fn evaluate(
        &self,
        sequence: &CandleSequence,
        structure: &MarketStructure,
    ) -> Option<(&str, StrategyMatch)> {
        if sequence.len() < self.config.min_candles || structure.phase == Phase::Exhaustion {
            return None;
        }

        let [prev2, prev1, current] = sequence.tail(3)? else {
            return None;
        };
        let ctx = StrategyContext {
            prev2,
            prev1,
            current,
            structure,
            config: &self.config,
        };

        self.strategies
            .iter()
            .find_map(|s| s.evaluate(&ctx).map(|m| (s.id(), m)))
    }

    /// Classify a frame at `now`. Outside the signal window the result is
    /// always NEUTRAL with zero confidence, while pressure and phase stay live.
    pub fn classify(
        &self,
        sequence: &CandleSequence,
        structure: &MarketStructure,
        now: DateTime<Utc>,
    ) -> SignalData {
        let in_window = self.window.contains(now);
        let matched = self.evaluate(sequence, structure);

        if let Some((rule, m)) = &matched {
            if in_window {
                debug!("{} rule fired: {:?} {}%", rule, m.signal_type, m.confidence);
            } else {
                debug!("{} rule fired outside signal window, suppressed", rule);
            }
        }

        let matched = matched.filter(|_| in_window).map(|(_, m)| m);
        let breakout = match (structure.band, sequence.last()) {
            (Some(band), Some(last)) => band.position(last.close_y()).label().to_string(),
            _ => NO_LABEL.to_string(),
        };

        let (signal_type, confidence, method, reasons) = match matched {
            Some(m) => (m.signal_type, m.confidence, m.method, m.reasons),
            None => (SignalType::Neutral, 0, NO_LABEL.to_string(), Vec::new()),
        };

        SignalData {
            signal_type,
            confidence,
            reasons,
            timestamp: now.timestamp_millis(),
            method,
            market_data: MarketData {
                pressure_score: round_half_up(structure.pressure_score),
                phase: structure.phase,
                math_prediction: signal_type,
                math_score: confidence,
                breakout,
                zone: Zone::from_pressure(structure.pressure_score),
            },
        }
    }
}

/// Round to the nearest integer, halves toward positive infinity.
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Band, Candle, ColorClass, ShapeHint, StructureLevel};
    use chrono::TimeZone;

    fn at(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, second).unwrap()
    }

    fn reversal_setup() -> (CandleSequence, MarketStructure) {
        let sequence = CandleSequence::new(vec![
            Candle::new(10, 150, 6, 50, ColorClass::Bearish),
            Candle::new(20, 200, 6, 40, ColorClass::Bullish).with_shape(ShapeHint::HammerLike),
            Candle::new(30, 170, 6, 30, ColorClass::Bullish),
        ]);
        let structure = MarketStructure {
            pressure_score: 12.4,
            phase: Phase::Consolidation,
            ..MarketStructure::default()
        };
        (sequence, structure)
    }

    #[test]
    fn test_signal_inside_window() {
        let classifier = SignalClassifier::new(StrategyConfig::default());
        let (sequence, structure) = reversal_setup();
        let signal = classifier.classify(&sequence, &structure, at(52));

        assert_eq!(signal.signal_type, SignalType::Call);
        assert_eq!(signal.confidence, 90);
        assert_eq!(signal.market_data.math_prediction, SignalType::Call);
        assert_eq!(signal.market_data.math_score, 90);
        assert_eq!(signal.market_data.pressure_score, 12);
        assert_eq!(signal.market_data.zone, Zone::Buy);
        assert_eq!(signal.timestamp, at(52).timestamp_millis());
    }

    #[test]
    fn test_outside_window_is_neutral() {
        let classifier = SignalClassifier::new(StrategyConfig::default());
        let (sequence, structure) = reversal_setup();

        for second in [0, 15, 30, 49] {
            let signal = classifier.classify(&sequence, &structure, at(second));
            assert_eq!(signal.signal_type, SignalType::Neutral);
            assert_eq!(signal.confidence, 0);
            assert!(signal.reasons.is_empty());
            assert_eq!(signal.method, NO_LABEL);
            // Structure still reported
            assert_eq!(signal.market_data.phase, Phase::Consolidation);
            assert_eq!(signal.market_data.pressure_score, 12);
        }
    }

    #[test]
    fn test_insufficient_candles_neutral() {
        let classifier = SignalClassifier::new(StrategyConfig::default());
        let sequence = CandleSequence::new(vec![
            Candle::new(10, 150, 6, 50, ColorClass::Bearish),
            Candle::new(30, 100, 6, 30, ColorClass::Bullish),
        ]);
        let signal = classifier.classify(&sequence, &MarketStructure::default(), at(55));
        assert_eq!(signal.signal_type, SignalType::Neutral);
        assert_eq!(signal.market_data.zone, Zone::Sell);
    }

    #[test]
    fn test_exhaustion_blocks_signal() {
        let classifier = SignalClassifier::new(StrategyConfig::default());
        let (sequence, mut structure) = reversal_setup();
        structure.phase = Phase::Exhaustion;
        let signal = classifier.classify(&sequence, &structure, at(55));
        assert_eq!(signal.signal_type, SignalType::Neutral);
        assert_eq!(signal.market_data.phase, Phase::Exhaustion);
    }

    #[test]
    fn test_reversal_takes_priority_over_flow() {
        let classifier = SignalClassifier::new(StrategyConfig::default());
        // Satisfies both the reversal rule and the bullish flow rule
        let sequence = CandleSequence::new(vec![
            Candle::new(10, 150, 6, 30, ColorClass::Bearish),
            Candle::new(20, 200, 6, 30, ColorClass::Bullish),
            Candle::new(30, 160, 6, 40, ColorClass::Bullish),
        ]);
        let structure = MarketStructure {
            pressure_score: 40.0,
            phase: Phase::BullishExpansion,
            support: vec![StructureLevel { y: 290.0, touches: 2 }],
            ..MarketStructure::default()
        };
        let (rule, m) = classifier.evaluate(&sequence, &structure).unwrap();
        assert_eq!(rule, "reversal");
        assert_eq!(m.confidence, 90);
    }

    #[test]
    fn test_pressure_halves_round_up() {
        let classifier = SignalClassifier::new(StrategyConfig::default());
        let (sequence, mut structure) = reversal_setup();

        for (pressure, expected) in [(-2.5, -2), (2.5, 3), (-2.6, -3), (-0.4, 0), (99.5, 100)] {
            structure.pressure_score = pressure;
            let signal = classifier.classify(&sequence, &structure, at(10));
            assert_eq!(signal.market_data.pressure_score, expected, "pressure {}", pressure);
        }
    }

    #[test]
    fn test_breakout_label_from_band() {
        let classifier = SignalClassifier::new(StrategyConfig::default());
        let (sequence, mut structure) = reversal_setup();
        assert_eq!(
            classifier.classify(&sequence, &structure, at(10)).market_data.breakout,
            NO_LABEL
        );

        structure.band = Some(Band {
            center: 200.0,
            upper: 190.0,
            lower: 210.0,
        });
        // Last close is its top, y=170: above the band
        assert_eq!(
            classifier.classify(&sequence, &structure, at(10)).market_data.breakout,
            "ACIMA DA BANDA"
        );
    }
}
