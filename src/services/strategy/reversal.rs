//! Reversal with breakout confirmation.

use crate::types::{ColorClass, SignalType};

use super::{Strategy, StrategyContext, StrategyMatch};

const BASE_CONFIDENCE: u8 = 90;
const ZONE_CONFIDENCE: u8 = 95;

/// Fires when the two-back candle is of the opposite color, the one-back
/// candle is a reversal shape or already the new color, and the latest candle
/// breaks the one-back extreme by more than the confirmation threshold.
pub struct ReversalStrategy;

impl Strategy for ReversalStrategy {
    fn id(&self) -> &str {
        "reversal"
    }

    fn evaluate(&self, ctx: &StrategyContext<'_>) -> Option<StrategyMatch> {
        let StrategyContext {
            prev2,
            prev1,
            current,
            structure,
            config,
        } = *ctx;
        let direction = current.color;

        if prev2.color != direction.opposite() {
            return None;
        }
        let reversal_shaped = prev1.shape == direction.reversal_shape();
        if !reversal_shaped && prev1.color != direction {
            return None;
        }

        // Screen y grows downward: a bullish break has a smaller top
        let breakout = match direction {
            ColorClass::Bullish => prev1.top() as f64 - current.top() as f64,
            ColorClass::Bearish => current.bottom() as f64 - prev1.bottom() as f64,
        };
        if breakout <= config.breakout_threshold_px {
            return None;
        }

        let (signal_type, trend, zone_label, hit_zone, shaped_method) = match direction {
            ColorClass::Bullish => (
                SignalType::Call,
                "TENDÊNCIA BAIXA",
                "ZONA SUPORTE",
                structure
                    .support
                    .iter()
                    .any(|l| l.is_near(current.bottom() as f64, config.zone_proximity_px)),
                "HAMMER + BREAKOUT",
            ),
            ColorClass::Bearish => (
                SignalType::Put,
                "TENDÊNCIA ALTA",
                "ZONA RESISTÊNCIA",
                structure
                    .resistance
                    .iter()
                    .any(|l| l.is_near(current.top() as f64, config.zone_proximity_px)),
                "SHOOTING STAR + BREAKOUT",
            ),
        };

        let mut reasons = vec![trend.to_string(), "REVERSÃO CONFIRMADA".to_string()];
        if hit_zone {
            reasons.push(zone_label.to_string());
        }

        Some(StrategyMatch {
            signal_type,
            confidence: if hit_zone { ZONE_CONFIDENCE } else { BASE_CONFIDENCE },
            method: if reversal_shaped {
                shaped_method.to_string()
            } else {
                "REVERSÃO + CONFIRMAÇÃO".to_string()
            },
            reasons,
        })
    }
}
