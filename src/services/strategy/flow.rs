//! Trend-following flow signal.

use crate::types::{ColorClass, Phase, SignalType};

use super::{Strategy, StrategyContext, StrategyMatch};

/// Latest height over the trailing two-candle mean for a force candle.
const FORCE_RATIO: f64 = 1.3;
/// Latest height over the trailing two-candle mean for a continuation candle.
const CONTINUATION_RATIO: f64 = 0.9;
const FLOW_CONFIDENCE: u8 = 100;

/// Fires when the phase, the one-back candle and the latest candle all agree on
/// a direction, the latest candle is at least continuation-sized and shows no
/// rejection wick.
pub struct FlowStrategy;

impl Strategy for FlowStrategy {
    fn id(&self) -> &str {
        "flow"
    }

    fn evaluate(&self, ctx: &StrategyContext<'_>) -> Option<StrategyMatch> {
        let StrategyContext {
            prev2,
            prev1,
            current,
            structure,
            ..
        } = *ctx;
        let direction = current.color;

        let expected_phase = match direction {
            ColorClass::Bullish => Phase::BullishExpansion,
            ColorClass::Bearish => Phase::BearishExpansion,
        };
        if structure.phase != expected_phase || prev1.color != direction {
            return None;
        }

        let avg_height = (prev1.height as f64 + prev2.height as f64) / 2.0;
        let height = current.height as f64;
        let is_force = height >= avg_height * FORCE_RATIO;
        let is_continuation = height >= avg_height * CONTINUATION_RATIO;

        // A wick pointing against the move means rejection
        let no_rejection = current.shape != direction.opposite().reversal_shape();

        if !(is_force || is_continuation) || !no_rejection {
            return None;
        }

        let (signal_type, force_reason, continuation_reason) = match direction {
            ColorClass::Bullish => (SignalType::Call, "FORÇA COMPRADORA", "CONTINUAÇÃO DE ALTA"),
            ColorClass::Bearish => (SignalType::Put, "FORÇA VENDEDORA", "CONTINUAÇÃO DE BAIXA"),
        };

        let lead_reason = if is_force { force_reason } else { continuation_reason };

        Some(StrategyMatch {
            signal_type,
            confidence: FLOW_CONFIDENCE,
            method: if is_force {
                "VELA DE FORÇA (100%)".to_string()
            } else {
                "CONTINUAÇÃO (100%)".to_string()
            },
            reasons: vec![
                lead_reason.to_string(),
                "SEM REJEIÇÃO".to_string(),
                "FLUXO CONFIRMADO".to_string(),
            ],
        })
    }
}
