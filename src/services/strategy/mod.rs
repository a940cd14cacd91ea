//! Signal strategies.
//!
//! Rule families evaluated over the three most recent candles plus the frame's
//! market structure, and the classifier that gates them by time.

pub mod classifier;
pub mod flow;
pub mod reversal;
pub mod window;

pub use classifier::SignalClassifier;
pub use flow::FlowStrategy;
pub use reversal::ReversalStrategy;
pub use window::{seconds_to_next_minute, SignalWindow};

use crate::config::StrategyConfig;
use crate::types::{Candle, MarketStructure, SignalType};

/// Inputs a rule sees for one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct StrategyContext<'a> {
    /// Two candles back.
    pub prev2: &'a Candle,
    /// One candle back.
    pub prev1: &'a Candle,
    /// Most recent candle.
    pub current: &'a Candle,
    pub structure: &'a MarketStructure,
    pub config: &'a StrategyConfig,
}

/// A rule firing.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyMatch {
    pub signal_type: SignalType,
    pub confidence: u8,
    pub method: String,
    pub reasons: Vec<String>,
}

/// Trait for implementing signal rules.
pub trait Strategy: Send + Sync {
    /// Unique identifier for this rule.
    fn id(&self) -> &str;

    /// Evaluate the rule. Returns None if it does not fire.
    fn evaluate(&self, ctx: &StrategyContext<'_>) -> Option<StrategyMatch>;
}

/// Rules in priority order: reversal first, flow only if no reversal fired.
pub fn default_strategies() -> Vec<Box<dyn Strategy>> {
    vec![Box::new(ReversalStrategy), Box::new(FlowStrategy)]
}
