use serde::{Deserialize, Serialize};

use super::Phase;

/// Label used wherever no method or breakout applies.
pub const NO_LABEL: &str = "---";

/// Classified trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalType {
    Call,
    Put,
    #[default]
    Neutral,
}

impl SignalType {
    pub fn label(&self) -> &'static str {
        match self {
            SignalType::Call => "CALL",
            SignalType::Put => "PUT",
            SignalType::Neutral => "NEUTRAL",
        }
    }

    pub fn is_neutral(&self) -> bool {
        *self == SignalType::Neutral
    }
}

/// Which side the overall pressure favours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Zone {
    #[serde(rename = "COMPRA")]
    Buy,
    #[serde(rename = "VENDA")]
    Sell,
    #[default]
    #[serde(rename = "NEUTRO")]
    Neutral,
}

impl Zone {
    /// Positive pressure is the buy side; zero or negative is the sell side.
    pub fn from_pressure(pressure_score: f64) -> Self {
        if pressure_score > 0.0 {
            Zone::Buy
        } else {
            Zone::Sell
        }
    }
}

/// Structure details attached to every signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    /// Rounded pressure score, -100 to +100.
    pub pressure_score: i32,
    pub phase: Phase,
    pub math_prediction: SignalType,
    pub math_score: u8,
    /// Latest close relative to the band.
    pub breakout: String,
    pub zone: Zone,
}

impl Default for MarketData {
    fn default() -> Self {
        Self {
            pressure_score: 0,
            phase: Phase::Neutral,
            math_prediction: SignalType::Neutral,
            math_score: 0,
            breakout: NO_LABEL.to_string(),
            zone: Zone::Neutral,
        }
    }
}

/// The engine's output for one analysis cycle.
///
/// Each cycle produces a fresh value that replaces the previous one; `timestamp`
/// is the change token consumers compare to detect a new signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalData {
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    /// 0 to 100.
    pub confidence: u8,
    pub reasons: Vec<String>,
    /// Unix timestamp (milliseconds) when classified.
    pub timestamp: i64,
    pub method: String,
    pub market_data: MarketData,
}

impl Default for SignalData {
    fn default() -> Self {
        Self {
            signal_type: SignalType::Neutral,
            confidence: 0,
            reasons: Vec::new(),
            timestamp: 0,
            method: NO_LABEL.to_string(),
            market_data: MarketData::default(),
        }
    }
}

/// Per-pass processing statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStats {
    pub fps: u32,
    pub processing_time_ms: u64,
    /// Latest price text recognised from the chart's price axis.
    pub ocr_text: String,
    /// Frames analysed since the processor started.
    pub frame_count: u64,
}
