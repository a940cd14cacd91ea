use serde::{Deserialize, Serialize};

use super::SignalType;

/// Outcome of a recorded signal, set by the user after expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeResult {
    Win,
    Loss,
    #[default]
    Pending,
}

/// One ledger entry per emitted signal event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalHistoryItem {
    /// Timestamp (ms) of the signal that created this entry.
    pub id: i64,
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    /// Wall-clock time of the signal, `HH:MM:SS`.
    pub time: String,
    pub method: String,
    pub confidence: u8,
    pub result: TradeResult,
}

/// Win/loss tally over resolved entries.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub wins: u32,
    pub losses: u32,
    pub pending: u32,
    /// Win percentage over resolved entries, `None` until one is resolved.
    pub win_rate: Option<f64>,
}
