//! Signal event detection and the outcome ledger.

use chrono::{TimeZone, Utc};
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::types::{HistoryStats, SignalData, SignalHistoryItem, TradeResult};

/// Turns the per-tick signal stream into discrete events.
///
/// The timestamp is the change token: a snapshot counts as a new event only
/// when its timestamp differs from the last one seen and it is not NEUTRAL.
#[derive(Debug, Default)]
pub struct SignalTracker {
    last_timestamp: Option<i64>,
}

impl SignalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a snapshot. Returns true when it is a new non-neutral event.
    pub fn observe(&mut self, signal: &SignalData) -> bool {
        if self.last_timestamp == Some(signal.timestamp) {
            return false;
        }
        self.last_timestamp = Some(signal.timestamp);
        !signal.signal_type.is_neutral()
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.last_timestamp
    }
}

/// In-memory ledger of emitted signals, newest first.
#[derive(Debug, Default)]
pub struct SignalHistory {
    entries: Vec<SignalHistoryItem>,
}

impl SignalHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pending entry keyed by the signal's timestamp.
    ///
    /// Returns `None` for neutral signals and for timestamps already recorded.
    pub fn record(&mut self, signal: &SignalData) -> Option<&SignalHistoryItem> {
        if signal.signal_type.is_neutral() || self.get(signal.timestamp).is_some() {
            return None;
        }

        let time = Utc
            .timestamp_millis_opt(signal.timestamp)
            .single()
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--:--:--".to_string());

        self.entries.insert(
            0,
            SignalHistoryItem {
                id: signal.timestamp,
                signal_type: signal.signal_type,
                time,
                method: signal.method.clone(),
                confidence: signal.confidence,
                result: TradeResult::Pending,
            },
        );
        debug!("Recorded {} signal {}", signal.signal_type.label(), signal.timestamp);
        self.entries.first()
    }

    /// Set the outcome of an entry.
    pub fn resolve(&mut self, id: i64, result: TradeResult) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::Internal(format!("No history entry {}", id)))?;
        entry.result = result;
        info!("Signal {} marked {:?}", id, result);
        Ok(())
    }

    pub fn get(&self, id: i64) -> Option<&SignalHistoryItem> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entries(&self) -> &[SignalHistoryItem] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Tally outcomes. Win rate covers resolved entries only.
    pub fn stats(&self) -> HistoryStats {
        let mut stats = HistoryStats::default();
        for entry in &self.entries {
            match entry.result {
                TradeResult::Win => stats.wins += 1,
                TradeResult::Loss => stats.losses += 1,
                TradeResult::Pending => stats.pending += 1,
            }
        }
        let resolved = stats.wins + stats.losses;
        if resolved > 0 {
            stats.win_rate = Some(stats.wins as f64 / resolved as f64 * 100.0);
        }
        stats
    }

    /// Export the ledger as a JSON array.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }
}
