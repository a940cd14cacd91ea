use serde::{Deserialize, Serialize};

/// A horizontal support or resistance line inferred from repeated candle extremes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureLevel {
    /// Mean screen y of the clustered extremes.
    pub y: f64,
    /// Number of extremes in the cluster.
    pub touches: usize,
}

impl StructureLevel {
    /// Check whether a screen y lies strictly within `distance` pixels of this level.
    pub fn is_near(&self, y: f64, distance: f64) -> bool {
        (y - self.y).abs() < distance
    }
}

/// Moving-average center line with a dispersion envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Band {
    pub center: f64,
    pub upper: f64,
    pub lower: f64,
}

impl Band {
    /// Where a screen y sits relative to the envelope.
    ///
    /// Screen coordinates grow downward, so `upper` is the smaller y.
    pub fn position(&self, y: f64) -> BandPosition {
        let top = self.upper.min(self.lower);
        let bottom = self.upper.max(self.lower);
        if y < top {
            BandPosition::Above
        } else if y > bottom {
            BandPosition::Below
        } else {
            BandPosition::Inside
        }
    }
}

/// Price position relative to the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandPosition {
    Above,
    Inside,
    Below,
}

impl BandPosition {
    pub fn label(&self) -> &'static str {
        match self {
            BandPosition::Above => "ACIMA DA BANDA",
            BandPosition::Inside => "DENTRO DA BANDA",
            BandPosition::Below => "ABAIXO DA BANDA",
        }
    }
}

/// Market regime derived from pressure and recent candle behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    /// No candles to judge.
    #[default]
    #[serde(rename = "NEUTRO")]
    Neutral,
    /// Neither side dominates.
    #[serde(rename = "CONSOLIDAÇÃO")]
    Consolidation,
    /// Buyers dominate.
    #[serde(rename = "COMPRADORA")]
    BullishExpansion,
    /// Sellers dominate.
    #[serde(rename = "VENDEDORA")]
    BearishExpansion,
    /// The move is overextended; no signal should be taken.
    #[serde(rename = "EXAUSTÃO")]
    Exhaustion,
}

impl Phase {
    /// Get display label for this phase.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Neutral => "NEUTRO",
            Phase::Consolidation => "CONSOLIDAÇÃO",
            Phase::BullishExpansion => "COMPRADORA",
            Phase::BearishExpansion => "VENDEDORA",
            Phase::Exhaustion => "EXAUSTÃO",
        }
    }
}

/// Structure features computed from one frame's candle sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStructure {
    /// Bullish vs bearish area dominance, -100 to +100.
    pub pressure_score: f64,
    pub phase: Phase,
    /// Levels clustered from candle tops.
    pub resistance: Vec<StructureLevel>,
    /// Levels clustered from candle bottoms.
    pub support: Vec<StructureLevel>,
    /// Absent until enough candles are available.
    pub band: Option<Band>,
}
