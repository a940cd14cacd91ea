use serde::{Deserialize, Serialize};

/// Which color mask a candle was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorClass {
    /// Green body.
    #[serde(rename = "GREEN")]
    Bullish,
    /// Red body.
    #[serde(rename = "RED")]
    Bearish,
}

impl ColorClass {
    /// Get the opposite color.
    pub fn opposite(&self) -> Self {
        match self {
            ColorClass::Bullish => ColorClass::Bearish,
            ColorClass::Bearish => ColorClass::Bullish,
        }
    }

    /// The shape that announces a reversal *into* this color.
    pub fn reversal_shape(&self) -> ShapeHint {
        match self {
            ColorClass::Bullish => ShapeHint::HammerLike,
            ColorClass::Bearish => ShapeHint::ShootingStarLike,
        }
    }
}

/// Coarse wick shape inferred from the mask density of a candle's halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShapeHint {
    #[default]
    Normal,
    #[serde(rename = "HAMMER")]
    HammerLike,
    #[serde(rename = "SHOOTING_STAR")]
    ShootingStarLike,
}

/// A colored rectangular region approximating one chart candlestick.
///
/// Candles live for one analysis pass only and carry no identity across frames.
/// Coordinates are screen pixels, so a smaller `y` means a higher price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub color: ColorClass,
    pub shape: ShapeHint,
    /// Mask pixels in the top half of the box.
    pub top_density: u32,
    /// Mask pixels in the bottom half of the box.
    pub bottom_density: u32,
}

impl Candle {
    /// Create a candle with no density information and a normal shape.
    pub fn new(x: u32, y: u32, width: u32, height: u32, color: ColorClass) -> Self {
        Self {
            x,
            y,
            width,
            height,
            color,
            shape: ShapeHint::Normal,
            top_density: 0,
            bottom_density: 0,
        }
    }

    pub fn with_shape(mut self, shape: ShapeHint) -> Self {
        self.shape = shape;
        self
    }

    /// Top edge (the candle's high in price terms).
    pub fn top(&self) -> u32 {
        self.y
    }

    /// Bottom edge (the candle's low in price terms).
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Screen y of the close: the top edge for bullish candles, the bottom edge
    /// for bearish ones.
    pub fn close_y(&self) -> f64 {
        match self.color {
            ColorClass::Bullish => self.top() as f64,
            ColorClass::Bearish => self.bottom() as f64,
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.color == ColorClass::Bullish
    }

    pub fn is_bearish(&self) -> bool {
        self.color == ColorClass::Bearish
    }
}

/// Candles ordered left to right, i.e. in chart time order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleSequence {
    candles: Vec<Candle>,
}

impl CandleSequence {
    /// Build a sequence, sorting by ascending x. The sort is stable so candles
    /// sharing a column keep their input order.
    pub fn new(mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.x);
        Self { candles }
    }

    pub fn as_slice(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candle> {
        self.candles.iter()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// The `n` most recent candles, oldest first. Returns `None` when fewer are available.
    pub fn tail(&self, n: usize) -> Option<&[Candle]> {
        let len = self.candles.len();
        if n > len {
            return None;
        }
        Some(&self.candles[len - n..])
    }
}

impl<'a> IntoIterator for &'a CandleSequence {
    type Item = &'a Candle;
    type IntoIter = std::slice::Iter<'a, Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.candles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candle_edges() {
        let candle = Candle::new(10, 100, 8, 40, ColorClass::Bullish);
        assert_eq!(candle.top(), 100);
        assert_eq!(candle.bottom(), 140);
        assert_eq!(candle.area(), 320);
    }

    #[test]
    fn test_close_y_follows_color() {
        let green = Candle::new(0, 100, 8, 40, ColorClass::Bullish);
        let red = Candle::new(0, 100, 8, 40, ColorClass::Bearish);
        assert_eq!(green.close_y(), 100.0);
        assert_eq!(red.close_y(), 140.0);
    }

    #[test]
    fn test_reversal_shape() {
        assert_eq!(ColorClass::Bullish.reversal_shape(), ShapeHint::HammerLike);
        assert_eq!(ColorClass::Bearish.reversal_shape(), ShapeHint::ShootingStarLike);
        assert_eq!(ColorClass::Bullish.opposite(), ColorClass::Bearish);
    }

    #[test]
    fn test_sequence_sorted_by_x() {
        let seq = CandleSequence::new(vec![
            Candle::new(50, 0, 5, 10, ColorClass::Bullish),
            Candle::new(10, 0, 5, 10, ColorClass::Bearish),
            Candle::new(30, 0, 5, 10, ColorClass::Bullish),
        ]);
        let xs: Vec<u32> = seq.iter().map(|c| c.x).collect();
        assert_eq!(xs, vec![10, 30, 50]);
    }

    #[test]
    fn test_sequence_tail() {
        let seq = CandleSequence::new(vec![
            Candle::new(1, 0, 5, 10, ColorClass::Bullish),
            Candle::new(2, 0, 5, 10, ColorClass::Bearish),
        ]);
        assert_eq!(seq.tail(2).map(|t| t.len()), Some(2));
        assert!(seq.tail(3).is_none());
        assert!(CandleSequence::default().is_empty());
    }

    #[test]
    fn test_color_serializes_to_wire_labels() {
        assert_eq!(serde_json::to_string(&ColorClass::Bullish).unwrap(), "\"GREEN\"");
        assert_eq!(serde_json::to_string(&ShapeHint::HammerLike).unwrap(), "\"HAMMER\"");
    }
}
