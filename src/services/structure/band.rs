//! Moving-average band over candle closes.

use crate::types::{Band, Candle};

/// Moving-average band.
///
/// Consists of:
/// - Center: mean close-y of the trailing `period` candles
/// - Upper: center - deviation * StdDev (higher price, smaller screen y)
/// - Lower: center + deviation * StdDev
///
/// Close-y is the top edge of a bullish candle and the bottom edge of a
/// bearish one.
pub struct MovingBand {
    period: usize,
    deviation: f64,
}

impl Default for MovingBand {
    fn default() -> Self {
        Self {
            period: 9,
            deviation: 1.5,
        }
    }
}

impl MovingBand {
    pub fn new(period: usize, deviation: f64) -> Self {
        Self { period, deviation }
    }

    /// Population standard deviation.
    fn std_dev(values: &[f64], mean: f64) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let variance: f64 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        variance.sqrt()
    }

    /// Compute the band over the trailing `period` candles, or `None` when
    /// fewer are available.
    pub fn calculate(&self, candles: &[Candle]) -> Option<Band> {
        if self.period == 0 || candles.len() < self.period {
            return None;
        }

        let closes: Vec<f64> = candles
            .iter()
            .rev()
            .take(self.period)
            .map(|c| c.close_y())
            .collect();

        let center = closes.iter().sum::<f64>() / self.period as f64;
        let offset = Self::std_dev(&closes, center) * self.deviation;

        Some(Band {
            center,
            upper: center - offset,
            lower: center + offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColorClass;

    fn bullish_at(top: u32) -> Candle {
        Candle::new(0, top, 6, 20, ColorClass::Bullish)
    }

    #[test]
    fn test_band_insufficient_data() {
        let band = MovingBand::default();
        let candles: Vec<Candle> = (0..8).map(|i| bullish_at(100 + i)).collect();
        assert!(band.calculate(&candles).is_none());
    }

    #[test]
    fn test_band_flat_closes_collapse() {
        let band = MovingBand::default();
        let candles: Vec<Candle> = (0..9).map(|_| bullish_at(120)).collect();
        let result = band.calculate(&candles).unwrap();
        assert_eq!(result.center, 120.0);
        assert_eq!(result.upper, 120.0);
        assert_eq!(result.lower, 120.0);
    }

    #[test]
    fn test_band_mean_and_deviation() {
        let band = MovingBand::default();
        // Closes 100..=108: mean 104, population variance 60/9
        let candles: Vec<Candle> = (0..9).map(|i| bullish_at(100 + i)).collect();
        let result = band.calculate(&candles).unwrap();
        let sd = (60.0f64 / 9.0).sqrt();
        assert!((result.center - 104.0).abs() < 1e-9);
        assert!((result.upper - (104.0 - 1.5 * sd)).abs() < 1e-9);
        assert!((result.lower - (104.0 + 1.5 * sd)).abs() < 1e-9);
    }

    #[test]
    fn test_band_uses_only_trailing_period() {
        let band = MovingBand::default();
        let mut candles = vec![bullish_at(500), bullish_at(10)];
        candles.extend((0..9).map(|_| bullish_at(200)));
        let result = band.calculate(&candles).unwrap();
        assert_eq!(result.center, 200.0);
    }

    #[test]
    fn test_band_bearish_close_is_bottom() {
        let band = MovingBand::new(1, 1.5);
        let candles = vec![Candle::new(0, 100, 6, 30, ColorClass::Bearish)];
        assert_eq!(band.calculate(&candles).unwrap().center, 130.0);
    }
}
