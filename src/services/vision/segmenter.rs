//! HSV color segmentation of chart frames into bullish and bearish masks.

use image::{GrayImage, RgbaImage};

use crate::config::SegmentationConfig;
use crate::error::{AppError, Result};

/// Binary pixel mask with the same dimensions as the frame it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// Allocate an empty mask. Fails instead of aborting when memory is short.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let len = width as usize * height as usize;
        let mut bits = Vec::new();
        bits.try_reserve_exact(len)?;
        bits.resize(len, false);
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Read a pixel; out-of-bounds reads are unset.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if x < self.width && y < self.height {
            let i = self.index(x, y);
            self.bits[i] = value;
        }
    }

    /// Render as an 8-bit image, 255 for set pixels, for contour tracing.
    pub fn to_gray(&self) -> Result<GrayImage> {
        let mut raw = Vec::new();
        raw.try_reserve_exact(self.bits.len())?;
        raw.extend(self.bits.iter().map(|&b| if b { 255u8 } else { 0 }));
        GrayImage::from_raw(self.width, self.height, raw)
            .ok_or_else(|| AppError::Internal("mask buffer size mismatch".to_string()))
    }

    /// Total set pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// Set pixels inside a rectangle, clipped to the mask bounds.
    pub fn count_in(&self, x: u32, y: u32, width: u32, height: u32) -> u32 {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        let mut count = 0;
        for row in y.min(y_end)..y_end {
            for col in x.min(x_end)..x_end {
                if self.bits[self.index(col, row)] {
                    count += 1;
                }
            }
        }
        count
    }
}

/// Bullish and bearish masks for one frame.
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub bullish: Mask,
    pub bearish: Mask,
}

/// Convert an RGB pixel to 8-bit HSV (H 0-180, S and V 0-255).
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (rf, gf, bf) = (r as f64, g as f64, b as f64);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let diff = max - min;

    let v = max;
    let s = if max > 0.0 { diff / max * 255.0 } else { 0.0 };

    let mut h = if diff == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / diff
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / diff
    } else {
        240.0 + 60.0 * (rf - gf) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    (
        (h / 2.0).round().min(180.0) as u8,
        s.round() as u8,
        v.round() as u8,
    )
}

/// Splits frames into bullish and bearish candle masks by hue.
pub struct ColorSegmenter {
    config: SegmentationConfig,
}

impl ColorSegmenter {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    /// Segment a frame. Alpha is ignored; a frame with no candle colors yields
    /// two empty masks.
    pub fn segment(&self, frame: &RgbaImage) -> Result<Segmentation> {
        let (width, height) = frame.dimensions();
        let mut bullish = Mask::new(width, height)?;
        let mut bearish = Mask::new(width, height)?;
        let cfg = &self.config;

        for (x, y, pixel) in frame.enumerate_pixels() {
            let [r, g, b, _] = pixel.0;
            let (h, s, v) = rgb_to_hsv(r, g, b);
            if s < cfg.min_saturation || v < cfg.min_value {
                continue;
            }

            if cfg.bullish_hue.contains(h) {
                bullish.set(x, y, true);
            } else if cfg.bearish_hue_low.contains(h) || cfg.bearish_hue_high.contains(h) {
                bearish.set(x, y, true);
            }
        }

        Ok(Segmentation { bullish, bearish })
    }
}
