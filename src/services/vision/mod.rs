//! Frame vision pipeline.
//!
//! Turns a captured chart frame into an ordered candle sequence:
//! color segmentation, connected-region extraction, then left-to-right ordering.

pub mod extractor;
pub mod ocr;
pub mod overlay;
pub mod segmenter;
pub mod sequencer;

pub use extractor::ShapeExtractor;
pub use ocr::{prepare_price_strip, PriceReader};
pub use overlay::render_overlay;
pub use segmenter::{ColorSegmenter, Mask, Segmentation};
pub use sequencer::sequence;

use image::RgbaImage;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::types::{CandleSequence, ColorClass};

/// Detects candles in a frame.
pub struct CandleDetector {
    segmenter: ColorSegmenter,
    extractor: ShapeExtractor,
}

impl CandleDetector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            segmenter: ColorSegmenter::new(config.segmentation.clone()),
            extractor: ShapeExtractor::new(config.extraction.clone()),
        }
    }

    /// Run segmentation and extraction. Masks are dropped before returning.
    pub fn detect(&self, frame: &RgbaImage) -> Result<CandleSequence> {
        let masks = self.segmenter.segment(frame)?;
        let bullish = self.extractor.extract(&masks.bullish, ColorClass::Bullish)?;
        let bearish = self.extractor.extract(&masks.bearish, ColorClass::Bearish)?;
        Ok(sequence(bullish, bearish))
    }
}
