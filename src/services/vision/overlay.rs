//! Diagnostic drawing of detected candles and structure onto a frame copy.
//!
//! The overlay is cosmetic; nothing here feeds back into classification.

use image::{Rgba, RgbaImage};

use crate::types::{CandleSequence, ColorClass, MarketStructure, ShapeHint};

const BULLISH_BOX: Rgba<u8> = Rgba([0, 255, 0, 255]);
const BEARISH_BOX: Rgba<u8> = Rgba([255, 0, 0, 255]);
const SUPPORT_LINE: Rgba<u8> = Rgba([0, 200, 255, 255]);
const RESISTANCE_LINE: Rgba<u8> = Rgba([255, 200, 0, 255]);
const BAND_LINE: Rgba<u8> = Rgba([179, 102, 255, 255]);
const SHAPE_MARKER: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Render candle boxes, level lines and band lines over a copy of the frame.
pub fn render_overlay(
    frame: &RgbaImage,
    candles: &CandleSequence,
    structure: &MarketStructure,
) -> RgbaImage {
    let mut canvas = frame.clone();

    for candle in candles {
        let color = match candle.color {
            ColorClass::Bullish => BULLISH_BOX,
            ColorClass::Bearish => BEARISH_BOX,
        };
        draw_rect(&mut canvas, candle.x, candle.y, candle.width, candle.height, color);

        // Mark wick-shaped candles just above their box
        if candle.shape != ShapeHint::Normal && candle.y >= 4 {
            fill_rect(&mut canvas, candle.x + candle.width / 2, candle.y - 4, 3, 3, SHAPE_MARKER);
        }
    }

    for level in &structure.support {
        draw_hline(&mut canvas, level.y, SUPPORT_LINE, 1);
    }
    for level in &structure.resistance {
        draw_hline(&mut canvas, level.y, RESISTANCE_LINE, 1);
    }

    if let Some(band) = structure.band {
        draw_hline(&mut canvas, band.center, BAND_LINE, 1);
        draw_hline(&mut canvas, band.upper, BAND_LINE, 4);
        draw_hline(&mut canvas, band.lower, BAND_LINE, 4);
    }

    canvas
}

fn put(canvas: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>) {
    if x < canvas.width() && y < canvas.height() {
        canvas.put_pixel(x, y, color);
    }
}

fn draw_rect(canvas: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    let right = x + w.saturating_sub(1);
    let bottom = y + h.saturating_sub(1);
    for col in x..=right {
        put(canvas, col, y, color);
        put(canvas, col, bottom, color);
    }
    for row in y..=bottom {
        put(canvas, x, row, color);
        put(canvas, right, row, color);
    }
}

fn fill_rect(canvas: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    for row in y..y + h {
        for col in x..x + w {
            put(canvas, col, row, color);
        }
    }
}

/// Horizontal line across the frame; `dash` > 1 skips every other run of that length.
fn draw_hline(canvas: &mut RgbaImage, y: f64, color: Rgba<u8>, dash: u32) {
    if !y.is_finite() || y < 0.0 {
        return;
    }
    let row = y.round() as u32;
    for col in 0..canvas.width() {
        if dash > 1 && (col / dash) % 2 == 1 {
            continue;
        }
        put(canvas, col, row, color);
    }
}
