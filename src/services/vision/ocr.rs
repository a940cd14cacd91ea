//! Price-label preparation for the OCR collaborator.

use std::future::Future;
use std::pin::Pin;

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbaImage};

use crate::error::Result;

/// Text recogniser for the chart's price axis.
///
/// Implementations run off the analysis loop; the engine only keeps the latest
/// completed result.
pub trait PriceReader: Send + Sync {
    /// Recognise text in a binarized strip (dark text on white).
    fn recognize<'a>(
        &'a self,
        image: &'a GrayImage,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}

/// Crop the right-hand price strip, upscale it 2x, convert to grayscale and
/// binarize it with an inverted Otsu threshold.
///
/// Returns `None` for frames with no usable area.
pub fn prepare_price_strip(frame: &RgbaImage, strip_width: u32) -> Option<GrayImage> {
    let (width, height) = frame.dimensions();
    let strip_width = strip_width.min(width);
    if strip_width == 0 || height == 0 {
        return None;
    }

    let strip = imageops::crop_imm(frame, width - strip_width, 0, strip_width, height).to_image();
    let upscaled = imageops::resize(&strip, strip_width * 2, height * 2, FilterType::Triangle);
    let gray = imageops::grayscale(&upscaled);

    let level = otsu_level(&gray);
    let mut binary = gray;
    for pixel in binary.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > level { 0 } else { 255 };
    }
    Some(binary)
}

/// Otsu's threshold: the gray level maximising between-class variance.
pub fn otsu_level(image: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for Luma([v]) in image.pixels() {
        histogram[*v as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0;
    }
    let weighted_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, count)| level as f64 * *count as f64)
        .sum();

    let mut background_weight = 0u64;
    let mut background_sum = 0.0;
    let mut best_level = 0u8;
    let mut best_variance = -1.0;

    for (level, count) in histogram.iter().enumerate() {
        background_weight += count;
        if background_weight == 0 {
            continue;
        }
        let foreground_weight = total - background_weight;
        if foreground_weight == 0 {
            break;
        }

        background_sum += level as f64 * *count as f64;
        let mean_bg = background_sum / background_weight as f64;
        let mean_fg = (weighted_total - background_sum) / foreground_weight as f64;
        let variance =
            background_weight as f64 * foreground_weight as f64 * (mean_bg - mean_fg).powi(2);

        if variance > best_variance {
            best_variance = variance;
            best_level = level as u8;
        }
    }

    best_level
}

/// Keep only the characters that can appear in a price.
pub fn sanitize_price_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect()
}
