//! Contour extraction of candle bounding boxes from a color mask.

use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;

use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::types::{Candle, ColorClass, ShapeHint};

use super::segmenter::Mask;

/// Boxes taller than this multiple of their width get a shape hint.
const TALL_ASPECT: f64 = 1.5;
/// Top/bottom density ratio above which a box reads as a hammer.
const HAMMER_RATIO: f64 = 2.5;
/// Top/bottom density ratio below which a box reads as a shooting star.
const SHOOTING_STAR_RATIO: f64 = 0.4;
/// Keeps the ratio finite when the bottom half is empty.
const DENSITY_EPSILON: f64 = 0.1;

/// Bounding box and enclosed area of one external contour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Polygon area inside the traced border, not the pixel count.
    pub area: f64,
}

/// Area enclosed by a closed border (shoelace formula).
///
/// Borders run through pixel centers, so a filled `w x h` block encloses
/// `(w - 1) * (h - 1)` and one-pixel lines enclose nothing.
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    (twice as f64 / 2.0).abs()
}

fn region_from_border(points: &[Point<i32>]) -> Option<Region> {
    let min_x = points.iter().map(|p| p.x).min()?;
    let max_x = points.iter().map(|p| p.x).max()?;
    let min_y = points.iter().map(|p| p.y).min()?;
    let max_y = points.iter().map(|p| p.y).max()?;

    Some(Region {
        x: min_x as u32,
        y: min_y as u32,
        width: (max_x - min_x + 1) as u32,
        height: (max_y - min_y + 1) as u32,
        area: contour_area(points),
    })
}

/// Find the outermost borders of 8-connected regions in a mask.
///
/// Borders nested inside another region's hole are skipped, so each
/// top-level blob yields exactly one region.
pub fn find_regions(mask: &Mask) -> Result<Vec<Region>> {
    let image = mask.to_gray()?;
    let contours = find_contours::<i32>(&image);

    let regions = contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .filter(|c| {
            c.parent
                .map_or(true, |p| contours[p].border_type != BorderType::Hole)
        })
        .filter_map(|c| region_from_border(&c.points))
        .collect();

    Ok(regions)
}

/// Classify a box from the mask density of its top and bottom halves.
///
/// This approximates wick-vs-body proportions without locating wicks. It is a
/// coarse proxy and misfires on noisy captures; the thresholds are kept fixed.
pub fn classify_shape(width: u32, height: u32, top_density: u32, bottom_density: u32) -> ShapeHint {
    if (height as f64) <= width as f64 * TALL_ASPECT {
        return ShapeHint::Normal;
    }

    let ratio = top_density as f64 / (bottom_density as f64 + DENSITY_EPSILON);
    if ratio > HAMMER_RATIO {
        ShapeHint::HammerLike
    } else if ratio < SHOOTING_STAR_RATIO {
        ShapeHint::ShootingStarLike
    } else {
        ShapeHint::Normal
    }
}

/// Turns mask regions into candles.
pub struct ShapeExtractor {
    config: ExtractionConfig,
}

impl ShapeExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Extract candles of one color from its mask, dropping noise regions.
    pub fn extract(&self, mask: &Mask, color: ColorClass) -> Result<Vec<Candle>> {
        let regions = find_regions(mask)?;
        let total = regions.len();

        let candles: Vec<Candle> = regions
            .into_iter()
            .filter(|r| r.area > self.config.min_contour_area as f64)
            .filter(|r| r.width >= self.config.min_width && r.height >= self.config.min_height)
            .map(|r| Self::to_candle(mask, r, color))
            .collect();

        tracing::trace!(
            "{:?} mask: {} regions, {} candles after noise filter",
            color,
            total,
            candles.len()
        );

        Ok(candles)
    }

    fn to_candle(mask: &Mask, region: Region, color: ColorClass) -> Candle {
        let half = region.height / 2;
        let top_density = mask.count_in(region.x, region.y, region.width, half);
        let bottom_density = mask.count_in(region.x, region.y + half, region.width, half);

        Candle {
            x: region.x,
            y: region.y,
            width: region.width,
            height: region.height,
            color,
            shape: classify_shape(region.width, region.height, top_density, bottom_density),
            top_density,
            bottom_density,
        }
    }
}
