//! Support and resistance levels from clustered candle extremes.

use crate::types::{Candle, StructureLevel};

/// Group sorted points into clusters anchored at their first member.
///
/// A point joins the current cluster while it lies within `tolerance` of the
/// cluster's first point. Clusters with fewer than `min_touches` members are
/// dropped. Each reported level sits at its cluster's mean.
pub fn cluster_levels(sorted_points: &[u32], tolerance: u32, min_touches: usize) -> Vec<StructureLevel> {
    let mut levels = Vec::new();
    let Some((&first, rest)) = sorted_points.split_first() else {
        return levels;
    };

    let mut start = first;
    let mut sum = first as u64;
    let mut count = 1usize;

    let flush = |sum: u64, count: usize, levels: &mut Vec<StructureLevel>| {
        if count >= min_touches {
            levels.push(StructureLevel {
                y: sum as f64 / count as f64,
                touches: count,
            });
        }
    };

    for &point in rest {
        if point - start <= tolerance {
            sum += point as u64;
            count += 1;
        } else {
            flush(sum, count, &mut levels);
            start = point;
            sum = point as u64;
            count = 1;
        }
    }
    flush(sum, count, &mut levels);

    levels
}

/// Resistance levels from candle tops and support levels from candle bottoms.
pub fn detect_levels(
    candles: &[Candle],
    tolerance: u32,
    min_touches: usize,
) -> (Vec<StructureLevel>, Vec<StructureLevel>) {
    let mut highs: Vec<u32> = candles.iter().map(|c| c.top()).collect();
    let mut lows: Vec<u32> = candles.iter().map(|c| c.bottom()).collect();
    highs.sort_unstable();
    lows.sort_unstable();

    (
        cluster_levels(&highs, tolerance, min_touches),
        cluster_levels(&lows, tolerance, min_touches),
    )
}
