//! Color statistics shared by all classifiers.
//!
//! Everything here is a pure function over an RGBA sub-image view:
//! average/variance/dominant-color summaries, normalized grayscale
//! histograms (the structural-similarity proxy), and the border-probe
//! background sampling used for content detection.

use std::collections::HashMap;

use imgref::ImgRef;
use rgb::RGBA8;

use crate::consts::{
    BACKGROUND_QUANT_STEP, CONTENT_ALPHA_OPAQUE, CONTENT_COLOR_DELTA, DOMINANT_COLOR_LIMIT,
    DOMINANT_COUNT_TOLERANCE, DOMINANT_QUANT_SHIFT,
};

/// One quantized dominant color with its pixel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DominantColor {
    /// RGB channels quantized to 16 buckets each.
    pub key: [u8; 3],
    pub count: u32,
}

/// Summary color statistics for one side of a region.
#[derive(Debug, Clone)]
pub struct ColorStats {
    /// Average RGBA, unquantized.
    pub avg: [f32; 4],
    /// Mean squared deviation from the average, averaged over R/G/B.
    pub variance: f32,
    /// Top dominant colors by frequency, count-descending.
    pub dominant: Vec<DominantColor>,
}

/// Computes average color, variance and dominant colors for a view.
#[must_use]
pub fn color_stats(img: ImgRef<'_, RGBA8>) -> ColorStats {
    let total = img.width() * img.height();
    if total == 0 {
        return ColorStats {
            avg: [0.0; 4],
            variance: 0.0,
            dominant: Vec::new(),
        };
    }

    let mut sum = [0.0f64; 4];
    let mut buckets: HashMap<[u8; 3], u32> = HashMap::new();
    for row in img.rows() {
        for px in row {
            sum[0] += f64::from(px.r);
            sum[1] += f64::from(px.g);
            sum[2] += f64::from(px.b);
            sum[3] += f64::from(px.a);
            let key = [
                px.r >> DOMINANT_QUANT_SHIFT,
                px.g >> DOMINANT_QUANT_SHIFT,
                px.b >> DOMINANT_QUANT_SHIFT,
            ];
            *buckets.entry(key).or_insert(0) += 1;
        }
    }
    let n = total as f64;
    let avg = [
        (sum[0] / n) as f32,
        (sum[1] / n) as f32,
        (sum[2] / n) as f32,
        (sum[3] / n) as f32,
    ];

    let mut sq = 0.0f64;
    for row in img.rows() {
        for px in row {
            let dr = f64::from(px.r) - f64::from(avg[0]);
            let dg = f64::from(px.g) - f64::from(avg[1]);
            let db = f64::from(px.b) - f64::from(avg[2]);
            sq += (dr * dr + dg * dg + db * db) / 3.0;
        }
    }

    let mut dominant: Vec<DominantColor> = buckets
        .into_iter()
        .map(|(key, count)| DominantColor { key, count })
        .collect();
    // Count-descending, key-ascending for a deterministic order.
    dominant.sort_by(|a, b| b.count.cmp(&a.count).then(a.key.cmp(&b.key)));
    dominant.truncate(DOMINANT_COLOR_LIMIT);

    ColorStats {
        avg,
        variance: (sq / n) as f32,
        dominant,
    }
}

/// Fraction of the union of two dominant-color sets that does not match
/// within the count tolerance. 0 for identical palettes, 1 for disjoint.
#[must_use]
pub fn dominant_color_change(a: &[DominantColor], b: &[DominantColor]) -> f32 {
    let mut union: Vec<[u8; 3]> = Vec::with_capacity(a.len() + b.len());
    for d in a.iter().chain(b) {
        if !union.contains(&d.key) {
            union.push(d.key);
        }
    }
    if union.is_empty() {
        return 0.0;
    }

    let count_of = |set: &[DominantColor], key: [u8; 3]| -> Option<u32> {
        set.iter().find(|d| d.key == key).map(|d| d.count)
    };
    let mut unmatched = 0usize;
    for &key in &union {
        match (count_of(a, key), count_of(b, key)) {
            (Some(ca), Some(cb)) => {
                let larger = ca.max(cb) as f32;
                if (ca as f32 - cb as f32).abs() > DOMINANT_COUNT_TOLERANCE * larger {
                    unmatched += 1;
                }
            }
            _ => unmatched += 1,
        }
    }
    unmatched as f32 / union.len() as f32
}

/// Normalized 256-bin grayscale histogram.
#[must_use]
pub fn gray_histogram(img: ImgRef<'_, RGBA8>) -> [f32; 256] {
    let mut hist = [0.0f32; 256];
    let total = img.width() * img.height();
    if total == 0 {
        return hist;
    }
    for row in img.rows() {
        for px in row {
            let gray = (u32::from(px.r) + u32::from(px.g) + u32::from(px.b)) / 3;
            hist[gray as usize] += 1.0;
        }
    }
    let n = total as f32;
    for bin in &mut hist {
        *bin /= n;
    }
    hist
}

/// Histogram intersection of two normalized histograms, in `[0, 1]`.
///
/// Used as the structural-similarity proxy: cheap, and tolerant of
/// movement and moderate rescaling.
#[must_use]
pub fn histogram_intersection(a: &[f32; 256], b: &[f32; 256]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x.min(*y)).sum()
}

/// Standard deviation of grayscale values, normalized to `[0, ~2]` by 128.
///
/// A cheap luminance-spread measure used as the contrast signal.
#[must_use]
pub fn luminance_spread(img: ImgRef<'_, RGBA8>) -> f32 {
    let total = img.width() * img.height();
    if total == 0 {
        return 0.0;
    }
    let mut sum = 0.0f64;
    let mut sq = 0.0f64;
    for row in img.rows() {
        for px in row {
            let gray = (f64::from(px.r) + f64::from(px.g) + f64::from(px.b)) / 3.0;
            sum += gray;
            sq += gray * gray;
        }
    }
    let n = total as f64;
    let mean = sum / n;
    let var = (sq / n - mean * mean).max(0.0);
    (var.sqrt() / 128.0) as f32
}

/// Samples the dominant background color from border probes.
///
/// Probes the four corners, the top and bottom rows at w/4, w/2 and 3w/4,
/// and the left and right columns at h/4 and 3h/4. Channels are quantized
/// to buckets of [`BACKGROUND_QUANT_STEP`] and the majority bucket wins;
/// the returned color is the first probe that landed in that bucket.
#[must_use]
pub fn sample_background(img: ImgRef<'_, RGBA8>) -> RGBA8 {
    let w = img.width();
    let h = img.height();
    if w == 0 || h == 0 {
        return RGBA8::new(0, 0, 0, 255);
    }

    let rows: Vec<&[RGBA8]> = img.rows().collect();
    let at = |x: usize, y: usize| rows[y][x];

    let mut probes: Vec<RGBA8> = vec![
        at(0, 0),
        at(w - 1, 0),
        at(0, h - 1),
        at(w - 1, h - 1),
    ];
    for fx in [w / 4, w / 2, 3 * w / 4] {
        probes.push(at(fx, 0));
        probes.push(at(fx, h - 1));
    }
    for fy in [h / 4, 3 * h / 4] {
        probes.push(at(0, fy));
        probes.push(at(w - 1, fy));
    }

    let bucket = |px: RGBA8| {
        [
            px.r / BACKGROUND_QUANT_STEP,
            px.g / BACKGROUND_QUANT_STEP,
            px.b / BACKGROUND_QUANT_STEP,
        ]
    };

    let mut votes: Vec<([u8; 3], u32, RGBA8)> = Vec::new();
    for &px in &probes {
        let key = bucket(px);
        match votes.iter_mut().find(|(k, _, _)| *k == key) {
            Some((_, count, _)) => *count += 1,
            None => votes.push((key, 1, px)),
        }
    }
    votes
        .into_iter()
        .max_by_key(|&(_, count, _)| count)
        .map(|(_, _, px)| px)
        .unwrap_or(RGBA8::new(0, 0, 0, 255))
}

/// Summed absolute RGB delta between two colors.
#[inline]
#[must_use]
pub fn color_delta(a: RGBA8, b: RGBA8) -> u32 {
    u32::from(a.r.abs_diff(b.r)) + u32::from(a.g.abs_diff(b.g)) + u32::from(a.b.abs_diff(b.b))
}

/// Whether a pixel reads as content against the sampled background.
#[inline]
#[must_use]
pub fn is_content_pixel(px: RGBA8, background: RGBA8) -> bool {
    color_delta(px, background) > CONTENT_COLOR_DELTA || px.a < CONTENT_ALPHA_OPAQUE
}

/// Bounding box of content pixels (against `background`), as
/// `(min_x, min_y, max_x, max_y)` inclusive. `None` when no pixel differs.
#[must_use]
pub fn content_bounds_by_background(
    img: ImgRef<'_, RGBA8>,
    background: RGBA8,
) -> Option<(usize, usize, usize, usize)> {
    let mut found: Option<(usize, usize, usize, usize)> = None;
    for (y, row) in img.rows().enumerate() {
        for (x, &px) in row.iter().enumerate() {
            if is_content_pixel(px, background) {
                found = Some(match found {
                    None => (x, y, x, y),
                    Some((min_x, min_y, max_x, max_y)) => {
                        (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                    }
                });
            }
        }
    }
    found
}
