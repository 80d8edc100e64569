//! Layout classifier: the same content moved somewhere else.
//!
//! Pads the region, then runs a brute-force integer shift search scored on
//! a sparse grayscale sample grid. A candidate shift projects each sampled
//! original pixel into the compared crop and averages `255 - |Δgray|`; the
//! best-scoring shift is the estimated displacement. Histogram intersection
//! of the padded crops and edge-count alignment corroborate that the moved
//! content is still the same content.

use imgref::ImgRef;
use rgb::RGBA8;

use crate::classifier::{
    ClassificationDetails, ClassificationResult, DifferenceType, RegionClassifier,
};
use crate::consts::{
    LAYOUT_AXIS_DOMINANCE, LAYOUT_CONSISTENT_MARGIN, LAYOUT_CONSISTENT_SCORE, LAYOUT_DARK_CUTOFF,
    LAYOUT_EDGE_ALIGNMENT_THRESHOLD, LAYOUT_HIGH_DIFF_DISCOUNT, LAYOUT_HIGH_DIFF_PCT,
    LAYOUT_LOW_DIFF_DISCOUNT, LAYOUT_LOW_DIFF_PCT, LAYOUT_MAJOR_SHIFT, LAYOUT_MAX_DIFF_PCT,
    LAYOUT_MICRO_SHIFT, LAYOUT_MIN_DIFF_PCT, LAYOUT_NOTICEABLE_SHIFT, LAYOUT_PRIORITY,
    LAYOUT_SAMPLE_STRIDE, LAYOUT_SEARCH_PADDING, LAYOUT_SHIFT_RANGE, LAYOUT_SHIFT_STRIDE,
    LAYOUT_SIMILARITY_THRESHOLD,
};
use crate::edges::{detect_edges, edge_count_ratio, grayscale};
use crate::region::{AnalysisContext, Bounds, DifferenceRegion};
use crate::stats::{gray_histogram, histogram_intersection};

/// Outcome of the brute-force shift search over one padded region.
#[derive(Debug, Clone, Copy)]
struct ShiftEstimate {
    dx: i32,
    dy: i32,
    /// Mean match score of the winning shift, `[0, 255]`.
    score: f32,
    /// Mean match score of the null (zero) shift, for the margin test.
    null_score: f32,
}

impl ShiftEstimate {
    fn distance(&self) -> f32 {
        ((self.dx * self.dx + self.dy * self.dy) as f32).sqrt()
    }

    /// A shift is consistent when it matches well in absolute terms and
    /// explains the crop clearly better than "nothing moved".
    fn is_consistent(&self) -> bool {
        self.score > LAYOUT_CONSISTENT_SCORE
            && self.score > self.null_score + LAYOUT_CONSISTENT_MARGIN
    }
}

/// Mean `255 - |Δgray|` over the sample grid projected by `(dx, dy)`.
///
/// Very dark source pixels are excluded (they carry little correlation
/// signal against typical dark diff backgrounds), as are projections that
/// fall outside the crop. Returns 0 when nothing was sampled.
fn shift_score(
    original: &[f32],
    compared: &[f32],
    width: usize,
    height: usize,
    dx: i32,
    dy: i32,
) -> f32 {
    let mut sum = 0.0f32;
    let mut samples = 0u32;
    let mut y = 0usize;
    while y < height {
        let mut x = 0usize;
        while x < width {
            let gray = original[y * width + x];
            if gray > LAYOUT_DARK_CUTOFF {
                let tx = x as i32 + dx;
                let ty = y as i32 + dy;
                if tx >= 0 && (tx as usize) < width && ty >= 0 && (ty as usize) < height {
                    let target = compared[ty as usize * width + tx as usize];
                    sum += 255.0 - (gray - target).abs();
                    samples += 1;
                }
            }
            x += LAYOUT_SAMPLE_STRIDE;
        }
        y += LAYOUT_SAMPLE_STRIDE;
    }
    if samples == 0 {
        0.0
    } else {
        sum / samples as f32
    }
}

/// Brute-force search over `dx, dy` in the shift range at the search stride.
///
/// Ties on score are broken toward the smallest displacement: the sparse
/// sample grid cannot tell shifts apart below its stride, and the smallest
/// displacement is the conservative explanation.
fn best_shift(original: &[f32], compared: &[f32], width: usize, height: usize) -> ShiftEstimate {
    let null_score = shift_score(original, compared, width, height, 0, 0);
    let mut best = ShiftEstimate {
        dx: 0,
        dy: 0,
        score: null_score,
        null_score,
    };
    let mut best_dist2 = 0i32;
    let mut dy = -LAYOUT_SHIFT_RANGE;
    while dy <= LAYOUT_SHIFT_RANGE {
        let mut dx = -LAYOUT_SHIFT_RANGE;
        while dx <= LAYOUT_SHIFT_RANGE {
            if dx != 0 || dy != 0 {
                let score = shift_score(original, compared, width, height, dx, dy);
                let dist2 = dx * dx + dy * dy;
                let better = match score.partial_cmp(&best.score) {
                    Some(std::cmp::Ordering::Greater) => true,
                    Some(std::cmp::Ordering::Equal) => dist2 < best_dist2,
                    _ => false,
                };
                if better {
                    best = ShiftEstimate {
                        dx,
                        dy,
                        score,
                        null_score,
                    };
                    best_dist2 = dist2;
                }
            }
            dx += LAYOUT_SHIFT_STRIDE as i32;
        }
        dy += LAYOUT_SHIFT_STRIDE as i32;
    }
    best
}

/// Region bounds padded by the search padding, clamped to the image extent.
fn padded_bounds(bounds: &Bounds, image_width: usize, image_height: usize) -> Bounds {
    let pad = LAYOUT_SEARCH_PADDING;
    let x0 = (bounds.x as usize).saturating_sub(pad);
    let y0 = (bounds.y as usize).saturating_sub(pad);
    let x1 = ((bounds.x + bounds.width) as usize + pad).min(image_width);
    let y1 = ((bounds.y + bounds.height) as usize + pad).min(image_height);
    Bounds::new(x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32)
}

/// Classifies regions whose difference is displacement of unchanged content.
#[derive(Debug, Clone)]
pub struct LayoutClassifier {
    priority: i32,
}

impl LayoutClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            priority: LAYOUT_PRIORITY,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Default for LayoutClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionClassifier for LayoutClassifier {
    fn name(&self) -> &'static str {
        "layout"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_classify(&self, region: &DifferenceRegion, _ctx: &AnalysisContext<'_>) -> bool {
        region.difference_percentage >= LAYOUT_MIN_DIFF_PCT
            && region.difference_percentage <= LAYOUT_MAX_DIFF_PCT
    }

    fn classify(
        &self,
        region: &DifferenceRegion,
        ctx: &AnalysisContext<'_>,
    ) -> Option<ClassificationResult> {
        let padded = padded_bounds(&region.bounds, ctx.width(), ctx.height());
        let (original, compared): (ImgRef<'_, RGBA8>, ImgRef<'_, RGBA8>) = ctx.crop(&padded);

        let gray_original = grayscale(original);
        let gray_compared = grayscale(compared);
        let shift = best_shift(
            &gray_original,
            &gray_compared,
            padded.width as usize,
            padded.height as usize,
        );
        let consistent = shift.is_consistent();

        let structural_similarity = histogram_intersection(
            &gray_histogram(original),
            &gray_histogram(compared),
        );
        let edge_alignment = if consistent {
            edge_count_ratio(
                detect_edges(original).edge_count,
                detect_edges(compared).edge_count,
            )
        } else {
            0.0
        };

        let distance = shift.distance();
        let abs_dx = shift.dx.abs() as f32;
        let abs_dy = shift.dy.abs() as f32;
        let horizontal_dominant = consistent && abs_dx > LAYOUT_AXIS_DOMINANCE * abs_dy;
        let vertical_dominant = consistent && abs_dy > LAYOUT_AXIS_DOMINANCE * abs_dx;

        let mut confidence = 0.0f32;
        if consistent {
            confidence += 0.3;
        }
        if consistent && distance > LAYOUT_NOTICEABLE_SHIFT {
            confidence += 0.2;
        }
        if structural_similarity > LAYOUT_SIMILARITY_THRESHOLD {
            confidence += 0.2;
        }
        if edge_alignment > LAYOUT_EDGE_ALIGNMENT_THRESHOLD {
            confidence += 0.2;
        }
        if horizontal_dominant || vertical_dominant {
            confidence += 0.1;
        }
        if region.difference_percentage > LAYOUT_HIGH_DIFF_PCT {
            confidence *= LAYOUT_HIGH_DIFF_DISCOUNT;
        } else if region.difference_percentage < LAYOUT_LOW_DIFF_PCT {
            confidence *= LAYOUT_LOW_DIFF_DISCOUNT;
        }
        let confidence = confidence.min(1.0);

        let sub_type = if distance < LAYOUT_MICRO_SHIFT {
            "micro-shift"
        } else if horizontal_dominant {
            "horizontal-shift"
        } else if vertical_dominant {
            "vertical-shift"
        } else if distance > LAYOUT_MAJOR_SHIFT {
            "major-shift"
        } else {
            "diagonal-shift"
        };

        Some(
            ClassificationResult::new(DifferenceType::Layout, confidence)
                .with_sub_type(sub_type)
                .with_details(ClassificationDetails::Layout {
                    shift_x: shift.dx,
                    shift_y: shift.dy,
                    shift_distance: distance,
                    shift_consistent: consistent,
                    structural_similarity,
                    edge_alignment,
                }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgref::Img;

    fn rgba(v: u8) -> RGBA8 {
        RGBA8::new(v, v, v, 255)
    }

    /// White canvas with one gray box.
    fn canvas_with_box(
        w: usize,
        h: usize,
        box_x: usize,
        box_y: usize,
        box_w: usize,
        box_h: usize,
        value: u8,
    ) -> Img<Vec<RGBA8>> {
        let mut pixels = vec![rgba(255); w * h];
        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                pixels[y * w + x] = rgba(value);
            }
        }
        Img::new(pixels, w, h)
    }

    #[test]
    fn test_applicability_band() {
        let img = canvas_with_box(80, 80, 10, 10, 20, 20, 100);
        let ctx = AnalysisContext::new(img.as_ref(), img.as_ref()).unwrap();
        let classifier = LayoutClassifier::new();
        let region = |pct: f32| {
            DifferenceRegion::new(1, Bounds::new(0, 0, 80, 80), 6400, 1000, pct)
        };
        assert!(!classifier.can_classify(&region(9.9), &ctx));
        assert!(classifier.can_classify(&region(10.0), &ctx));
        assert!(classifier.can_classify(&region(70.0), &ctx));
        assert!(!classifier.can_classify(&region(70.1), &ctx));
    }

    #[test]
    fn test_best_shift_finds_horizontal_move() {
        let original = canvas_with_box(80, 80, 20, 30, 20, 20, 100);
        let compared = canvas_with_box(80, 80, 30, 30, 20, 20, 100);
        let gray_a = grayscale(original.as_ref());
        let gray_b = grayscale(compared.as_ref());

        let shift = best_shift(&gray_a, &gray_b, 80, 80);
        assert_eq!((shift.dx, shift.dy), (10, 0));
        assert!((shift.score - 255.0).abs() < 0.5);
        assert!(shift.is_consistent());
    }

    #[test]
    fn test_zero_motion_is_not_consistent() {
        let img = canvas_with_box(80, 80, 20, 30, 20, 20, 100);
        let gray = grayscale(img.as_ref());
        let shift = best_shift(&gray, &gray, 80, 80);
        // Identical crops: the null shift already explains everything, so
        // no candidate can clear the consistency margin.
        assert!(!shift.is_consistent());
    }

    #[test]
    fn test_horizontal_shift_classification() {
        let original = canvas_with_box(80, 80, 20, 30, 20, 20, 100);
        let compared = canvas_with_box(80, 80, 30, 30, 20, 20, 100);
        let ctx = AnalysisContext::new(original.as_ref(), compared.as_ref()).unwrap();
        // Symmetric difference of the two box positions: 400 of 1350 px.
        let region = DifferenceRegion::new(1, Bounds::new(15, 25, 45, 30), 1350, 400, 29.6);

        let result = LayoutClassifier::new().classify(&region, &ctx).unwrap();
        assert_eq!(result.kind, DifferenceType::Layout);
        assert_eq!(result.sub_type.as_deref(), Some("horizontal-shift"));
        assert!(result.confidence > 0.5, "got {}", result.confidence);
        match result.details {
            Some(ClassificationDetails::Layout {
                shift_x, shift_y, ..
            }) => {
                assert_eq!(shift_x, 10);
                assert_eq!(shift_y, 0);
            }
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn test_concentric_resize_scores_low() {
        // A box grown in place has no displacement to find; the classifier
        // must not explain it as layout.
        let original = canvas_with_box(80, 80, 30, 30, 20, 20, 200);
        let compared = canvas_with_box(80, 80, 25, 25, 30, 30, 200);
        let ctx = AnalysisContext::new(original.as_ref(), compared.as_ref()).unwrap();
        let region = DifferenceRegion::new(1, Bounds::new(18, 18, 44, 44), 1936, 500, 25.8);

        let result = LayoutClassifier::new().classify(&region, &ctx).unwrap();
        assert!(result.confidence < 0.5, "got {}", result.confidence);
    }

    #[test]
    fn test_inconsistent_shift_earns_no_displacement_credit() {
        // Same concentric resize: whatever the search returns, an
        // inconsistent shift gets neither the distance nor the
        // axis-dominance bonus and no axis sub-type.
        let original = canvas_with_box(80, 80, 30, 30, 20, 20, 200);
        let compared = canvas_with_box(80, 80, 25, 25, 30, 30, 200);
        let ctx = AnalysisContext::new(original.as_ref(), compared.as_ref()).unwrap();
        let region = DifferenceRegion::new(1, Bounds::new(18, 18, 44, 44), 1936, 500, 25.8);

        let result = LayoutClassifier::new().classify(&region, &ctx).unwrap();
        match result.details {
            Some(ClassificationDetails::Layout {
                shift_consistent,
                edge_alignment,
                structural_similarity,
                ..
            }) => {
                assert!(!shift_consistent);
                assert!(edge_alignment.abs() < f32::EPSILON);
                // Only the similarity bonus can remain.
                let ceiling = if structural_similarity > LAYOUT_SIMILARITY_THRESHOLD {
                    0.2
                } else {
                    0.0
                };
                assert!(result.confidence <= ceiling + 1e-6, "got {}", result.confidence);
            }
            other => panic!("unexpected details: {other:?}"),
        }
        assert_ne!(result.sub_type.as_deref(), Some("horizontal-shift"));
        assert_ne!(result.sub_type.as_deref(), Some("vertical-shift"));
    }

    #[test]
    fn test_padded_bounds_clamps_to_image() {
        let padded = padded_bounds(&Bounds::new(5, 70, 30, 8), 80, 80);
        assert_eq!(padded, Bounds::new(0, 50, 55, 30));
    }
}
