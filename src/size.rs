//! Size classifier: the same content, larger or smaller.
//!
//! Finds a content bounding box on each side — Sobel edge extrema first,
//! falling back to a background-color-difference box for edge-free content —
//! and compares the two boxes. Histogram intersection of the two content
//! crops checks that what resized is still the same material.

use imgref::ImgRef;
use rgb::RGBA8;

use crate::classifier::{
    ClassificationDetails, ClassificationResult, DifferenceType, RegionClassifier,
};
use crate::consts::{
    SIZE_ASPECT_CHANGED, SIZE_ASPECT_DISCOUNT, SIZE_AXIS_DOMINANCE, SIZE_BOUNDARY_CHANGED,
    SIZE_HIGH_DIFF_DISCOUNT, SIZE_HIGH_DIFF_PCT, SIZE_MAX_DIFF_PCT, SIZE_MIN_DIFF_PCT,
    SIZE_PRIORITY, SIZE_SIGNIFICANT_RESIZE, SIZE_SIMILARITY_THRESHOLD, SIZE_UNIFORM_TOLERANCE,
};
use crate::edges::edge_bounds;
use crate::region::{AnalysisContext, DifferenceRegion};
use crate::stats::{
    content_bounds_by_background, gray_histogram, histogram_intersection, sample_background,
};

/// Content bounding box within a region crop, in crop coordinates.
#[derive(Debug, Clone, Copy)]
struct ContentBox {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

impl ContentBox {
    fn from_extrema((min_x, min_y, max_x, max_y): (usize, usize, usize, usize)) -> Self {
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }

    fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Locates the content box of one crop: edge extrema, then background
/// difference for content without internal gradients.
fn content_box(img: ImgRef<'_, RGBA8>) -> Option<ContentBox> {
    if let Some(extrema) = edge_bounds(img) {
        return Some(ContentBox::from_extrema(extrema));
    }
    let background = sample_background(img);
    content_bounds_by_background(img, background).map(ContentBox::from_extrema)
}

fn crop_content<'a>(img: ImgRef<'a, RGBA8>, b: &ContentBox) -> ImgRef<'a, RGBA8> {
    img.sub_image(b.x, b.y, b.width, b.height)
}

/// Raw expansion classification from the two relative dimension changes.
fn expansion_label(width_change: f32, height_change: f32) -> &'static str {
    let grew_w = width_change > SIZE_BOUNDARY_CHANGED;
    let grew_h = height_change > SIZE_BOUNDARY_CHANGED;
    let shrank_w = width_change < -SIZE_BOUNDARY_CHANGED;
    let shrank_h = height_change < -SIZE_BOUNDARY_CHANGED;
    if (grew_w || grew_h) && (shrank_w || shrank_h) {
        "stretch"
    } else if grew_w || grew_h {
        "expand"
    } else if shrank_w || shrank_h {
        "shrink"
    } else {
        "none"
    }
}

/// Classifies regions where the content's bounding box changed dimensions.
#[derive(Debug, Clone)]
pub struct SizeClassifier {
    priority: i32,
}

impl SizeClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            priority: SIZE_PRIORITY,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Default for SizeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionClassifier for SizeClassifier {
    fn name(&self) -> &'static str {
        "size"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_classify(&self, region: &DifferenceRegion, _ctx: &AnalysisContext<'_>) -> bool {
        region.difference_percentage >= SIZE_MIN_DIFF_PCT
            && region.difference_percentage <= SIZE_MAX_DIFF_PCT
    }

    fn classify(
        &self,
        region: &DifferenceRegion,
        ctx: &AnalysisContext<'_>,
    ) -> Option<ClassificationResult> {
        let (original, compared) = ctx.crop(&region.bounds);

        let box_original = content_box(original)?;
        let box_compared = content_box(compared)?;

        let width_change =
            (box_compared.width as f32 - box_original.width as f32) / box_original.width as f32;
        let height_change =
            (box_compared.height as f32 - box_original.height as f32) / box_original.height as f32;
        let aspect_change = (box_compared.aspect() - box_original.aspect()).abs();
        let uniform_scale = (width_change - height_change).abs() < SIZE_UNIFORM_TOLERANCE;

        let content_similarity = histogram_intersection(
            &gray_histogram(crop_content(original, &box_original)),
            &gray_histogram(crop_content(compared, &box_compared)),
        );

        let boundary_changed = width_change.abs() > SIZE_BOUNDARY_CHANGED
            || height_change.abs() > SIZE_BOUNDARY_CHANGED;

        let mut confidence = 0.0f32;
        if boundary_changed {
            confidence += 0.3;
        }
        if content_similarity > SIZE_SIMILARITY_THRESHOLD {
            confidence += 0.3;
        }
        if width_change.abs() > SIZE_SIGNIFICANT_RESIZE {
            confidence += 0.15;
        }
        if height_change.abs() > SIZE_SIGNIFICANT_RESIZE {
            confidence += 0.15;
        }
        if uniform_scale && boundary_changed {
            confidence += 0.1;
        }
        if aspect_change > SIZE_ASPECT_CHANGED && !uniform_scale {
            confidence *= SIZE_ASPECT_DISCOUNT;
        }
        if region.difference_percentage > SIZE_HIGH_DIFF_PCT {
            confidence *= SIZE_HIGH_DIFF_DISCOUNT;
        }
        let confidence = confidence.min(1.0);

        let mean_change = (width_change + height_change) / 2.0;
        let sub_type = if uniform_scale && mean_change > SIZE_BOUNDARY_CHANGED {
            "scale-up"
        } else if uniform_scale && mean_change < -SIZE_BOUNDARY_CHANGED {
            "scale-down"
        } else if width_change.abs() >= SIZE_AXIS_DOMINANCE * height_change.abs()
            && width_change.abs() > SIZE_BOUNDARY_CHANGED
        {
            "horizontal-resize"
        } else if height_change.abs() >= SIZE_AXIS_DOMINANCE * width_change.abs()
            && height_change.abs() > SIZE_BOUNDARY_CHANGED
        {
            "vertical-resize"
        } else if aspect_change > SIZE_ASPECT_CHANGED {
            "aspect-change"
        } else {
            expansion_label(width_change, height_change)
        };

        Some(
            ClassificationResult::new(DifferenceType::Size, confidence)
                .with_sub_type(sub_type)
                .with_details(ClassificationDetails::Size {
                    width_change,
                    height_change,
                    aspect_change,
                    uniform_scale,
                    content_similarity,
                }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Bounds;
    use imgref::Img;

    fn rgba(v: u8) -> RGBA8 {
        RGBA8::new(v, v, v, 255)
    }

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
    fn test_content_box_via_edges() {
        let img = canvas_with_box(40, 40, 10, 12, 16, 10, 80);
        let b = content_box(img.as_ref()).unwrap();
        // Sobel extrema straddle the contour by a pixel on each side.
        assert!((b.width as i32 - 18).abs() <= 2, "width {}", b.width);
        assert!((b.height as i32 - 12).abs() <= 2, "height {}", b.height);
    }

    #[test]
    fn test_content_box_background_fallback() {
        // Low-contrast content below the Sobel threshold: a 244-vs-255
        // step peaks at gradient magnitude ~47 but has a summed color
        // delta of 33 against the sampled background.
        let img = canvas_with_box(40, 40, 8, 8, 10, 20, 244);
        let b = content_box(img.as_ref()).unwrap();
        assert_eq!((b.x, b.y, b.width, b.height), (8, 8, 10, 20));
    }

    #[test]
    fn test_crop_content_view() {
        let img = canvas_with_box(40, 40, 10, 12, 16, 10, 80);
        let b = content_box(img.as_ref()).unwrap();
        let view = crop_content(img.as_ref(), &b);
        assert_eq!(view.width(), b.width);
        assert_eq!(view.height(), b.height);
        // The view borrows from the original image, so both stay usable.
        assert_eq!(img.as_ref().width(), 40);
    }

    #[test]
    fn test_empty_region_yields_no_classification() {
        let img = Img::new(vec![rgba(255); 40 * 40], 40, 40);
        let ctx = AnalysisContext::new(img.as_ref(), img.as_ref()).unwrap();
        let region = DifferenceRegion::new(1, Bounds::new(0, 0, 40, 40), 1600, 160, 10.0);
        assert!(SizeClassifier::new().classify(&region, &ctx).is_none());
    }

    #[test]
    fn test_uniform_scale_up() {
        let original = canvas_with_box(80, 80, 30, 30, 20, 20, 200);
        let compared = canvas_with_box(80, 80, 25, 25, 30, 30, 200);
        let ctx = AnalysisContext::new(original.as_ref(), compared.as_ref()).unwrap();
        let region = DifferenceRegion::new(1, Bounds::new(18, 18, 44, 44), 1936, 500, 25.8);

        let result = SizeClassifier::new().classify(&region, &ctx).unwrap();
        assert_eq!(result.kind, DifferenceType::Size);
        assert_eq!(result.sub_type.as_deref(), Some("scale-up"));
        assert!(result.confidence > 0.5, "got {}", result.confidence);
        match result.details {
            Some(ClassificationDetails::Size {
                width_change,
                height_change,
                uniform_scale,
                ..
            }) => {
                assert!((width_change - 0.5).abs() < 0.15, "got {width_change}");
                assert!((height_change - 0.5).abs() < 0.15, "got {height_change}");
                assert!(uniform_scale);
            }
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn test_unchanged_box_earns_no_uniform_bonus() {
        // Identical content boxes are trivially uniform; only the content
        // similarity bonus may apply, keeping the verdict below the floor.
        let original = canvas_with_box(80, 80, 30, 30, 20, 20, 200);
        let compared = canvas_with_box(80, 80, 30, 30, 20, 20, 120);
        let ctx = AnalysisContext::new(original.as_ref(), compared.as_ref()).unwrap();
        let region = DifferenceRegion::new(1, Bounds::new(25, 25, 30, 30), 900, 400, 44.4);

        let result = SizeClassifier::new().classify(&region, &ctx).unwrap();
        match result.details {
            Some(ClassificationDetails::Size {
                width_change,
                height_change,
                uniform_scale,
                ..
            }) => {
                assert!(uniform_scale);
                assert!(width_change.abs() < 0.05, "got {width_change}");
                assert!(height_change.abs() < 0.05, "got {height_change}");
            }
            other => panic!("unexpected details: {other:?}"),
        }
        assert!(result.confidence <= 0.3 + 1e-6, "got {}", result.confidence);
    }

    #[test]
    fn test_horizontal_resize() {
        let original = canvas_with_box(80, 80, 20, 30, 20, 20, 80);
        let compared = canvas_with_box(80, 80, 20, 30, 36, 20, 80);
        let ctx = AnalysisContext::new(original.as_ref(), compared.as_ref()).unwrap();
        let region = DifferenceRegion::new(1, Bounds::new(15, 25, 50, 30), 1500, 320, 21.3);

        let result = SizeClassifier::new().classify(&region, &ctx).unwrap();
        assert_eq!(result.sub_type.as_deref(), Some("horizontal-resize"));
        match result.details {
            Some(ClassificationDetails::Size {
                width_change,
                height_change,
                ..
            }) => {
                assert!(width_change > 0.5, "got {width_change}");
                assert!(height_change.abs() < 0.1, "got {height_change}");
            }
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn test_expansion_labels() {
        assert_eq!(expansion_label(0.3, 0.3), "expand");
        assert_eq!(expansion_label(-0.3, -0.2), "shrink");
        assert_eq!(expansion_label(0.3, -0.3), "stretch");
        assert_eq!(expansion_label(0.0, 0.01), "none");
    }
}
