//! Structural classifier: something appeared or disappeared.
//!
//! Evaluated first by priority: a wholesale addition or removal should not
//! be explained away as a subtler style or size change. Each side of the
//! region is reduced to a content mask against its sampled background; the
//! empty/populated combination decides addition, removal or partial change,
//! and a quadrant occupancy pattern picks the sub-type.

use imgref::ImgRef;
use rgb::RGBA8;

use crate::classifier::{
    ClassificationDetails, ClassificationResult, DifferenceType, RegionClassifier,
};
use crate::consts::{
    STRUCTURAL_ADD_REMOVE_BASE, STRUCTURAL_CLEAN_EMPTY, STRUCTURAL_CLEAN_POPULATED,
    STRUCTURAL_COVERAGE_CHANGE, STRUCTURAL_DENSITY_CHANGE, STRUCTURAL_LARGE_DIFF_PCT,
    STRUCTURAL_MIN_CONTENT_DENSITY, STRUCTURAL_MIN_DIFF_PCT, STRUCTURAL_MIN_EDGE_COUNT,
    STRUCTURAL_PARTIAL_DISCOUNT, STRUCTURAL_PRIORITY, STRUCTURAL_QUADRANT_OCCUPIED,
    STRUCTURAL_TEXT_EDGE_DENSITY,
};
use crate::edges::detect_edges;
use crate::region::{AnalysisContext, DifferenceRegion};
use crate::stats::{is_content_pixel, sample_background};

/// Spatial arrangement of content within a region's four quadrants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OccupancyPattern {
    /// All four quadrants occupied.
    Full,
    /// Only the top pair or only the bottom pair occupied.
    Horizontal,
    /// Only the left pair or only the right pair occupied.
    Vertical,
    /// Exactly one quadrant occupied.
    Corner,
    /// Anything else, including diagonal pairs.
    Scattered,
}

impl OccupancyPattern {
    fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Corner => "corner",
            Self::Scattered => "scattered",
        }
    }
}

/// Content analysis of one side of a region.
#[derive(Debug, Clone)]
struct ContentPresence {
    /// Fraction of pixels that differ from the sampled background.
    density: f32,
    /// Fraction of the crop area covered by the content bounding box.
    coverage: f32,
    /// Sobel edge count of the crop.
    edge_count: u32,
    /// Sobel edge density of the crop.
    edge_density: f32,
    /// Per-quadrant content densities: TL, TR, BL, BR.
    quadrants: [f32; 4],
}

impl ContentPresence {
    /// A side is populated when enough pixels or edges stand out from the
    /// background.
    fn has_content(&self) -> bool {
        self.density > STRUCTURAL_MIN_CONTENT_DENSITY
            || self.edge_count > STRUCTURAL_MIN_EDGE_COUNT
    }

    fn occupancy(&self) -> OccupancyPattern {
        let occupied: Vec<bool> = self
            .quadrants
            .iter()
            .map(|&d| d > STRUCTURAL_QUADRANT_OCCUPIED)
            .collect();
        let count = occupied.iter().filter(|&&o| o).count();
        let (tl, tr, bl, br) = (occupied[0], occupied[1], occupied[2], occupied[3]);
        match count {
            4 => OccupancyPattern::Full,
            2 if (tl && tr) || (bl && br) => OccupancyPattern::Horizontal,
            2 if (tl && bl) || (tr && br) => OccupancyPattern::Vertical,
            1 => OccupancyPattern::Corner,
            _ => OccupancyPattern::Scattered,
        }
    }
}

/// Measures content presence for one crop against its own background.
fn content_presence(img: ImgRef<'_, RGBA8>) -> ContentPresence {
    let width = img.width();
    let height = img.height();
    let total = width * height;
    if total == 0 {
        return ContentPresence {
            density: 0.0,
            coverage: 0.0,
            edge_count: 0,
            edge_density: 0.0,
            quadrants: [0.0; 4],
        };
    }

    let background = sample_background(img);
    let half_w = width / 2;
    let half_h = height / 2;

    let mut content = 0u32;
    let mut quadrant_content = [0u32; 4];
    let mut bbox: Option<(usize, usize, usize, usize)> = None;
    for (y, row) in img.rows().enumerate() {
        for (x, &px) in row.iter().enumerate() {
            if is_content_pixel(px, background) {
                content += 1;
                let qx = usize::from(x >= half_w);
                let qy = usize::from(y >= half_h);
                quadrant_content[qy * 2 + qx] += 1;
                bbox = Some(match bbox {
                    None => (x, y, x, y),
                    Some((min_x, min_y, max_x, max_y)) => {
                        (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                    }
                });
            }
        }
    }

    let coverage = bbox.map_or(0.0, |(min_x, min_y, max_x, max_y)| {
        ((max_x - min_x + 1) * (max_y - min_y + 1)) as f32 / total as f32
    });

    // Quadrant areas differ by a pixel row/column when dimensions are odd.
    let quadrant_area = |qx: usize, qy: usize| -> f32 {
        let w = if qx == 0 { half_w } else { width - half_w };
        let h = if qy == 0 { half_h } else { height - half_h };
        (w * h).max(1) as f32
    };
    let mut quadrants = [0.0f32; 4];
    for qy in 0..2 {
        for qx in 0..2 {
            quadrants[qy * 2 + qx] = quadrant_content[qy * 2 + qx] as f32 / quadrant_area(qx, qy);
        }
    }

    let edges = detect_edges(img);
    ContentPresence {
        density: content as f32 / total as f32,
        coverage,
        edge_count: edges.edge_count,
        edge_density: edges.edge_density,
        quadrants,
    }
}

/// Classifies regions where content was added, removed or rebuilt.
#[derive(Debug, Clone)]
pub struct StructuralClassifier {
    priority: i32,
}

impl StructuralClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            priority: STRUCTURAL_PRIORITY,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Default for StructuralClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionClassifier for StructuralClassifier {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_classify(&self, region: &DifferenceRegion, _ctx: &AnalysisContext<'_>) -> bool {
        region.difference_percentage >= STRUCTURAL_MIN_DIFF_PCT
    }

    fn classify(
        &self,
        region: &DifferenceRegion,
        ctx: &AnalysisContext<'_>,
    ) -> Option<ClassificationResult> {
        let (original, compared) = ctx.crop(&region.bounds);

        let presence_original = content_presence(original);
        let presence_compared = content_presence(compared);
        let original_populated = presence_original.has_content();
        let compared_populated = presence_compared.has_content();

        let is_addition = !original_populated && compared_populated;
        let is_removal = original_populated && !compared_populated;
        let is_partial_change = original_populated && compared_populated;

        let density_change = (presence_original.density - presence_compared.density).abs();
        let coverage_change = (presence_original.coverage - presence_compared.coverage).abs();
        let min_density = presence_original.density.min(presence_compared.density);
        let max_density = presence_original.density.max(presence_compared.density);
        let clean_transition =
            min_density < STRUCTURAL_CLEAN_EMPTY && max_density > STRUCTURAL_CLEAN_POPULATED;

        let mut confidence = 0.0f32;
        if is_addition || is_removal {
            confidence += STRUCTURAL_ADD_REMOVE_BASE;
        }
        if density_change > STRUCTURAL_DENSITY_CHANGE {
            confidence += 0.2;
        }
        if coverage_change > STRUCTURAL_COVERAGE_CHANGE {
            confidence += 0.2;
        }
        if clean_transition {
            confidence += 0.2;
        }
        if is_partial_change {
            confidence *= STRUCTURAL_PARTIAL_DISCOUNT;
        }
        if region.difference_percentage > STRUCTURAL_LARGE_DIFF_PCT {
            confidence += 0.1;
        }
        let confidence = confidence.min(1.0);

        // The populated side drives the pattern; for partial changes the
        // compared side is what the user will be looking at.
        let subject = if is_removal {
            &presence_original
        } else {
            &presence_compared
        };
        let pattern = subject.occupancy();
        let kind = if subject.edge_density > STRUCTURAL_TEXT_EDGE_DENSITY {
            "text"
        } else if pattern == OccupancyPattern::Full {
            "block"
        } else {
            "element"
        };
        let sub_type = if is_addition {
            format!("new-{kind}")
        } else if is_removal {
            format!("removed-{kind}")
        } else {
            "partial".to_owned()
        };

        Some(
            ClassificationResult::new(DifferenceType::Structural, confidence)
                .with_sub_type(sub_type)
                .with_details(ClassificationDetails::Structural {
                    is_addition,
                    is_removal,
                    is_partial_change,
                    density_original: presence_original.density,
                    density_compared: presence_compared.density,
                    coverage_change,
                    pattern: pattern.as_str().to_owned(),
                }),
        )
    }
}
