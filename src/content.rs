//! Content classifier: did the material inside the region change?
//!
//! Compares color statistics and edge density between the two sides of a
//! region. A content swap shows up as a change in structure (edge density)
//! or palette (dominant colors), while a recolor of the same structure
//! deliberately scores low here and falls through to the style classifier.

use crate::classifier::{
    ClassificationDetails, ClassificationResult, DifferenceType, RegionClassifier,
};
use crate::consts::{
    CONTENT_DOMINANT_CHANGE_SIGNIFICANT, CONTENT_EDGE_CHANGE_HIGH,
    CONTENT_EDGE_CHANGE_SIGNIFICANT, CONTENT_IMAGE_EDGE_DENSITY, CONTENT_LARGE_PIXEL_COUNT,
    CONTENT_MIN_CONFIDENCE, CONTENT_MIN_DIFF_PCT, CONTENT_PRIORITY, CONTENT_SOLID_EDGE_DENSITY,
    CONTENT_TEXT_EDGE_DENSITY, CONTENT_VARIANCE_HIGH,
};
use crate::edges::detect_edges;
use crate::region::{AnalysisContext, DifferenceRegion};
use crate::stats::{color_stats, dominant_color_change};

/// Classifies regions where the content itself changed.
#[derive(Debug, Clone)]
pub struct ContentClassifier {
    priority: i32,
}

impl ContentClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            priority: CONTENT_PRIORITY,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionClassifier for ContentClassifier {
    fn name(&self) -> &'static str {
        "content"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_classify(&self, region: &DifferenceRegion, _ctx: &AnalysisContext<'_>) -> bool {
        region.difference_percentage >= CONTENT_MIN_DIFF_PCT
    }

    fn classify(
        &self,
        region: &DifferenceRegion,
        ctx: &AnalysisContext<'_>,
    ) -> Option<ClassificationResult> {
        let (original, compared) = ctx.crop(&region.bounds);

        let stats_original = color_stats(original);
        let stats_compared = color_stats(compared);
        let edges_original = detect_edges(original);
        let edges_compared = detect_edges(compared);

        let edge_density_change =
            (edges_original.edge_density - edges_compared.edge_density).abs();
        let color_variance_change = (stats_original.variance - stats_compared.variance).abs();
        let dominant_change =
            dominant_color_change(&stats_original.dominant, &stats_compared.dominant);

        let max_edge_density = edges_original.edge_density.max(edges_compared.edge_density);
        let max_variance = stats_original.variance.max(stats_compared.variance);

        let mut confidence = 0.0f32;
        if edge_density_change > CONTENT_EDGE_CHANGE_HIGH {
            confidence += 0.3;
        }
        if edge_density_change > CONTENT_EDGE_CHANGE_SIGNIFICANT {
            confidence += 0.2;
        }
        if max_variance > CONTENT_VARIANCE_HIGH {
            confidence += 0.2;
        }
        if dominant_change > CONTENT_DOMINANT_CHANGE_SIGNIFICANT {
            confidence += 0.2;
        }
        if region.pixel_count > CONTENT_LARGE_PIXEL_COUNT {
            confidence += 0.1;
        }
        if region.difference_percentage > 50.0 {
            confidence += 0.2;
        } else if region.difference_percentage > 30.0 {
            confidence += 0.1;
        }
        let confidence = confidence.min(1.0);
        if confidence < CONTENT_MIN_CONFIDENCE {
            return None;
        }

        let sub_type = if max_edge_density > CONTENT_TEXT_EDGE_DENSITY {
            "text"
        } else if max_variance > CONTENT_VARIANCE_HIGH
            && max_edge_density > CONTENT_IMAGE_EDGE_DENSITY
        {
            "image"
        } else if max_edge_density < CONTENT_SOLID_EDGE_DENSITY
            && dominant_change > CONTENT_DOMINANT_CHANGE_SIGNIFICANT
        {
            "solid"
        } else {
            "mixed"
        };

        Some(
            ClassificationResult::new(DifferenceType::Content, confidence)
                .with_sub_type(sub_type)
                .with_details(ClassificationDetails::Content {
                    edge_density_original: edges_original.edge_density,
                    edge_density_compared: edges_compared.edge_density,
                    edge_density_change,
                    color_variance_change,
                    dominant_color_change: dominant_change,
                }),
        )
    }
}
