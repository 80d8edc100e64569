//! Style classifier: same structure, different paint.
//!
//! Works from the average color of each side converted to
//! hue/saturation/lightness, plus a luminance-spread contrast signal and an
//! edge-preservation ratio. Preserved edges are the key tell: a theme or
//! palette change repaints pixels without moving any contours.

use crate::classifier::{
    ClassificationDetails, ClassificationResult, DifferenceType, RegionClassifier,
};
use crate::consts::{
    STYLE_BRIGHTNESS_LARGE, STYLE_BRIGHTNESS_MODERATE, STYLE_CONTRAST_SIGNIFICANT,
    STYLE_EDGE_PRESERVED_PARTIAL, STYLE_EDGE_PRESERVED_STRONG, STYLE_HUE_SHIFT_LARGE,
    STYLE_HUE_SHIFT_MODERATE, STYLE_MIN_DIFF_PCT, STYLE_PRIORITY, STYLE_SATURATION_SIGNIFICANT,
    STYLE_SHIFT_NONZERO, STYLE_SHIFT_SUBTLE, STYLE_THEME_EDGE_PRESERVATION,
};
use crate::edges::{detect_edges, edge_count_ratio};
use crate::region::{AnalysisContext, DifferenceRegion};
use crate::stats::{color_stats, luminance_spread};

/// Hue (degrees), saturation and lightness of a color, all from sRGB bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

/// Standard RGB-to-HSL conversion on byte channels.
pub(crate) fn rgb_to_hsl(r: f32, g: f32, b: f32) -> Hsl {
    let r = r / 255.0;
    let g = g / 255.0;
    let b = b / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let lightness = (max + min) / 2.0;

    if delta < f32::EPSILON {
        return Hsl {
            hue: 0.0,
            saturation: 0.0,
            lightness,
        };
    }

    let saturation = delta / (1.0 - (2.0 * lightness - 1.0).abs());
    let hue = if (max - r).abs() < f32::EPSILON {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if (max - g).abs() < f32::EPSILON {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    Hsl {
        hue,
        saturation,
        lightness,
    }
}

/// Circular hue distance in degrees, in `[0, 180]`.
pub(crate) fn hue_distance(a: f32, b: f32) -> f32 {
    let diff = (a - b).abs() % 360.0;
    diff.min(360.0 - diff)
}

/// Classifies regions whose structure survived a repaint.
#[derive(Debug, Clone)]
pub struct StyleClassifier {
    priority: i32,
}

impl StyleClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            priority: STYLE_PRIORITY,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Default for StyleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionClassifier for StyleClassifier {
    fn name(&self) -> &'static str {
        "style"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_classify(&self, region: &DifferenceRegion, _ctx: &AnalysisContext<'_>) -> bool {
        region.difference_percentage >= STYLE_MIN_DIFF_PCT
    }

    fn classify(
        &self,
        region: &DifferenceRegion,
        ctx: &AnalysisContext<'_>,
    ) -> Option<ClassificationResult> {
        let (original, compared) = ctx.crop(&region.bounds);

        let stats_original = color_stats(original);
        let stats_compared = color_stats(compared);
        let hsl_original = rgb_to_hsl(
            stats_original.avg[0],
            stats_original.avg[1],
            stats_original.avg[2],
        );
        let hsl_compared = rgb_to_hsl(
            stats_compared.avg[0],
            stats_compared.avg[1],
            stats_compared.avg[2],
        );

        let brightness_change = (hsl_original.lightness - hsl_compared.lightness).abs();
        let hue_shift = hue_distance(hsl_original.hue, hsl_compared.hue);
        let saturation_change = (hsl_original.saturation - hsl_compared.saturation).abs();
        let contrast_change = (luminance_spread(original) - luminance_spread(compared)).abs();

        let edges_original = detect_edges(original);
        let edges_compared = detect_edges(compared);
        let edge_preservation =
            edge_count_ratio(edges_original.edge_count, edges_compared.edge_count);

        let total_shift =
            brightness_change + saturation_change + hue_shift / 360.0 + contrast_change;

        let mut confidence = 0.0f32;
        if edge_preservation > STYLE_EDGE_PRESERVED_STRONG {
            confidence += 0.4;
        } else if edge_preservation > STYLE_EDGE_PRESERVED_PARTIAL {
            confidence += 0.2;
        }
        if brightness_change > STYLE_BRIGHTNESS_LARGE {
            confidence += 0.2;
        } else if brightness_change > STYLE_BRIGHTNESS_MODERATE {
            confidence += 0.1;
        }
        if hue_shift > STYLE_HUE_SHIFT_LARGE {
            confidence += 0.2;
        } else if hue_shift > STYLE_HUE_SHIFT_MODERATE {
            confidence += 0.1;
        }
        if saturation_change > STYLE_SATURATION_SIGNIFICANT {
            confidence += 0.1;
        }
        if contrast_change > STYLE_CONTRAST_SIGNIFICANT {
            confidence += 0.1;
        }
        if total_shift > STYLE_SHIFT_NONZERO {
            confidence += 0.1;
        }
        let confidence = confidence.min(1.0);

        let sub_type = if brightness_change > STYLE_BRIGHTNESS_LARGE
            && edge_preservation > STYLE_THEME_EDGE_PRESERVATION
        {
            "theme"
        } else if hue_shift > STYLE_HUE_SHIFT_LARGE {
            "color-scheme"
        } else if saturation_change > STYLE_SATURATION_SIGNIFICANT {
            "saturation"
        } else if contrast_change > STYLE_CONTRAST_SIGNIFICANT {
            "contrast"
        } else if total_shift >= STYLE_SHIFT_SUBTLE {
            "color-adjustment"
        } else {
            "subtle"
        };

        Some(
            ClassificationResult::new(DifferenceType::Style, confidence)
                .with_sub_type(sub_type)
                .with_details(ClassificationDetails::Style {
                    brightness_change,
                    hue_shift,
                    saturation_change,
                    contrast_change,
                    edge_preservation,
                    total_shift,
                }),
        )
    }
}
