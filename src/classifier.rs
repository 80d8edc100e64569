//! The classifier contract and its result types.
//!
//! Every heuristic implements [`RegionClassifier`]: a cheap applicability
//! check followed by a full analysis. Classifiers are stateless beyond
//! their fixed name and priority, so instances are freely shared across
//! runs and threads.

use serde::{Deserialize, Serialize};

use crate::region::{AnalysisContext, DifferenceRegion};

/// Closed set of semantic change categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceType {
    Content,
    Style,
    Layout,
    Size,
    Structural,
    NewElement,
    RemovedElement,
    Unknown,
}

impl DifferenceType {
    /// The wire/tag form of the category.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Style => "style",
            Self::Layout => "layout",
            Self::Size => "size",
            Self::Structural => "structural",
            Self::NewElement => "new_element",
            Self::RemovedElement => "removed_element",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DifferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-classifier diagnostic payload attached to a result.
///
/// Serializes untagged: consumers see a flat `details` object whose fields
/// identify the producing heuristic (`shiftX`, `isAddition`, `widthChange`,
/// ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClassificationDetails {
    #[serde(rename_all = "camelCase")]
    Content {
        edge_density_original: f32,
        edge_density_compared: f32,
        edge_density_change: f32,
        color_variance_change: f32,
        dominant_color_change: f32,
    },
    #[serde(rename_all = "camelCase")]
    Style {
        brightness_change: f32,
        hue_shift: f32,
        saturation_change: f32,
        contrast_change: f32,
        edge_preservation: f32,
        total_shift: f32,
    },
    #[serde(rename_all = "camelCase")]
    Layout {
        shift_x: i32,
        shift_y: i32,
        shift_distance: f32,
        shift_consistent: bool,
        structural_similarity: f32,
        edge_alignment: f32,
    },
    #[serde(rename_all = "camelCase")]
    Size {
        width_change: f32,
        height_change: f32,
        aspect_change: f32,
        uniform_scale: bool,
        content_similarity: f32,
    },
    #[serde(rename_all = "camelCase")]
    Structural {
        is_addition: bool,
        is_removal: bool,
        is_partial_change: bool,
        density_original: f32,
        density_compared: f32,
        coverage_change: f32,
        pattern: String,
    },
    #[serde(rename_all = "camelCase")]
    Unclassified { reason: String },
}

/// A typed, confidence-scored explanation of one region's difference.
///
/// Confidence is an ordinal heuristic score in `[0, 1]`, not a calibrated
/// probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    #[serde(rename = "type")]
    pub kind: DifferenceType,
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ClassificationDetails>,
}

impl ClassificationResult {
    #[must_use]
    pub fn new(kind: DifferenceType, confidence: f32) -> Self {
        Self {
            kind,
            confidence: confidence.clamp(0.0, 1.0),
            sub_type: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_sub_type(mut self, sub_type: impl Into<String>) -> Self {
        self.sub_type = Some(sub_type.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: ClassificationDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// The synthetic result for a region no classifier could explain.
    #[must_use]
    pub fn unknown(reason: impl Into<String>) -> Self {
        Self::new(DifferenceType::Unknown, 0.0).with_details(ClassificationDetails::Unclassified {
            reason: reason.into(),
        })
    }
}

/// A heuristic strategy mapping a region plus context to a typed,
/// confidence-scored explanation.
///
/// `can_classify` is the cheap applicability gate; `classify` runs the full
/// analysis and may still return `None` when its own signals are too weak
/// to stand behind. Implementations hold no per-call mutable state.
pub trait RegionClassifier: Send + Sync {
    /// Stable name, recorded on winning classifications.
    fn name(&self) -> &'static str;

    /// Ordering key; higher-priority classifiers are consulted first.
    fn priority(&self) -> i32;

    /// Cheap applicability check, typically on the region statistics alone.
    fn can_classify(&self, region: &DifferenceRegion, ctx: &AnalysisContext<'_>) -> bool;

    /// Full analysis. Returned confidences are always within `[0, 1]`.
    fn classify(
        &self,
        region: &DifferenceRegion,
        ctx: &AnalysisContext<'_>,
    ) -> Option<ClassificationResult>;
}
