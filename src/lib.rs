//! # Diffsense
//!
//! Diffsense explains *why* two renderings of the same UI differ. Given a
//! pair of RGBA images and the difference regions an upstream pixel diff
//! produced, it classifies each region as a content, style, layout, size or
//! structural change, with a confidence score and type-specific detail.
//!
//! ## Classifiers
//!
//! - Structural: something was added, removed or rebuilt
//! - Layout: content moved without changing appearance
//! - Content: text or imagery changed in place
//! - Style: colors changed while structure stayed put
//! - Size: an element grew or shrank
//!
//! Classifiers are consulted in descending priority order; the first verdict
//! at or above the confidence floor (0.5 by default) wins, and regions
//! nothing can explain resolve to `unknown`.
//!
//! ## Example
//!
//! ```rust
//! use diffsense::{AnalysisContext, Bounds, ClassifierManager, DifferenceRegion, DifferenceType};
//! use imgref::Img;
//! use rgb::RGBA8;
//!
//! let before = Img::new(vec![RGBA8::new(255, 255, 255, 255); 40 * 40], 40, 40);
//! let after = before.clone();
//! let ctx = AnalysisContext::new(before.as_ref(), after.as_ref())?;
//!
//! let region = DifferenceRegion::new(1, Bounds::new(0, 0, 40, 40), 1600, 0, 0.0);
//! let manager = ClassifierManager::with_default_classifiers();
//! let resolved = manager.classify_region(&region, &ctx);
//! assert_eq!(resolved.classification.kind, DifferenceType::Unknown);
//! # Ok::<(), diffsense::ClassificationError>(())
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

// Module structure
mod classifier;
mod consts;
mod content;
mod edges;
mod layout;
mod manager;
mod region;
mod registry;
mod size;
mod stats;
mod structural;
mod style;

// Re-export main types and functions
pub use crate::classifier::{
    ClassificationDetails, ClassificationResult, DifferenceType, RegionClassifier,
};
pub use crate::content::ContentClassifier;
pub use crate::edges::{detect_edges, edge_bounds, EdgeStats};
pub use crate::layout::LayoutClassifier;
pub use crate::manager::{
    ClassificationSummary, ClassifierManager, ConfidenceStats, RegionClassification, TypeCounts,
};
pub use crate::region::{AnalysisContext, Bounds, DifferenceRegion};
pub use crate::registry::{ClassifierConstructor, ClassifierOptions, ClassifierRegistry};
pub use crate::size::SizeClassifier;
pub use crate::stats::{color_stats, ColorStats, DominantColor};
pub use crate::structural::StructuralClassifier;
pub use crate::style::StyleClassifier;

/// Errors from context construction and manager configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationError {
    /// The two images do not share the same dimensions.
    DimensionMismatch {
        w1: usize,
        h1: usize,
        w2: usize,
        h2: usize,
    },
    /// A raw RGBA buffer does not match the stated dimensions.
    BufferSizeMismatch { expected: usize, actual: usize },
    /// A confidence threshold outside `[0.0, 1.0]`.
    InvalidConfidenceThreshold { value: f32 },
}

impl std::fmt::Display for ClassificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DimensionMismatch { w1, h1, w2, h2 } => {
                write!(f, "image dimensions differ: {w1}x{h1} vs {w2}x{h2}")
            }
            Self::BufferSizeMismatch { expected, actual } => write!(
                f,
                "RGBA buffer size mismatch: expected {expected} bytes, got {actual}"
            ),
            Self::InvalidConfidenceThreshold { value } => {
                write!(f, "confidence threshold {value} is outside [0.0, 1.0]")
            }
        }
    }
}

impl std::error::Error for ClassificationError {}
