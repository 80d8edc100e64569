//! Tuned thresholds for the classification heuristics.
//!
//! These values are ordinal knobs calibrated against example diff corpora,
//! not physically meaningful quantities. They are grouped by the component
//! that reads them; cross-classifier constants come first.

// ============================================================================
// Shared analysis primitives
// ============================================================================

/// Sobel gradient magnitude above which a pixel counts as an edge.
pub const EDGE_GRADIENT_THRESHOLD: f32 = 50.0;

/// Right-shift applied per channel when quantizing dominant colors
/// (16 buckets per channel).
pub const DOMINANT_QUANT_SHIFT: u8 = 4;

/// Number of dominant colors retained per region side.
pub const DOMINANT_COLOR_LIMIT: usize = 5;

/// Two dominant-color counts "match" when they differ by at most this
/// fraction of the larger count.
pub const DOMINANT_COUNT_TOLERANCE: f32 = 0.3;

/// Channel bucket size used when majority-voting a background color.
pub const BACKGROUND_QUANT_STEP: u8 = 10;

/// Summed RGB delta from the background above which a pixel is content.
pub const CONTENT_COLOR_DELTA: u32 = 30;

/// Alpha below this is treated as content regardless of color.
pub const CONTENT_ALPHA_OPAQUE: u8 = 250;

// ============================================================================
// Content classifier (priority 5)
// ============================================================================

pub const CONTENT_PRIORITY: i32 = 5;
/// Minimum difference percentage for applicability.
pub const CONTENT_MIN_DIFF_PCT: f32 = 5.0;
/// Edge-density change treated as high.
pub const CONTENT_EDGE_CHANGE_HIGH: f32 = 0.1;
/// Edge-density change treated as significant.
pub const CONTENT_EDGE_CHANGE_SIGNIFICANT: f32 = 0.05;
/// Per-side color variance treated as high.
pub const CONTENT_VARIANCE_HIGH: f32 = 1500.0;
/// Dominant-color change fraction treated as significant.
pub const CONTENT_DOMINANT_CHANGE_SIGNIFICANT: f32 = 0.4;
/// Region pixel count treated as large.
pub const CONTENT_LARGE_PIXEL_COUNT: u32 = 10_000;
/// Results below this confidence are discarded by the classifier itself.
pub const CONTENT_MIN_CONFIDENCE: f32 = 0.3;
/// Edge density above which a side reads as text.
pub const CONTENT_TEXT_EDGE_DENSITY: f32 = 0.3;
/// Edge density above which high variance reads as image content.
pub const CONTENT_IMAGE_EDGE_DENSITY: f32 = 0.15;
/// Edge density below which a color change reads as a solid fill.
pub const CONTENT_SOLID_EDGE_DENSITY: f32 = 0.05;

// ============================================================================
// Style classifier (priority 4)
// ============================================================================

pub const STYLE_PRIORITY: i32 = 4;
pub const STYLE_MIN_DIFF_PCT: f32 = 2.0;
/// Edge-count preservation ratio treated as strong structure preservation.
pub const STYLE_EDGE_PRESERVED_STRONG: f32 = 0.85;
/// Edge-count preservation ratio treated as partial structure preservation.
pub const STYLE_EDGE_PRESERVED_PARTIAL: f32 = 0.7;
/// Lightness delta tiers.
pub const STYLE_BRIGHTNESS_LARGE: f32 = 0.3;
pub const STYLE_BRIGHTNESS_MODERATE: f32 = 0.1;
/// Hue shift tiers, in degrees.
pub const STYLE_HUE_SHIFT_LARGE: f32 = 60.0;
pub const STYLE_HUE_SHIFT_MODERATE: f32 = 20.0;
pub const STYLE_SATURATION_SIGNIFICANT: f32 = 0.2;
pub const STYLE_CONTRAST_SIGNIFICANT: f32 = 0.2;
/// Total paint shift above this earns the nonzero-change baseline.
pub const STYLE_SHIFT_NONZERO: f32 = 0.01;
/// Total paint shift below this reads as a subtle adjustment.
pub const STYLE_SHIFT_SUBTLE: f32 = 0.05;
/// Edge preservation required for the theme sub-type.
pub const STYLE_THEME_EDGE_PRESERVATION: f32 = 0.6;

// ============================================================================
// Layout classifier (priority 6)
// ============================================================================

pub const LAYOUT_PRIORITY: i32 = 6;
pub const LAYOUT_MIN_DIFF_PCT: f32 = 10.0;
pub const LAYOUT_MAX_DIFF_PCT: f32 = 70.0;
/// Padding applied around the region before the shift search, in pixels.
pub const LAYOUT_SEARCH_PADDING: usize = 20;
/// Maximum shift magnitude searched per axis.
pub const LAYOUT_SHIFT_RANGE: i32 = 20;
/// Shift search stride per axis.
pub const LAYOUT_SHIFT_STRIDE: usize = 2;
/// Sample grid stride per axis when scoring a candidate shift.
pub const LAYOUT_SAMPLE_STRIDE: usize = 4;
/// Source pixels at or below this grayscale value are excluded from samples.
pub const LAYOUT_DARK_CUTOFF: f32 = 30.0;
/// Mean match score above which a shift can be consistent.
pub const LAYOUT_CONSISTENT_SCORE: f32 = 200.0;
/// A consistent shift must beat the null (zero) shift by this margin.
pub const LAYOUT_CONSISTENT_MARGIN: f32 = 5.0;
/// Histogram intersection above which the crops are structurally similar.
pub const LAYOUT_SIMILARITY_THRESHOLD: f32 = 0.7;
/// Edge-count ratio above which edges are considered aligned.
pub const LAYOUT_EDGE_ALIGNMENT_THRESHOLD: f32 = 0.7;
/// Shift magnitude above which the displacement is clearly noticeable.
pub const LAYOUT_NOTICEABLE_SHIFT: f32 = 5.0;
/// Shift magnitude below which the result is a micro-shift.
pub const LAYOUT_MICRO_SHIFT: f32 = 5.0;
/// Shift magnitude above which the result is a major shift.
pub const LAYOUT_MAJOR_SHIFT: f32 = 20.0;
/// One axis dominates when its magnitude exceeds this multiple of the other.
pub const LAYOUT_AXIS_DOMINANCE: f32 = 2.0;
/// Confidence discount above/below the comfortable difference band.
pub const LAYOUT_HIGH_DIFF_PCT: f32 = 60.0;
pub const LAYOUT_HIGH_DIFF_DISCOUNT: f32 = 0.7;
pub const LAYOUT_LOW_DIFF_PCT: f32 = 15.0;
pub const LAYOUT_LOW_DIFF_DISCOUNT: f32 = 0.8;

// ============================================================================
// Size classifier (priority 3)
// ============================================================================

pub const SIZE_PRIORITY: i32 = 3;
pub const SIZE_MIN_DIFF_PCT: f32 = 5.0;
pub const SIZE_MAX_DIFF_PCT: f32 = 80.0;
/// Relative dimension change above which the content boundary moved at all.
pub const SIZE_BOUNDARY_CHANGED: f32 = 0.05;
/// Relative dimension change treated as a significant resize.
pub const SIZE_SIGNIFICANT_RESIZE: f32 = 0.1;
/// Width/height changes within this of each other count as uniform scaling.
pub const SIZE_UNIFORM_TOLERANCE: f32 = 0.1;
/// Aspect-ratio delta above which the shape itself changed.
pub const SIZE_ASPECT_CHANGED: f32 = 0.2;
/// Histogram intersection above which content survived the resize.
pub const SIZE_SIMILARITY_THRESHOLD: f32 = 0.7;
/// One axis dominates a resize at this multiple of the other.
pub const SIZE_AXIS_DOMINANCE: f32 = 2.0;
/// Discount for an aspect change that is not a uniform scale.
pub const SIZE_ASPECT_DISCOUNT: f32 = 0.8;
/// Discount when the difference percentage is suspiciously high.
pub const SIZE_HIGH_DIFF_PCT: f32 = 70.0;
pub const SIZE_HIGH_DIFF_DISCOUNT: f32 = 0.7;

// ============================================================================
// Structural classifier (priority 7, evaluated first)
// ============================================================================

pub const STRUCTURAL_PRIORITY: i32 = 7;
pub const STRUCTURAL_MIN_DIFF_PCT: f32 = 30.0;
/// Content density above which a side is populated.
pub const STRUCTURAL_MIN_CONTENT_DENSITY: f32 = 0.05;
/// Edge count above which a side is populated.
pub const STRUCTURAL_MIN_EDGE_COUNT: u32 = 10;
/// Base confidence for a clean addition or removal.
pub const STRUCTURAL_ADD_REMOVE_BASE: f32 = 0.5;
/// Content density change treated as significant.
pub const STRUCTURAL_DENSITY_CHANGE: f32 = 0.5;
/// Content coverage change treated as significant.
pub const STRUCTURAL_COVERAGE_CHANGE: f32 = 0.5;
/// Densities delimiting a clean empty-to-populated transition.
pub const STRUCTURAL_CLEAN_EMPTY: f32 = 0.02;
pub const STRUCTURAL_CLEAN_POPULATED: f32 = 0.1;
/// Discount for changes where both sides keep content.
pub const STRUCTURAL_PARTIAL_DISCOUNT: f32 = 0.7;
/// Bonus above this difference percentage.
pub const STRUCTURAL_LARGE_DIFF_PCT: f32 = 70.0;
/// Content density above which a quadrant counts as occupied.
pub const STRUCTURAL_QUADRANT_OCCUPIED: f32 = 0.25;
/// Edge density above which added/removed content reads as text.
pub const STRUCTURAL_TEXT_EDGE_DENSITY: f32 = 0.2;

// ============================================================================
// Manager
// ============================================================================

/// Default confidence threshold for accepting a classification.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;
