//! Region and context types consumed by every classification call.
//!
//! A `DifferenceRegion` is produced once per comparison by upstream
//! segmentation and is read-only here. An `AnalysisContext` pairs the two
//! aligned RGBA buffers for one comparison and is shared across all region
//! classifications in that run.

use imgref::ImgRef;
use rgb::{FromSlice, RGBA8};
use serde::{Deserialize, Serialize};

use crate::ClassificationError;

/// Rectangular pixel bounds within an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    #[must_use]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Area in pixels.
    #[inline]
    #[must_use]
    pub fn area(&self) -> u32 {
        self.width * self.height
    }
}

/// A rectangular area flagged by upstream diffing as containing pixel
/// differences, with summary statistics.
///
/// Invariants (maintained by the producer, relied upon here):
/// `difference_pixels <= pixel_count` and `difference_percentage` is the
/// percentage form of `difference_pixels / pixel_count`, in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifferenceRegion {
    pub id: u32,
    pub bounds: Bounds,
    pub pixel_count: u32,
    pub difference_pixels: u32,
    pub difference_percentage: f32,
}

impl DifferenceRegion {
    #[must_use]
    pub fn new(
        id: u32,
        bounds: Bounds,
        pixel_count: u32,
        difference_pixels: u32,
        difference_percentage: f32,
    ) -> Self {
        Self {
            id,
            bounds,
            pixel_count,
            difference_pixels,
            difference_percentage,
        }
    }
}

/// The paired original/compared pixel buffers supplied to every
/// classification call.
///
/// Both images must already be pixel-aligned and identically sized; the
/// constructor checks dimensions. Region bounds lying within the image
/// extent is a caller precondition: [`crop`](AnalysisContext::crop) panics
/// on out-of-range bounds rather than reading past the buffer.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    original: ImgRef<'a, RGBA8>,
    compared: ImgRef<'a, RGBA8>,
    diff_mask: Option<&'a [u8]>,
}

impl<'a> AnalysisContext<'a> {
    /// Creates a context from two equal-sized images.
    ///
    /// # Errors
    /// Returns [`ClassificationError::DimensionMismatch`] when the image
    /// dimensions differ.
    pub fn new(
        original: ImgRef<'a, RGBA8>,
        compared: ImgRef<'a, RGBA8>,
    ) -> Result<Self, ClassificationError> {
        if original.width() != compared.width() || original.height() != compared.height() {
            return Err(ClassificationError::DimensionMismatch {
                w1: original.width(),
                h1: original.height(),
                w2: compared.width(),
                h2: compared.height(),
            });
        }
        Ok(Self {
            original,
            compared,
            diff_mask: None,
        })
    }

    /// Creates a context from packed RGBA byte buffers (8 bits per channel).
    ///
    /// # Errors
    /// Returns [`ClassificationError::BufferSizeMismatch`] when a buffer is
    /// not `width * height * 4` bytes, or
    /// [`ClassificationError::DimensionMismatch`] via [`Self::new`].
    pub fn from_rgba_bytes(
        original: &'a [u8],
        compared: &'a [u8],
        width: usize,
        height: usize,
    ) -> Result<Self, ClassificationError> {
        let expected = width * height * 4;
        for buf in [original, compared] {
            if buf.len() != expected {
                return Err(ClassificationError::BufferSizeMismatch {
                    expected,
                    actual: buf.len(),
                });
            }
        }
        let original = ImgRef::new(original.as_rgba(), width, height);
        let compared = ImgRef::new(compared.as_rgba(), width, height);
        Self::new(original, compared)
    }

    /// Attaches an optional per-pixel diff mask produced upstream.
    ///
    /// The mask is advisory metadata carried for consumers; the classifiers
    /// themselves work from the raw buffers.
    #[must_use]
    pub fn with_diff_mask(mut self, mask: &'a [u8]) -> Self {
        self.diff_mask = Some(mask);
        self
    }

    #[inline]
    #[must_use]
    pub fn original(&self) -> ImgRef<'a, RGBA8> {
        self.original
    }

    #[inline]
    #[must_use]
    pub fn compared(&self) -> ImgRef<'a, RGBA8> {
        self.compared
    }

    #[inline]
    #[must_use]
    pub fn diff_mask(&self) -> Option<&'a [u8]> {
        self.diff_mask
    }

    /// Image width shared by both sides.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.original.width()
    }

    /// Image height shared by both sides.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.original.height()
    }

    /// Crops both sides to the given bounds as zero-copy sub-image views.
    ///
    /// # Panics
    /// Panics when `bounds` extends outside the image extent (caller
    /// precondition per the data model).
    #[must_use]
    pub fn crop(&self, bounds: &Bounds) -> (ImgRef<'a, RGBA8>, ImgRef<'a, RGBA8>) {
        (
            crop_image(self.original, bounds),
            crop_image(self.compared, bounds),
        )
    }
}

/// Crops one image to the given bounds as a zero-copy sub-image view.
///
/// # Panics
/// Panics when `bounds` extends outside the image extent.
#[must_use]
pub fn crop_image<'a>(img: ImgRef<'a, RGBA8>, bounds: &Bounds) -> ImgRef<'a, RGBA8> {
    img.sub_image(
        bounds.x as usize,
        bounds.y as usize,
        bounds.width as usize,
        bounds.height as usize,
    )
}
