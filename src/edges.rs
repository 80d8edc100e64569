//! Grayscale conversion and 3x3 Sobel edge detection.
//!
//! Edge statistics are the cheapest structure signal the classifiers have:
//! text is edge-dense, solid fills are edge-free, and a recolor that keeps
//! edge counts stable keeps its structure.

use imgref::ImgRef;
use rgb::RGBA8;

use crate::consts::EDGE_GRADIENT_THRESHOLD;

/// Edge statistics for one region side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeStats {
    /// Pixels whose Sobel gradient magnitude exceeds the edge threshold.
    pub edge_count: u32,
    /// `edge_count` over the interior area `(w-2)(h-2)`.
    pub edge_density: f32,
}

/// Converts a view to a contiguous row-major grayscale buffer, `(R+G+B)/3`.
#[must_use]
pub fn grayscale(img: ImgRef<'_, RGBA8>) -> Vec<f32> {
    let mut gray = Vec::with_capacity(img.width() * img.height());
    for row in img.rows() {
        for px in row {
            gray.push((f32::from(px.r) + f32::from(px.g) + f32::from(px.b)) / 3.0);
        }
    }
    gray
}

/// Calls `visit(x, y)` for every interior pixel whose Sobel magnitude
/// exceeds the edge threshold. `gray` is row-major with row length `width`.
fn for_each_edge_pixel(
    gray: &[f32],
    width: usize,
    height: usize,
    mut visit: impl FnMut(usize, usize),
) {
    if width < 3 || height < 3 {
        return;
    }
    for y in 1..height - 1 {
        let up = (y - 1) * width;
        let mid = y * width;
        let dn = (y + 1) * width;
        for x in 1..width - 1 {
            let tl = gray[up + x - 1];
            let t = gray[up + x];
            let tr = gray[up + x + 1];
            let l = gray[mid + x - 1];
            let r = gray[mid + x + 1];
            let bl = gray[dn + x - 1];
            let b = gray[dn + x];
            let br = gray[dn + x + 1];

            let gx = -tl - 2.0 * l - bl + tr + 2.0 * r + br;
            let gy = -tl - 2.0 * t - tr + bl + 2.0 * b + br;
            if (gx * gx + gy * gy).sqrt() > EDGE_GRADIENT_THRESHOLD {
                visit(x, y);
            }
        }
    }
}

/// Counts Sobel edge pixels and their interior density.
///
/// Views narrower or shorter than 3 pixels have no interior and yield
/// zero count and density.
#[must_use]
pub fn detect_edges(img: ImgRef<'_, RGBA8>) -> EdgeStats {
    let width = img.width();
    let height = img.height();
    let gray = grayscale(img);

    let mut edge_count = 0u32;
    for_each_edge_pixel(&gray, width, height, |_, _| edge_count += 1);

    let interior = if width >= 3 && height >= 3 {
        ((width - 2) * (height - 2)) as f32
    } else {
        0.0
    };
    let edge_density = if interior > 0.0 {
        edge_count as f32 / interior
    } else {
        0.0
    };
    EdgeStats {
        edge_count,
        edge_density,
    }
}

/// Bounding box of edge pixels as `(min_x, min_y, max_x, max_y)` inclusive.
///
/// `None` when no pixel exceeds the edge threshold.
#[must_use]
pub fn edge_bounds(img: ImgRef<'_, RGBA8>) -> Option<(usize, usize, usize, usize)> {
    let gray = grayscale(img);
    let mut found: Option<(usize, usize, usize, usize)> = None;
    for_each_edge_pixel(&gray, img.width(), img.height(), |x, y| {
        found = Some(match found {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            }
        });
    });
    found
}

/// Ratio of the smaller to the larger of two edge counts, in `[0, 1]`.
///
/// Both sides edge-free count as perfectly matched structure.
#[must_use]
pub fn edge_count_ratio(a: u32, b: u32) -> f32 {
    let max = a.max(b);
    if max == 0 {
        1.0
    } else {
        a.min(b) as f32 / max as f32
    }
}
