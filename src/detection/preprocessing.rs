use image::{DynamicImage, GrayImage};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::edges::canny;
use imageproc::filter::separable_filter_equal;
use tracing::{debug, instrument};

use crate::error::{Result, ScanError};

/// Reject images with no pixels before any stage allocates from them.
pub fn ensure_non_empty(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ScanError::InvalidInput(format!(
            "image has zero area ({}x{})",
            width, height
        )));
    }
    Ok(())
}

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Normalized 1-D Gaussian weights with exactly `size` taps.
pub fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let center = (size / 2) as f32;
    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-d * d / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= sum);
    kernel
}

/// Apply a separable Gaussian blur with the given 1-D kernel
pub fn apply_blur(img: &GrayImage, kernel: &[f32]) -> GrayImage {
    separable_filter_equal(img, kernel)
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

/// Fixed-level binarization: pixels strictly brighter than `level` become 255.
pub fn binarize(img: &GrayImage, level: u8) -> GrayImage {
    threshold(img, level, ThresholdType::Binary)
}

/// Grayscale, `kernel_size` x `kernel_size` Gaussian blur and Canny in one call.
///
/// Diagnostic only: the boundary extractor works from the thresholded photo
/// and never reads this map.
#[instrument(level = "debug", skip(img), fields(width = img.width(), height = img.height()))]
pub fn edge_map(
    img: &DynamicImage,
    kernel_size: u32,
    sigma: f32,
    low_threshold: f32,
    high_threshold: f32,
) -> Result<GrayImage> {
    ensure_non_empty(img.width(), img.height())?;
    let gray = to_grayscale(img);
    let blurred = apply_blur(&gray, &gaussian_kernel(kernel_size, sigma));
    let edges = detect_edges(&blurred, low_threshold, high_threshold);
    debug!(density = edge_density(&edges), "Edge map computed");
    Ok(edges)
}

/// Fraction of non-zero pixels in a binary image.
pub fn edge_density(edges: &GrayImage) -> f32 {
    let total = edges.width() as u64 * edges.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let on = edges.pixels().filter(|p| p[0] > 0).count() as u64;
    on as f32 / total as f32
}
