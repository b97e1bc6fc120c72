use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use tracing::{debug, instrument, warn};

use crate::detection::preprocessing::ensure_non_empty;
use crate::error::{DetectionFailure, Result};
use crate::geometry::Quad;

/// Pixel dimensions of the rectified output for `quad`.
///
/// Each side uses the longer of the two opposite edges, rounded to the nearest
/// pixel. A side that rounds to zero means the quad was degenerate.
pub fn output_dimensions(quad: &Quad) -> Result<(u32, u32)> {
    let (max_width, max_height) = quad.output_size();
    let width = max_width.round();
    let height = max_height.round();
    if !(width >= 1.0 && height >= 1.0) || !width.is_finite() || !height.is_finite() {
        return Err(DetectionFailure::DegenerateGeometry {
            width: max_width,
            height: max_height,
        }
        .into());
    }
    Ok((width as u32, height as u32))
}

/// The projective transform taking `quad` onto the axis-aligned rectangle
/// `(0, 0) .. (max_width - 1, max_height - 1)`.
pub fn rectifying_projection(quad: &Quad) -> Result<Projection> {
    let (max_width, max_height) = quad.output_size();
    let dest = [
        (0.0, 0.0),
        (max_width - 1.0, 0.0),
        (max_width - 1.0, max_height - 1.0),
        (0.0, max_height - 1.0),
    ];

    Projection::from_control_points(quad.control_points(), dest).ok_or_else(|| {
        warn!(?quad, "Singular perspective transform");
        DetectionFailure::DegenerateGeometry {
            width: max_width,
            height: max_height,
        }
        .into()
    })
}

/// Warp the contents of `quad` into a fronto-parallel image.
///
/// Gray and RGB images keep their layout; anything else is warped as RGBA8.
/// Source pixels outside the photo come out black.
#[instrument(skip(image), fields(src_width = image.width(), src_height = image.height()))]
pub fn rectify(image: &DynamicImage, quad: &Quad) -> Result<DynamicImage> {
    ensure_non_empty(image.width(), image.height())?;
    let (width, height) = output_dimensions(quad)?;
    let projection = rectifying_projection(quad)?;

    let rectified = match image {
        DynamicImage::ImageLuma8(gray) => {
            let mut out = GrayImage::new(width, height);
            warp_into(gray, &projection, Interpolation::Bilinear, Luma([0u8]), &mut out);
            DynamicImage::ImageLuma8(out)
        }
        DynamicImage::ImageRgb8(rgb) => {
            let mut out = RgbImage::new(width, height);
            warp_into(rgb, &projection, Interpolation::Bilinear, Rgb([0u8, 0, 0]), &mut out);
            DynamicImage::ImageRgb8(out)
        }
        other => {
            let rgba = other.to_rgba8();
            let mut out = RgbaImage::new(width, height);
            warp_into(&rgba, &projection, Interpolation::Bilinear, Rgba([0u8, 0, 0, 255]), &mut out);
            DynamicImage::ImageRgba8(out)
        }
    };

    debug!(width, height, "Perspective rectified");
    Ok(rectified)
}
