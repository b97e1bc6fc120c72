use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use tracing::{debug, instrument};

use crate::config::ScanConfig;
use crate::detection::preprocessing::ensure_non_empty;
use crate::error::{Result, ScanError};
use crate::models::{CardRegion, CardRegions, RegionRect};

/// Outline colors cycled over the regions when annotating.
const ANNOTATION_COLORS: [Rgb<u8>; 4] = [
    Rgb([255, 0, 0]),
    Rgb([0, 200, 0]),
    Rgb([0, 0, 255]),
    Rgb([255, 160, 0]),
];

/// Resize a rectified card to the canonical resolution.
pub fn canonicalize(rectified: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage> {
    ensure_non_empty(rectified.width(), rectified.height())?;
    Ok(rectified.resize_exact(width, height, FilterType::Triangle))
}

/// Crop every region out of an image that is already at canonical size.
pub fn crop_regions(canonical: &DynamicImage, regions: &[RegionRect]) -> Result<Vec<CardRegion>> {
    regions
        .iter()
        .map(|rect| {
            if !rect.fits_within(canonical.width(), canonical.height()) {
                return Err(ScanError::InvalidInput(format!(
                    "region '{}' does not fit a {}x{} image",
                    rect.name,
                    canonical.width(),
                    canonical.height()
                )));
            }
            Ok(CardRegion {
                rect: rect.clone(),
                image: canonical.crop_imm(rect.x, rect.y, rect.width, rect.height),
            })
        })
        .collect()
}

/// Resize the rectified card and cut out the configured regions.
#[instrument(skip_all, fields(width = rectified.width(), height = rectified.height()))]
pub fn segment(rectified: &DynamicImage, config: &ScanConfig) -> Result<CardRegions> {
    let canonical = canonicalize(rectified, config.canonical_width, config.canonical_height)?;
    let regions = crop_regions(&canonical, &config.regions)?;
    debug!(regions = regions.len(), "Card segmented");
    Ok(CardRegions { canonical, regions })
}

/// Draw each region's outline onto a copy of the canonical image.
pub fn annotate_regions(canonical: &DynamicImage, regions: &[RegionRect]) -> RgbImage {
    let mut annotated = canonical.to_rgb8();
    for (i, region) in regions.iter().enumerate() {
        if region.width == 0 || region.height == 0 {
            continue;
        }
        let color = ANNOTATION_COLORS[i % ANNOTATION_COLORS.len()];
        let rect = Rect::at(region.x as i32, region.y as i32).of_size(region.width, region.height);
        draw_hollow_rect_mut(&mut annotated, rect, color);
    }
    annotated
}
