pub mod preprocessing;
pub mod contours;
pub mod corners;
pub mod boundary;
pub mod perspective;
pub mod regions;
pub mod steps;

use std::path::PathBuf;

use image::{DynamicImage, GrayImage};
use tracing::{info, instrument};

use crate::config::ScanConfig;
use crate::error::Result;
use crate::models::{BoundaryDetection, CardRegion, CardRegions, RegionRect};

/// Main card scanning orchestrator
///
/// Holds only configuration; every call allocates its own buffers, so one
/// scanner can be shared between threads.
#[derive(Debug, Clone)]
pub struct CardScanner {
    config: ScanConfig,
}

impl CardScanner {
    /// Create a scanner, rejecting an inconsistent configuration up front.
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Run the full pipeline: boundary, rectification, segmentation.
    #[instrument(skip_all, fields(width = photo.width(), height = photo.height()))]
    pub fn scan(&self, photo: &DynamicImage) -> Result<CardRegions> {
        let detection = self.detect_boundary(photo)?;
        let rectified = perspective::rectify(photo, &detection.quad)?;
        let regions = regions::segment(&rectified, &self.config)?;
        info!(
            rectified_width = rectified.width(),
            rectified_height = rectified.height(),
            regions = regions.len(),
            "Card scanned"
        );
        Ok(regions)
    }

    /// Same result as [`CardScanner::scan`], produced by the step pipeline so
    /// every intermediate image lands in `debug_dir` (which must be empty).
    pub fn scan_with_debug(&self, photo: &DynamicImage, debug_dir: PathBuf) -> anyhow::Result<CardRegions> {
        let pipeline = build_standard_pipeline(&self.config).with_debug(debug_dir)?;
        let segment_step = pipeline.step_names().len() - 1;

        let resized = pipeline.run_partial(photo.clone(), segment_step)?;
        let canonical = resized
            .first()
            .map(|item| item.image.clone())
            .ok_or_else(|| anyhow::anyhow!("Pipeline produced no canonical image"))?;

        let regions = pipeline
            .resume(resized, segment_step)?
            .into_iter()
            .map(|item| -> anyhow::Result<CardRegion> {
                let name = item
                    .get_string("region")
                    .ok_or_else(|| anyhow::anyhow!("Region item without a name"))?
                    .to_string();
                let bbox = item
                    .bbox
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("Region '{}' without a bounding box", name))?;
                Ok(CardRegion {
                    rect: RegionRect::new(name, bbox.x, bbox.y, bbox.width, bbox.height),
                    image: item.image,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        info!(regions = regions.len(), "Card scanned with debug output");
        Ok(CardRegions { canonical, regions })
    }

    /// Locate the card outline without warping anything.
    pub fn detect_boundary(&self, photo: &DynamicImage) -> Result<BoundaryDetection> {
        boundary::extract_boundary(photo, &self.config)
    }

    /// Boundary detection plus perspective correction, at native resolution.
    pub fn rectify(&self, photo: &DynamicImage) -> Result<DynamicImage> {
        let detection = self.detect_boundary(photo)?;
        perspective::rectify(photo, &detection.quad)
    }

    /// Diagnostic edge map with the configured blur and thresholds.
    pub fn edge_map(&self, photo: &DynamicImage) -> Result<GrayImage> {
        preprocessing::edge_map(
            photo,
            self.config.blur_kernel_size,
            self.config.blur_sigma(),
            self.config.canny_low,
            self.config.canny_high,
        )
    }
}

impl Default for CardScanner {
    fn default() -> Self {
        Self {
            config: ScanConfig::default(),
        }
    }
}

/// Build the standard scanning pipeline using the composable pipeline system
pub fn build_standard_pipeline(config: &ScanConfig) -> crate::pipeline::Pipeline {
    use crate::pipeline::Pipeline;
    use crate::detection::steps::*;
    use std::sync::Arc;

    Pipeline::new()
        .add_step(Arc::new(EdgeMapStep {
            kernel_size: config.blur_kernel_size,
            sigma: config.blur_sigma(),
            low_threshold: config.canny_low,
            high_threshold: config.canny_high,
        }))
        .add_step(Arc::new(BinarizeStep {
            threshold: config.binarize_threshold,
        }))
        .add_step(Arc::new(BoundaryStep {
            epsilon_factor: config.epsilon_factor,
            corner_strategy: config.corner_strategy,
            orientation: config.orientation,
        }))
        .add_step(Arc::new(RectifyStep))
        .add_step(Arc::new(CanonicalResizeStep {
            width: config.canonical_width,
            height: config.canonical_height,
        }))
        .add_step(Arc::new(SegmentStep {
            regions: config.regions.clone(),
        }))
}
