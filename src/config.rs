use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detection::corners::{CentroidAngleOrderer, CornerOrderer, SumDiffOrderer};
use crate::error::{Result, ScanError};
use crate::models::{default_regions, RegionRect};

/// Which corner orderer turns the detected polygon into a `Quad`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerStrategy {
    /// x+y / y-x extremes. Fast, assumes a roughly axis-aligned card.
    #[default]
    SumDiff,
    /// Angular sort around the centroid.
    CentroidAngle,
}

impl CornerStrategy {
    pub fn orderer(&self) -> &'static dyn CornerOrderer {
        match self {
            CornerStrategy::SumDiff => &SumDiffOrderer,
            CornerStrategy::CentroidAngle => &CentroidAngleOrderer,
        }
    }
}

/// What to do when the detected card is wider than it is tall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Rectify the quad exactly as ordered.
    #[default]
    AsDetected,
    /// Rotate the corner order so the long edges end up vertical.
    Portrait,
}

/// Tunable constants of the scanning pipeline.
///
/// The region table is defined against `canonical_width` x `canonical_height`;
/// changing one without the other is rejected by [`ScanConfig::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Gray level above which a pixel belongs to the card.
    pub binarize_threshold: u8,
    /// Gaussian kernel size used before edge detection (odd, >= 3).
    pub blur_kernel_size: u32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Polygon approximation tolerance as a fraction of the hull perimeter.
    pub epsilon_factor: f64,
    pub canonical_width: u32,
    pub canonical_height: u32,
    pub regions: Vec<RegionRect>,
    pub corner_strategy: CornerStrategy,
    pub orientation: Orientation,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            binarize_threshold: 190,
            blur_kernel_size: 5,
            canny_low: 50.0,
            canny_high: 200.0,
            epsilon_factor: 0.02,
            canonical_width: 600,
            canonical_height: 825,
            regions: default_regions(),
            corner_strategy: CornerStrategy::default(),
            orientation: Orientation::default(),
        }
    }
}

impl ScanConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ScanConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading scan configuration");
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Gaussian sigma for the configured kernel size, using the same rule
    /// OpenCV applies when sigma is left at zero.
    pub fn blur_sigma(&self) -> f32 {
        0.3 * ((self.blur_kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    }

    pub fn orderer(&self) -> &'static dyn CornerOrderer {
        self.corner_strategy.orderer()
    }

    pub fn validate(&self) -> Result<()> {
        if self.blur_kernel_size < 3 || self.blur_kernel_size % 2 == 0 {
            return Err(ScanError::Config(format!(
                "blur kernel size must be odd and at least 3, got {}",
                self.blur_kernel_size
            )));
        }
        if !(self.canny_low > 0.0 && self.canny_low <= self.canny_high) {
            return Err(ScanError::Config(format!(
                "edge thresholds must satisfy 0 < low <= high, got {}/{}",
                self.canny_low, self.canny_high
            )));
        }
        if !(self.epsilon_factor > 0.0 && self.epsilon_factor < 1.0) {
            return Err(ScanError::Config(format!(
                "approximation tolerance must be in (0, 1), got {}",
                self.epsilon_factor
            )));
        }
        if self.canonical_width == 0 || self.canonical_height == 0 {
            return Err(ScanError::Config("canonical size must be non-zero".into()));
        }
        if self.regions.is_empty() {
            return Err(ScanError::Config("region table is empty".into()));
        }

        let mut seen = HashSet::new();
        for region in &self.regions {
            if region.name.is_empty() {
                return Err(ScanError::Config("region name must not be empty".into()));
            }
            if !seen.insert(region.name.as_str()) {
                return Err(ScanError::Config(format!(
                    "duplicate region name '{}'",
                    region.name
                )));
            }
            if region.width == 0 || region.height == 0 {
                return Err(ScanError::Config(format!(
                    "region '{}' has zero size",
                    region.name
                )));
            }
            if !region.fits_within(self.canonical_width, self.canonical_height) {
                return Err(ScanError::Config(format!(
                    "region '{}' ({}, {}, {}x{}) exceeds canonical size {}x{}",
                    region.name,
                    region.x,
                    region.y,
                    region.width,
                    region.height,
                    self.canonical_width,
                    self.canonical_height
                )));
            }
        }

        Ok(())
    }
}
