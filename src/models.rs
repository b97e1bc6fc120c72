use image::DynamicImage;
use imageproc::point::Point as PixelPoint;
use serde::{Deserialize, Serialize};

use crate::geometry::{polygon_area, Point, Quad};

/// Closed outer boundary of a connected region in a binary mask.
#[derive(Debug, Clone)]
pub struct Contour {
    pub points: Vec<PixelPoint<i32>>,
    /// Enclosed area, used only to rank candidates.
    pub area: f64,
}

impl Contour {
    pub fn new(points: Vec<PixelPoint<i32>>) -> Self {
        let area = polygon_area(&points);
        Self { points, area }
    }
}

/// Named axis-aligned rectangle in canonical image coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRect {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl RegionRect {
    pub fn new(name: impl Into<String>, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            width,
            height,
        }
    }

    /// One past the last column.
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// One past the last row.
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width as u64 && self.bottom() <= height as u64
    }
}

/// The standard trading card layout on a 600x825 canonical image.
pub fn default_regions() -> Vec<RegionRect> {
    vec![
        RegionRect::new("name", 5, 0, 395, 90),
        RegionRect::new("value", 400, 0, 200, 90),
        RegionRect::new("body", 10, 420, 580, 310),
        RegionRect::new("mark", 10, 730, 580, 95),
    ]
}

/// What the boundary extractor found in a photo.
#[derive(Debug, Clone)]
pub struct BoundaryDetection {
    /// Area of the selected (largest) external contour.
    pub contour_area: f64,
    pub hull: Vec<Point>,
    /// The approximated polygon, in the order the approximation produced it.
    pub polygon: Vec<Point>,
    pub quad: Quad,
}

/// One cropped sub-image of the canonical card.
#[derive(Debug, Clone)]
pub struct CardRegion {
    pub rect: RegionRect,
    pub image: DynamicImage,
}

impl CardRegion {
    pub fn name(&self) -> &str {
        &self.rect.name
    }
}

/// Result of a full scan: the canonical card plus its named crops.
#[derive(Debug, Clone)]
pub struct CardRegions {
    pub canonical: DynamicImage,
    pub regions: Vec<CardRegion>,
}

impl CardRegions {
    pub fn get(&self, name: &str) -> Option<&CardRegion> {
        self.regions.iter().find(|r| r.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|r| r.name())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CardRegion> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
