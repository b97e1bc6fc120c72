use crate::config::{CornerStrategy, Orientation};
use crate::detection::{boundary, perspective, preprocessing, regions};
use crate::models::RegionRect;
use crate::pipeline::{BoundingBox, MetadataValue, PipelineContext, PipelineData, PipelineStep};
use anyhow::Result;
use image::{DynamicImage, Rgb};
use imageproc::drawing::draw_line_segment_mut;

/// Compute the diagnostic edge map of the photo
///
/// The edge map replaces the working image so it shows up in debug output;
/// later steps start again from the original photo.
pub struct EdgeMapStep {
    pub kernel_size: u32,
    pub sigma: f32,
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl PipelineStep for EdgeMapStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let edges = preprocessing::edge_map(
                &item.original,
                self.kernel_size,
                self.sigma,
                self.low_threshold,
                self.high_threshold,
            )?;
            let density = preprocessing::edge_density(&edges);
            let new_item = item
                .with_image(DynamicImage::ImageLuma8(edges))
                .with_metadata("edge_density", MetadataValue::Float(density));
            result.push(new_item);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Edge Map"
    }
}

/// Threshold the grayscale photo into a card/background mask
pub struct BinarizeStep {
    pub threshold: u8,
}

impl PipelineStep for BinarizeStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            preprocessing::ensure_non_empty(item.original.width(), item.original.height())?;
            let gray = preprocessing::to_grayscale(&item.original);
            let mask = preprocessing::binarize(&gray, self.threshold);
            result.push(item.with_image(DynamicImage::ImageLuma8(mask)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Binarize"
    }
}

/// Find the card quadrilateral in the mask and record it as "quad"
///
/// The working image becomes the mask with the approximated polygon drawn on it.
pub struct BoundaryStep {
    pub epsilon_factor: f64,
    pub corner_strategy: CornerStrategy,
    pub orientation: Orientation,
}

impl PipelineStep for BoundaryStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let mask = item.image.to_luma8();
            let detection = boundary::extract_from_mask(
                &mask,
                self.epsilon_factor,
                self.corner_strategy.orderer(),
                self.orientation,
            )?;

            let mut overlay = item.image.to_rgb8();
            let polygon = &detection.polygon;
            for (i, start) in polygon.iter().enumerate() {
                let end = polygon[(i + 1) % polygon.len()];
                draw_line_segment_mut(&mut overlay, (start.x, start.y), (end.x, end.y), Rgb([255, 0, 255]));
            }

            let new_item = item
                .with_image(DynamicImage::ImageRgb8(overlay))
                .with_metadata("quad", MetadataValue::Quad(detection.quad))
                .with_metadata("contour_area", MetadataValue::Float(detection.contour_area as f32))
                .with_metadata("hull_points", MetadataValue::Int(detection.hull.len() as i32));
            result.push(new_item);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Boundary Detection"
    }
}

/// Warp the original photo along the recorded "quad"
pub struct RectifyStep;

impl PipelineStep for RectifyStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let quad = item.get_quad("quad")
                .ok_or_else(|| anyhow::anyhow!("Missing quad; run boundary detection first"))?;
            let rectified = perspective::rectify(&item.original, &quad)?;
            result.push(item.with_image(rectified));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Perspective Rectification"
    }
}

/// Resize the rectified card to the canonical resolution
pub struct CanonicalResizeStep {
    pub width: u32,
    pub height: u32,
}

impl PipelineStep for CanonicalResizeStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let canonical = regions::canonicalize(&item.image, self.width, self.height)?;
            result.push(item.with_image(canonical));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Canonical Resize"
    }
}

/// Split the canonical card into one item per region - splits one image into many
pub struct SegmentStep {
    pub regions: Vec<RegionRect>,
}

impl PipelineStep for SegmentStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            for crop in regions::crop_regions(&item.image, &self.regions)? {
                let bbox = BoundingBox {
                    x: crop.rect.x,
                    y: crop.rect.y,
                    width: crop.rect.width,
                    height: crop.rect.height,
                };
                let mut region_data = PipelineData::from_region(crop.image, item.original.clone(), bbox);
                region_data.metadata = item.metadata.clone();
                region_data.metadata.insert("region".to_string(), MetadataValue::String(crop.rect.name));
                result.push(region_data);
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Region Segmentation"
    }
}
