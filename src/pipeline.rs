use image::DynamicImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::Result;
use tracing::{debug, info};

use crate::geometry::Quad;

/// Bounding box in the coordinate space of the image that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Data that flows through the pipeline
/// Each PipelineData represents one image (the whole card, or one region of it)
/// with associated metadata
#[derive(Debug, Clone)]
pub struct PipelineData {
    /// The current image (mask, edge map, rectified card or crop)
    pub image: DynamicImage,

    /// Reference to the original photo (shared efficiently via Arc)
    pub original: Arc<DynamicImage>,

    /// Bounding box of a crop (None means full image)
    pub bbox: Option<BoundingBox>,

    /// Metadata produced by earlier steps (e.g., "quad", "region", "edge_density")
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone)]
pub enum MetadataValue {
    Float(f32),
    String(String),
    Int(i32),
    Quad(Quad),
}

impl PipelineData {
    /// Create PipelineData for a full image
    pub fn from_image(image: DynamicImage) -> Self {
        let original = Arc::new(image.clone());
        Self {
            image,
            original,
            bbox: None,
            metadata: HashMap::new(),
        }
    }

    /// Create PipelineData for a region of an image
    pub fn from_region(
        image: DynamicImage,
        original: Arc<DynamicImage>,
        bbox: BoundingBox,
    ) -> Self {
        Self {
            image,
            original,
            bbox: Some(bbox),
            metadata: HashMap::new(),
        }
    }

    /// Same original, bbox and metadata, new image
    pub fn with_image(&self, image: DynamicImage) -> Self {
        Self {
            image,
            original: self.original.clone(),
            bbox: self.bbox.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn get_float(&self, key: &str) -> Option<f32> {
        match self.metadata.get(key) {
            Some(MetadataValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.metadata.get(key) {
            Some(MetadataValue::String(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn get_quad(&self, key: &str) -> Option<Quad> {
        match self.metadata.get(key) {
            Some(MetadataValue::Quad(q)) => Some(*q),
            _ => None,
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Process data and return transformed data
    /// Steps can split data (1 → many), filter (many → fewer), or transform (many → many)
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>>;

    /// Human-readable name for this step (used in logs and debug directory names)
    fn name(&self) -> &str;
}

/// Directory name for a step's debug output, e.g. "03_boundary_detection"
fn step_dir_name(step_number: usize, step_name: &str) -> String {
    format!("{:02}_{}", step_number, step_name.to_lowercase().replace(' ', "_"))
}

fn save_images(dir: &Path, data: &[PipelineData]) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    for (idx, item) in data.iter().enumerate() {
        let output_path = dir.join(format!("{:02}.png", idx + 1));
        item.image.save(&output_path)
            .map_err(|e| anyhow::anyhow!("Failed to save debug image {}: {}", output_path.display(), e))?;
    }
    Ok(())
}

/// Composable pipeline builder
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Names of the configured steps, in execution order
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step sequentially on an input image
    pub fn run(&self, input: DynamicImage) -> Result<Vec<PipelineData>> {
        self.run_partial(input, self.steps.len())
    }

    /// Run the pipeline but stop after `num_steps` steps (useful for debugging)
    pub fn run_partial(&self, input: DynamicImage, num_steps: usize) -> Result<Vec<PipelineData>> {
        let data = vec![PipelineData::from_image(input)];

        if let Some(debug_config) = &self.context.debug {
            save_images(&debug_config.output_dir.join("00_input"), &data)?;
        }

        self.run_steps(data, 0, num_steps)
    }

    /// Continue a partial run: feed the output of the first `completed` steps
    /// through the remaining ones. Debug directories keep their step numbers.
    pub fn resume(&self, data: Vec<PipelineData>, completed: usize) -> Result<Vec<PipelineData>> {
        self.run_steps(data, completed, self.steps.len())
    }

    fn run_steps(&self, mut data: Vec<PipelineData>, start: usize, end: usize) -> Result<Vec<PipelineData>> {
        let end = end.min(self.steps.len());
        for (step_idx, step) in self.steps.iter().enumerate().take(end).skip(start) {
            debug!(step = step.name(), items = data.len(), "Running step");
            data = step.process(data, &self.context)?;

            if let Some(debug_config) = &self.context.debug {
                let dir_name = step_dir_name(step_idx + 1, step.name());
                save_images(&debug_config.output_dir.join(&dir_name), &data)?;
                info!(dir = %dir_name, images = data.len(), "Saved debug images");
            }

            debug!(step = step.name(), items = data.len(), "Step finished");
        }

        Ok(data)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
