pub mod config;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod models;
pub mod pipeline;

pub use config::{CornerStrategy, Orientation, ScanConfig};
pub use detection::{build_standard_pipeline, CardScanner};
pub use detection::corners::{CentroidAngleOrderer, CornerOrderer, SumDiffOrderer};
pub use error::{DetectionFailure, ScanError, RETAKE_MESSAGE};
pub use geometry::{Point, Quad};
pub use models::{BoundaryDetection, CardRegion, CardRegions, Contour, RegionRect};
pub use pipeline::{
    Pipeline, PipelineData, PipelineStep, PipelineContext,
    BoundingBox, MetadataValue, DebugConfig
};
