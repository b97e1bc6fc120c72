use thiserror::Error;

/// Message shown to the person holding the camera for any detection failure.
pub const RETAKE_MESSAGE: &str = "object not detected, please retake photo";

/// Why the card boundary could not be turned into a rectified image.
///
/// These are deterministic outcomes of the current frame. They are kept apart
/// for logging only; callers should treat all of them as "retake the photo".
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DetectionFailure {
    #[error("no contours found in the binarized image")]
    NoContours,

    #[error("boundary approximated to {found} vertices instead of 4")]
    VertexCount { found: usize },

    #[error("corner ordering collapsed two corners onto the same point")]
    AmbiguousCorners,

    #[error("degenerate quadrilateral: rectified size {width}x{height}")]
    DegenerateGeometry { width: f32, height: f32 },
}

/// Top-level error type for the scanning pipeline.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("object not detected: {0}")]
    Detection(#[from] DetectionFailure),

    /// A caller broke a contract (wrong point count, empty image).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScanError {
    pub fn is_detection_failure(&self) -> bool {
        matches!(self, ScanError::Detection(_))
    }

    /// Collapse the error into what a user should be told.
    pub fn user_message(&self) -> String {
        match self {
            ScanError::Detection(_) => RETAKE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
