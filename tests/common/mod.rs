#![allow(unused_imports)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from cardscan for tests
pub use cardscan::{
    CardScanner, CentroidAngleOrderer, CornerOrderer, DetectionFailure, Orientation, Point, Quad,
    RegionRect, ScanConfig, ScanError, SumDiffOrderer,
};
