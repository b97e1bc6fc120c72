use tracing::debug;

use crate::config::Orientation;
use crate::error::{Result, ScanError};
use crate::geometry::{max_index, min_index, Point, Quad};

/// Maps four unordered corners to (top-left, top-right, bottom-right, bottom-left).
pub trait CornerOrderer: Send + Sync {
    fn order(&self, points: [Point; 4]) -> Quad;

    /// Human-readable name for this orderer (used in logs)
    fn name(&self) -> &str;
}

/// Axis-aligned heuristic orderer.
///
/// Top-left has the smallest `x + y`, bottom-right the largest. Top-right has
/// the smallest `y - x`, bottom-left the largest.
///
/// This is not a geometric sort. It assumes a convex quadrilateral rotated
/// well under 45 degrees. Ties (a square turned exactly 45 degrees) resolve to
/// the first point in input order, which can assign one point to two corners;
/// check the result with [`Quad::is_permutation_of`] when that matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumDiffOrderer;

impl CornerOrderer for SumDiffOrderer {
    fn order(&self, points: [Point; 4]) -> Quad {
        let sums = points.map(|p| p.x + p.y);
        let diffs = points.map(|p| p.y - p.x);

        Quad::new(
            points[min_index(&sums)],
            points[min_index(&diffs)],
            points[max_index(&sums)],
            points[max_index(&diffs)],
        )
    }

    fn name(&self) -> &str {
        "sum-diff"
    }
}

/// Sorts corners by angle around their centroid, then starts the clockwise
/// sequence at the point closest to the top-left (smallest `x + y`).
///
/// Always returns a permutation of its input, whatever the rotation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CentroidAngleOrderer;

impl CornerOrderer for CentroidAngleOrderer {
    fn order(&self, points: [Point; 4]) -> Quad {
        let cx = points.iter().map(|p| p.x).sum::<f32>() / 4.0;
        let cy = points.iter().map(|p| p.y).sum::<f32>() / 4.0;

        // With y pointing down, increasing atan2 runs clockwise on screen.
        let mut sorted = points;
        sorted.sort_by(|a, b| {
            let angle_a = (a.y - cy).atan2(a.x - cx);
            let angle_b = (b.y - cy).atan2(b.x - cx);
            angle_a.total_cmp(&angle_b)
        });

        let sums = sorted.map(|p| p.x + p.y);
        let start = min_index(&sums);
        sorted.rotate_left(start);

        Quad::new(sorted[0], sorted[1], sorted[2], sorted[3])
    }

    fn name(&self) -> &str {
        "centroid-angle"
    }
}

/// Order a point list that is expected to hold exactly four corners.
pub fn order_slice(points: &[Point], orderer: &dyn CornerOrderer) -> Result<Quad> {
    let corners: [Point; 4] = points.try_into().map_err(|_| {
        ScanError::InvalidInput(format!("expected 4 corner points, got {}", points.len()))
    })?;
    Ok(orderer.order(corners))
}

/// Apply the orientation policy to an ordered quad.
pub fn orient(quad: Quad, orientation: Orientation) -> Quad {
    match orientation {
        Orientation::AsDetected => quad,
        Orientation::Portrait => {
            let (bottom, top) = quad.widths();
            let (right, left) = quad.heights();
            if top + bottom > left + right {
                debug!("Landscape quad, rotating corner order to portrait");
                quad.rotated()
            } else {
                quad
            }
        }
    }
}
