use image::{DynamicImage, GrayImage};
use imageproc::geometry::{arc_length, convex_hull};
use imageproc::point::Point as PixelPoint;
use tracing::{debug, instrument, warn};

use crate::config::{Orientation, ScanConfig};
use crate::detection::contours::{find_external_contours, rank_by_area};
use crate::detection::corners::{orient, CornerOrderer};
use crate::detection::perspective::output_dimensions;
use crate::detection::preprocessing::{binarize, ensure_non_empty, to_grayscale};
use crate::error::{DetectionFailure, Result};
use crate::geometry::{approximate_closed_polygon, Point};
use crate::models::BoundaryDetection;

/// Locate the card in a photo.
///
/// Grayscale, fixed threshold, then [`extract_from_mask`].
#[instrument(skip_all, fields(width = photo.width(), height = photo.height()))]
pub fn extract_boundary(photo: &DynamicImage, config: &ScanConfig) -> Result<BoundaryDetection> {
    ensure_non_empty(photo.width(), photo.height())?;
    let mask = binarize(&to_grayscale(photo), config.binarize_threshold);
    extract_from_mask(
        &mask,
        config.epsilon_factor,
        config.orderer(),
        config.orientation,
    )
}

/// Find the quadrilateral outline of the largest foreground region of a
/// binary mask.
///
/// The largest external contour is replaced by its convex hull, which is
/// simplified with a tolerance of `epsilon_factor` times the hull perimeter.
/// Anything other than exactly four vertices is a detection failure; the
/// polygon is never forced into shape.
pub fn extract_from_mask(
    mask: &GrayImage,
    epsilon_factor: f64,
    orderer: &dyn CornerOrderer,
    orientation: Orientation,
) -> Result<BoundaryDetection> {
    ensure_non_empty(mask.width(), mask.height())?;

    let ranked = rank_by_area(find_external_contours(mask));
    debug!(contours = ranked.len(), "External contours found");
    let largest = ranked.into_iter().next().ok_or(DetectionFailure::NoContours)?;

    let hull: Vec<PixelPoint<i32>> = convex_hull(largest.points.as_slice());
    let perimeter = if hull.len() < 2 { 0.0 } else { arc_length(&hull, true) };
    let epsilon = epsilon_factor * perimeter;
    let approx = approximate_closed_polygon(&hull, epsilon);
    debug!(
        contour_area = largest.area,
        hull_points = hull.len(),
        perimeter,
        vertices = approx.len(),
        "Boundary approximated"
    );

    let polygon: Vec<Point> = approx.iter().copied().map(Point::from).collect();
    let corners: [Point; 4] = polygon.as_slice().try_into().map_err(|_| {
        warn!(vertices = polygon.len(), "Boundary is not a quadrilateral");
        DetectionFailure::VertexCount {
            found: polygon.len(),
        }
    })?;

    let quad = orderer.order(corners);
    if !quad.is_permutation_of(&corners) {
        warn!(orderer = orderer.name(), ?corners, "Corner ordering was ambiguous");
        return Err(DetectionFailure::AmbiguousCorners.into());
    }
    let quad = orient(quad, orientation);

    // Reject slivers here so the rectifier never sees them.
    output_dimensions(&quad)?;
    if quad.area() < 1.0 {
        return Err(DetectionFailure::DegenerateGeometry {
            width: quad.output_size().0,
            height: quad.output_size().1,
        }
        .into());
    }

    Ok(BoundaryDetection {
        contour_area: largest.area,
        hull: hull.into_iter().map(Point::from).collect(),
        polygon,
        quad,
    })
}
