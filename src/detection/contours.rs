use image::GrayImage;
use image::imageops::replace;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;
use crate::models::Contour;

/// Find the outer boundaries of all top-level foreground regions.
///
/// Holes and anything nested inside another region are skipped, so a card with
/// dark artwork yields a single contour for its silhouette. Everything outside
/// the image counts as background: the mask is traced inside a one pixel zero
/// border, so regions touching the image edge still get an outer boundary.
pub fn find_external_contours(mask: &GrayImage) -> Vec<Contour> {
    let (width, height) = mask.dimensions();
    let mut padded = GrayImage::new(width + 2, height + 2);
    replace(&mut padded, mask, 1, 1);

    let max_x = width as i32 - 1;
    let max_y = height as i32 - 1;
    find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            let points = c
                .points
                .into_iter()
                .map(|p| Point::new((p.x - 1).clamp(0, max_x), (p.y - 1).clamp(0, max_y)))
                .collect();
            Contour::new(points)
        })
        .collect()
}

/// Sort contours by enclosed area, largest first.
pub fn rank_by_area(mut contours: Vec<Contour>) -> Vec<Contour> {
    contours.sort_by(|a, b| b.area.total_cmp(&a.area));
    contours
}
