#![allow(dead_code)]

use cardscan::Point;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point as PixelPoint;
use imageproc::rect::Rect;

/// Dark blue background, well below the binarization threshold.
pub const BACKGROUND: Rgb<u8> = Rgb([40, 70, 120]);
/// Off-white card stock, well above the binarization threshold.
pub const CARD: Rgb<u8> = Rgb([235, 232, 220]);

/// Corners (tl, tr, br, bl) of a `card_w` x `card_h` rectangle rotated by
/// `angle_deg` around `(cx, cy)`.
pub fn rotated_corners(cx: f32, cy: f32, card_w: f32, card_h: f32, angle_deg: f32) -> [Point; 4] {
    let angle = angle_deg.to_radians();
    [(-1.0f32, -1.0f32), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)].map(|(sx, sy)| {
        let (dx, dy) = (sx * card_w / 2.0, sy * card_h / 2.0);
        Point::new(
            cx + dx * angle.cos() - dy * angle.sin(),
            cy + dx * angle.sin() + dy * angle.cos(),
        )
    })
}

/// Paint a filled quadrilateral onto an RGB canvas.
pub fn fill_quad(img: &mut RgbImage, corners: &[Point; 4], color: Rgb<u8>) {
    let poly: Vec<PixelPoint<i32>> = corners
        .iter()
        .map(|p| PixelPoint::new(p.x.round() as i32, p.y.round() as i32))
        .collect();
    draw_polygon_mut(img, &poly, color);
}

/// A photo of a card rotated by `angle_deg`, with height `scale` times the
/// canvas height and a 0.727 aspect ratio. Returns the photo and true corners.
pub fn rotated_card_photo(canvas: u32, scale: f32, angle_deg: f32) -> (DynamicImage, [Point; 4]) {
    let mut img = RgbImage::from_pixel(canvas, canvas, BACKGROUND);
    let card_h = canvas as f32 * scale;
    let card_w = card_h * 0.727;
    let center = canvas as f32 / 2.0;
    let corners = rotated_corners(center, center, card_w, card_h, angle_deg);
    fill_quad(&mut img, &corners, CARD);
    (DynamicImage::ImageRgb8(img), corners)
}

/// An axis-aligned card spanning `x0..=x1`, `y0..=y1` on a `w` x `h` photo.
pub fn axis_aligned_card_photo(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> DynamicImage {
    let mut img = RgbImage::from_pixel(w, h, BACKGROUND);
    draw_filled_rect_mut(&mut img, Rect::at(x0 as i32, y0 as i32).of_size(x1 - x0 + 1, y1 - y0 + 1), CARD);
    DynamicImage::ImageRgb8(img)
}

/// A 200x300 image split into four solid quadrants.
pub fn quadrant_card() -> RgbImage {
    RgbImage::from_fn(200, 300, |x, y| quadrant_color(x < 100, y < 150))
}

pub fn quadrant_color(left: bool, top: bool) -> Rgb<u8> {
    match (left, top) {
        (true, true) => Rgb([220, 30, 30]),
        (false, true) => Rgb([30, 200, 40]),
        (true, false) => Rgb([30, 40, 210]),
        (false, false) => Rgb([230, 210, 20]),
    }
}

pub fn empty_mask(w: u32, h: u32) -> GrayImage {
    GrayImage::from_pixel(w, h, Luma([0u8]))
}

pub fn assert_near(actual: Point, expected: Point, tolerance: f32) {
    let d = actual.distance(&expected);
    assert!(
        d <= tolerance,
        "expected {:?} within {} px of {:?}, off by {:.2}",
        actual,
        tolerance,
        expected,
        d
    );
}

pub fn assert_color_near(actual: Rgb<u8>, expected: Rgb<u8>, tolerance: u8) {
    for c in 0..3 {
        let diff = (actual[c] as i16 - expected[c] as i16).unsigned_abs();
        assert!(
            diff <= tolerance as u16,
            "color {:?} differs from {:?} by {} in channel {}",
            actual,
            expected,
            diff,
            c
        );
    }
}

/// All 24 orderings of four items.
pub fn permutations_of_four<T: Copy>(items: [T; 4]) -> Vec<[T; 4]> {
    let mut result = Vec::new();
    for a in 0..4 {
        for b in 0..4 {
            for c in 0..4 {
                for d in 0..4 {
                    let idx = [a, b, c, d];
                    let distinct = (0..4).all(|i| (i + 1..4).all(|j| idx[i] != idx[j]));
                    if distinct {
                        result.push(idx.map(|i| items[i]));
                    }
                }
            }
        }
    }
    result
}
