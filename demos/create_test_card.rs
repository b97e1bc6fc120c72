use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;

fn main() {
    let (width, height) = (1000u32, 1000u32);
    let mut img = RgbImage::from_pixel(width, height, Rgb([40, 70, 120]));

    // A 0.727 aspect card, tilted by 12 degrees around the canvas center
    let (card_w, card_h) = (436.0f32, 600.0f32);
    let angle = 12.0f32.to_radians();
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let corners: Vec<Point<i32>> = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
        .iter()
        .map(|(sx, sy)| {
            let (dx, dy) = (sx * card_w / 2.0, sy * card_h / 2.0);
            let x = cx + dx * angle.cos() - dy * angle.sin();
            let y = cy + dx * angle.sin() + dy * angle.cos();
            Point::new(x.round() as i32, y.round() as i32)
        })
        .collect();
    draw_polygon_mut(&mut img, &corners, Rgb([235, 230, 215]));

    // A dark "artwork" block inside the card; it must not split the silhouette
    draw_filled_rect_mut(&mut img, Rect::at(420, 380).of_size(160, 140), Rgb([60, 40, 30]));

    img.save("test_card.png").unwrap();
    println!("Created test_card.png ({}x{}, card tilted 12 degrees)", width, height);
}
