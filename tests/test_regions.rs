mod common;
use common::*;

use cardscan::detection::regions::{annotate_regions, canonicalize, crop_regions, segment};
use image::{DynamicImage, Rgb, RgbImage};

fn gray_card(w: u32, h: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([128, 128, 128])))
}

#[test]
fn segment_crops_every_default_region() {
    let config = ScanConfig::default();
    let card = segment(&gray_card(301, 402), &config).unwrap();

    assert_eq!((card.canonical.width(), card.canonical.height()), (600, 825));
    assert_eq!(card.names().collect::<Vec<_>>(), vec!["name", "value", "body", "mark"]);

    let expected = [("name", 395, 90), ("value", 200, 90), ("body", 580, 310), ("mark", 580, 95)];
    for (name, w, h) in expected {
        let region = card.get(name).unwrap();
        assert_eq!((region.image.width(), region.image.height()), (w, h), "{}", name);
    }
}

#[test]
fn crops_carry_the_canonical_pixels() {
    let canonical = DynamicImage::ImageRgb8(RgbImage::from_fn(600, 825, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 7])
    }));
    let crops = crop_regions(&canonical, &ScanConfig::default().regions).unwrap();

    let body = crops.iter().find(|c| c.name() == "body").unwrap().image.to_rgb8();
    assert_eq!(*body.get_pixel(0, 0), Rgb([10, (420 % 256) as u8, 7]));
    assert_eq!(*body.get_pixel(579, 309), Rgb([(589 % 256) as u8, (729 % 256) as u8, 7]));
}

#[test]
fn segmentation_is_deterministic() {
    let (photo, _) = rotated_card_photo(600, 0.7, 8.0);
    let config = ScanConfig::default();

    let first = segment(&photo, &config).unwrap();
    let second = segment(&photo, &config).unwrap();
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.rect, b.rect);
        assert_eq!(a.image.as_bytes(), b.image.as_bytes());
    }
}

#[test]
fn custom_region_table_is_honoured() {
    let config = ScanConfig {
        canonical_width: 100,
        canonical_height: 140,
        regions: vec![
            RegionRect::new("top", 0, 0, 100, 70),
            RegionRect::new("bottom", 0, 70, 100, 70),
        ],
        ..ScanConfig::default()
    };
    config.validate().unwrap();

    let card = segment(&gray_card(50, 50), &config).unwrap();
    assert_eq!(card.len(), 2);
    assert_eq!(card.get("bottom").unwrap().image.height(), 70);
}

#[test]
fn region_outside_the_image_is_rejected() {
    let regions = vec![RegionRect::new("wide", 550, 0, 100, 10)];
    let err = crop_regions(&gray_card(600, 825), &regions).unwrap_err();
    assert!(matches!(err, ScanError::InvalidInput(_)));
}

#[test]
fn empty_rectified_image_is_rejected() {
    let err = canonicalize(&DynamicImage::new_rgb8(0, 0), 600, 825).unwrap_err();
    assert!(matches!(err, ScanError::InvalidInput(_)));
}

#[test]
fn annotation_outlines_each_region() {
    let canonical = gray_card(600, 825);
    let regions = ScanConfig::default().regions;
    let annotated = annotate_regions(&canonical, &regions);

    assert_eq!(annotated.dimensions(), (600, 825));
    // First region outline is red, second green.
    assert_eq!(*annotated.get_pixel(5, 45), Rgb([255, 0, 0]));
    assert_eq!(*annotated.get_pixel(599, 45), Rgb([0, 200, 0]));
    // Interior untouched.
    assert_eq!(*annotated.get_pixel(200, 45), Rgb([128, 128, 128]));
}
