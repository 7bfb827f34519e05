//! Integration test: encoded image in, filtered encoded image out.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Cursor;

use chrono::NaiveDate;
use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use retrocam_io::{Config, FilterRequest, Service, decode};
use retrocam_pipeline::{Assets, Context, Registry};

fn encode_png(image: DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn uniform_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    encode_png(DynamicImage::ImageRgb8(RgbImage::from_pixel(
        width,
        height,
        image::Rgb(rgb),
    )))
}

fn service() -> Service {
    Service::new(Registry::builtin(), Assets::builtin()).with_seed(Some(2024))
}

#[test]
fn invert_gray_png() {
    let request = FilterRequest::new(uniform_png(100, 100, [128, 128, 128]), "invert");
    let result = service().process(&request).expect("invert should succeed");
    assert_eq!(result.content_type(), "image/png");

    let out = decode(result.bytes()).unwrap();
    assert_eq!(out.channels(), 3);
    assert!(out.image().pixels().all(|p| p.0 == [127, 127, 127, 255]));
}

#[test]
fn grayscale_red_png() {
    let request = FilterRequest::new(uniform_png(50, 50, [255, 0, 0]), "grayscale");
    let out = decode(service().process(&request).unwrap().bytes()).unwrap();
    assert!(out.image().pixels().all(|p| p.0 == [76, 76, 76, 255]));
}

#[test]
fn polaroid_png_grows_the_canvas() {
    let request = FilterRequest::new(uniform_png(100, 100, [10, 20, 30]), "polaroid");
    let out = decode(service().process(&request).unwrap().bytes()).unwrap();
    assert_eq!((out.width(), out.height()), (180, 260));
    assert_eq!(out.pixel(40, 40), [10, 20, 30, 255]);
    assert_eq!(out.pixel(0, 0), [255, 255, 255, 255]);
}

#[test]
fn missing_filter_returns_no_image() {
    let request = FilterRequest {
        image: Some(uniform_png(8, 8, [0, 0, 0])),
        filter: None,
    };
    let response = service().handle(&request);
    assert_eq!(response.status(), 400);
    assert_eq!(response.content_type(), "application/json");
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert!(body["error"].as_str().unwrap().contains("filter"));
}

#[test]
fn unknown_filter_returns_400() {
    let request = FilterRequest::new(uniform_png(8, 8, [0, 0, 0]), "sparkle");
    let response = service().handle(&request);
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["error"], "unsupported filter type: sparkle");
}

#[test]
fn dust_without_texture_returns_500() {
    let request = FilterRequest::new(uniform_png(8, 8, [0, 0, 0]), "dust");
    assert_eq!(service().handle(&request).status(), 500);
}

#[test]
fn dust_with_configured_texture() {
    let dir = std::env::temp_dir().join(format!("retrocam-dust-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let texture_path = dir.join("dust.png");
    let texture = RgbaImage::from_pixel(16, 16, image::Rgba([255, 255, 255, 255]));
    std::fs::write(&texture_path, encode_png(DynamicImage::ImageRgba8(texture))).unwrap();

    let config = Config {
        dust_texture_path: Some(texture_path),
        seed: Some(1),
        ..Config::default()
    };
    let service = Service::from_config(&config);
    let request = FilterRequest::new(uniform_png(20, 10, [0, 0, 0]), "dust");
    let out = decode(service.process(&request).unwrap().bytes()).unwrap();
    // 30% white over black.
    assert_eq!(out.pixel(10, 5), [77, 77, 77, 255]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn digicam_is_byte_identical_with_fixed_seed_and_time() {
    let service = service();
    let now = NaiveDate::from_ymd_opt(2003, 7, 4)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap();
    let png = encode_png(DynamicImage::ImageRgb8(RgbImage::from_fn(200, 200, |x, y| {
        image::Rgb([
            u8::try_from(x).unwrap_or(255),
            u8::try_from(y).unwrap_or(255),
            90,
        ])
    })));
    let request = FilterRequest::new(png, "digicam");

    let run = |seed| {
        let mut ctx = Context::seeded(service.assets(), seed).with_timestamp(now);
        service.process_with(&request, &mut ctx).unwrap()
    };
    let first = run(5);
    assert_eq!(first, run(5));
    assert_ne!(first, run(6));
}
