use std::io::Cursor;

use super::*;
use crate::foundation::core::Rgba8;

fn png_bytes(img: image::DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_rgba_png_keeps_straight_alpha() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100, 50, 200, 128]).unwrap();
    let canvas = decode_image(&png_bytes(image::DynamicImage::ImageRgba8(img))).unwrap();
    assert_eq!(canvas.size(), (1, 1));
    assert!(canvas.has_alpha());
    assert_eq!(canvas.pixel(0, 0), Some(Rgba8::new(100, 50, 200, 128)));
}

#[test]
fn decode_rgb_png_is_opaque_without_alpha() {
    let img = image::RgbImage::from_raw(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
    let canvas = decode_image(&png_bytes(image::DynamicImage::ImageRgb8(img))).unwrap();
    assert!(!canvas.has_alpha());
    assert_eq!(canvas.pixel(1, 0), Some(Rgba8::rgb(4, 5, 6)));
}

#[test]
fn decode_garbage_is_resource_error() {
    let err = decode_image(b"not an image").unwrap_err();
    assert!(matches!(err, BacktextError::Resource(_)), "{err}");
}

#[test]
fn encode_then_decode_preserves_pixels() {
    let mut canvas = Canvas::new(3, 2).unwrap();
    canvas.put_pixel(2, 1, Rgba8::new(9, 8, 7, 6));
    let back = decode_image(&encode_png(&canvas).unwrap()).unwrap();
    assert_eq!(back.as_raw(), canvas.as_raw());
}

#[tokio::test]
async fn load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_image(&dir.path().join("nope.png")).await.unwrap_err();
    assert!(matches!(err, BacktextError::Io(_)), "{err}");
}
