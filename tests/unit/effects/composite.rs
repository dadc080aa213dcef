use super::*;
use crate::foundation::core::Rgba8;

fn gradient_canvas(w: u32, h: u32) -> Canvas {
    let mut c = Canvas::new(w, h).unwrap();
    for y in 0..h {
        for x in 0..w {
            let a = ((x * 37 + y * 11) % 256) as u8;
            c.put_pixel(
                i64::from(x),
                i64::from(y),
                Rgba8::new((x * 20) as u8, (y * 30) as u8, 77, a),
            );
        }
    }
    c
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    assert_eq!(over(dst, [255, 255, 255, 0]), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    assert_eq!(over([0, 0, 0, 255], [255, 0, 0, 255]), [255, 0, 0, 255]);
}

#[test]
fn over_dst_transparent_returns_src() {
    assert_eq!(over([0, 0, 0, 0], [100, 110, 120, 200]), [100, 110, 120, 200]);
}

#[test]
fn over_half_white_on_opaque_black_is_mid_grey() {
    assert_eq!(over([0, 0, 0, 255], [255, 255, 255, 128]), [128, 128, 128, 255]);
}

#[test]
fn over_straight_alpha_accumulates() {
    let out = over([0, 0, 255, 128], [255, 0, 0, 128]);
    // a_out = 0.502 + 0.502 * 0.498 ~= 0.752
    assert_eq!(out[3], 192);
    assert!(out[0] > out[2]);
}

#[test]
fn transparent_foreground_leaves_background_unchanged() {
    let bg = gradient_canvas(7, 5);
    let fg = Canvas::new(7, 5).unwrap();
    for mode in [BlendMode::Normal, BlendMode::Multiply, BlendMode::Screen] {
        let out = compose_over(&bg, &fg, mode, 1.0).unwrap();
        assert_eq!(out.as_raw(), bg.as_raw(), "{mode:?}");
    }
}

#[test]
fn opaque_foreground_replaces_background() {
    let bg = gradient_canvas(6, 6);
    let mut fg = Canvas::filled(6, 6, Rgba8::rgb(9, 8, 7)).unwrap();
    fg.put_pixel(2, 3, Rgba8::rgb(200, 100, 50));
    let out = compose_over(&bg, &fg, BlendMode::Normal, 1.0).unwrap();
    assert_eq!(out.as_raw(), fg.as_raw());
}

#[test]
fn multiply_by_white_reproduces_background_color() {
    let mut bg = Canvas::new(3, 1).unwrap();
    bg.put_pixel(0, 0, Rgba8::rgb(12, 200, 99));
    bg.put_pixel(1, 0, Rgba8::rgb(255, 0, 128));
    bg.put_pixel(2, 0, Rgba8::new(40, 50, 60, 255));
    let fg = Canvas::filled(3, 1, Rgba8::WHITE).unwrap();

    let out = compose_over(&bg, &fg, BlendMode::Multiply, 1.0).unwrap();
    assert_eq!(out.as_raw(), bg.as_raw());
}

#[test]
fn multiply_darkens() {
    let bg = Canvas::filled(1, 1, Rgba8::rgb(200, 200, 200)).unwrap();
    let fg = Canvas::filled(1, 1, Rgba8::rgb(128, 128, 128)).unwrap();
    let out = compose_over(&bg, &fg, BlendMode::Multiply, 1.0).unwrap();
    assert_eq!(out.pixel(0, 0), Some(Rgba8::rgb(100, 100, 100)));
}

#[test]
fn opacity_scales_foreground_alpha() {
    let bg = Canvas::filled(1, 1, Rgba8::BLACK).unwrap();
    let fg = Canvas::filled(1, 1, Rgba8::WHITE).unwrap();

    let out = compose_over(&bg, &fg, BlendMode::Normal, 0.5).unwrap();
    assert_eq!(out.pixel(0, 0), Some(Rgba8::rgb(128, 128, 128)));

    let out = compose_over(&bg, &fg, BlendMode::Normal, 0.0).unwrap();
    assert_eq!(out.pixel(0, 0), Some(Rgba8::BLACK));

    let out = compose_over(&bg, &fg, BlendMode::Normal, 7.0).unwrap();
    assert_eq!(out.pixel(0, 0), Some(Rgba8::WHITE));
}

#[test]
fn mismatched_foreground_is_resampled_and_inputs_untouched() {
    let bg = Canvas::filled(8, 6, Rgba8::BLACK).unwrap();
    let fg = Canvas::filled(4, 3, Rgba8::WHITE).unwrap();
    let (bg_before, fg_before) = (bg.clone(), fg.clone());

    let out = compose_over(&bg, &fg, BlendMode::Normal, 1.0).unwrap();
    assert_eq!(out.size(), (8, 6));
    let px = out.pixel(4, 3).unwrap();
    assert!(px.r >= 254 && px.a >= 254, "{px:?}");
    assert_eq!(bg, bg_before);
    assert_eq!(fg, fg_before);
}

#[test]
fn unknown_mode_names_fall_back_to_normal() {
    assert_eq!(BlendMode::from_name("default"), BlendMode::Normal);
    assert_eq!(BlendMode::from_name("hard-light"), BlendMode::Normal);
    assert_eq!(BlendMode::from_name(" Multiply "), BlendMode::Multiply);
    assert_eq!(BlendMode::Screen.name(), "screen");
}

#[test]
fn over_region_only_touches_rect() {
    let mut dst = Canvas::filled(4, 1, Rgba8::BLACK).unwrap();
    let src = Canvas::filled(4, 1, Rgba8::WHITE).unwrap();
    over_region_in_place(&mut dst, &src, PixelRect::new(1, 0, 2, 1)).unwrap();
    assert_eq!(dst.pixel(0, 0), Some(Rgba8::BLACK));
    assert_eq!(dst.pixel(1, 0), Some(Rgba8::WHITE));
    assert_eq!(dst.pixel(2, 0), Some(Rgba8::WHITE));
    assert_eq!(dst.pixel(3, 0), Some(Rgba8::BLACK));

    let small = Canvas::new(2, 1).unwrap();
    let bounds = dst.bounds();
    assert!(over_region_in_place(&mut dst, &small, bounds).is_err());
}
