use super::*;
use crate::foundation::core::Rgba8;

#[test]
fn kernel_radius_covers_three_sigma() {
    assert_eq!(kernel_radius(0.0), 0);
    assert_eq!(kernel_radius(-1.0), 0);
    assert_eq!(kernel_radius(f32::NAN), 0);
    assert_eq!(kernel_radius(3.0), 9);
    assert_eq!(kernel_radius(0.4), 2);
    assert_eq!(kernel_radius(1000.0), 256);
}

#[test]
fn gaussian_taps_are_symmetric_and_sum_to_one() {
    assert!(Kernel::gaussian(0.0).is_none());

    let k = Kernel::gaussian(1.5).unwrap();
    assert_eq!(k.radius(), 5);
    let taps = k.taps();
    assert_eq!(taps.iter().map(|&t| u64::from(t)).sum::<u64>(), 1 << 16);
    for i in 0..taps.len() / 2 {
        assert_eq!(taps[i], taps[taps.len() - 1 - i]);
    }
    assert!(taps[k.radius()] > taps[0]);
}

#[test]
fn pixels_outside_the_region_are_untouched() {
    let mut c = Canvas::new(12, 12).unwrap();
    for y in 0..12 {
        for x in 0..12 {
            if (x + y) % 3 == 0 {
                c.put_pixel(x, y, Rgba8::rgb(250, 10, 90));
            }
        }
    }
    let before = c.clone();
    let rect = PixelRect::new(3, 4, 5, 4);

    blur_region(&mut c, rect, 1.0).unwrap();

    let mut changed_inside = false;
    for y in 0..12i64 {
        for x in 0..12i64 {
            let inside = (3..8).contains(&x) && (4..8).contains(&y);
            if inside {
                changed_inside |= c.pixel(x, y) != before.pixel(x, y);
            } else {
                assert_eq!(c.pixel(x, y), before.pixel(x, y), "({x},{y})");
            }
        }
    }
    assert!(changed_inside);
}

#[test]
fn flat_opaque_region_is_unchanged() {
    let mut c = Canvas::filled(9, 7, Rgba8::rgb(12, 130, 240)).unwrap();
    let before = c.clone();
    blur_region(&mut c, PixelRect::new(1, 1, 6, 5), 2.5).unwrap();
    assert_eq!(c, before);
}

#[test]
fn dot_spreads_within_kernel_and_keeps_alpha_mass() {
    let mut c = Canvas::new(15, 15).unwrap();
    c.put_pixel(7, 7, Rgba8::WHITE);

    let bounds = c.bounds();
    blur_region(&mut c, bounds, 1.0).unwrap();

    // sigma 1 gives a radius-3 kernel: nothing reaches 4px away on either axis.
    assert_eq!(c.pixel(7, 3).unwrap().a, 0);
    assert_eq!(c.pixel(11, 7).unwrap().a, 0);
    assert!(c.pixel(7, 5).unwrap().a > 0);
    assert!(c.pixel(7, 7).unwrap().a < 255);

    let mass: i64 = c.as_raw().chunks_exact(4).map(|p| i64::from(p[3])).sum();
    assert!((mass - 255).abs() <= 8, "{mass}");
}

#[test]
fn region_partly_off_canvas_is_clipped() {
    let mut c = Canvas::filled(4, 4, Rgba8::BLACK).unwrap();
    c.put_pixel(3, 3, Rgba8::WHITE);
    blur_region(&mut c, PixelRect::new(2, 2, 50, 50), 1.0).unwrap();
    assert_eq!(c.pixel(0, 0), Some(Rgba8::BLACK));
    let corner = c.pixel(3, 3).unwrap();
    assert!(corner.r < 255 && corner.r > 0);
}
