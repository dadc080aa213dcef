use super::*;
use serde_json::json;

#[test]
fn parses_all_hex_forms() {
    assert_eq!(Rgba8::from_hex("#ff0000").unwrap(), Rgba8::rgb(255, 0, 0));
    assert_eq!(
        Rgba8::from_hex("#0000ff80").unwrap(),
        Rgba8::new(0, 0, 255, 128)
    );
    assert_eq!(Rgba8::from_hex("#fff").unwrap(), Rgba8::WHITE);
    assert_eq!(Rgba8::from_hex("0F08").unwrap(), Rgba8::new(0, 255, 0, 136));
}

#[test]
fn rejects_malformed_hex_as_input_error() {
    for bad in ["", "#12", "#12345", "#gggggg", "#ééé"] {
        let err = Rgba8::from_hex(bad).unwrap_err();
        assert!(matches!(err, BacktextError::Input(_)), "{bad}: {err}");
    }
}

#[test]
fn deserializes_from_hex_or_array() {
    let c: Rgba8 = serde_json::from_value(json!("#336699")).unwrap();
    assert_eq!(c, Rgba8::rgb(0x33, 0x66, 0x99));

    let c: Rgba8 = serde_json::from_value(json!([300, -4, 12])).unwrap();
    assert_eq!(c, Rgba8::rgb(255, 0, 12));

    assert!(serde_json::from_value::<Rgba8>(json!([1, 2])).is_err());
}

#[test]
fn opacity_is_clamped() {
    assert_eq!(Rgba8::WHITE.with_opacity(2.0).a, 255);
    assert_eq!(Rgba8::WHITE.with_opacity(-1.0).a, 0);
    assert_eq!(Rgba8::WHITE.with_opacity(f32::NAN).a, 0);
    assert_eq!(Rgba8::WHITE.with_opacity(0.5).a, 128);
}

#[test]
fn rect_clip_and_union() {
    let r = PixelRect::new(-5, -5, 20, 10).clip_to(8, 8);
    assert_eq!(r, PixelRect::new(0, 0, 8, 5));

    let u = PixelRect::new(0, 0, 2, 2).union(PixelRect::new(5, 5, 1, 1));
    assert_eq!(u, PixelRect::new(0, 0, 6, 6));

    assert!(PixelRect::new(100, 100, 4, 4).clip_to(10, 10).is_empty());
    assert_eq!(
        PixelRect::new(3, 3, 2, 2).inflate(2),
        PixelRect::new(1, 1, 6, 6)
    );
}
