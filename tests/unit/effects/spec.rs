use super::*;
use serde_json::json;

fn request(v: serde_json::Value) -> EffectRequest {
    serde_json::from_value(v).unwrap()
}

#[test]
fn empty_request_resolves_to_no_effects() {
    let spec = EffectPresets::default()
        .resolve(&EffectRequest::default())
        .unwrap();
    assert!(spec.is_empty());
}

#[test]
fn keyed_request_merges_over_presets() {
    let spec = EffectPresets::default()
        .resolve(&request(json!({
            "shadow": {"offset": [2, 3]},
            "glow": {"color": "#ff0000", "opacity": 0.25}
        })))
        .unwrap();

    let shadow = spec.shadow().unwrap();
    assert_eq!(shadow.offset, [2, 3]);
    assert_eq!(shadow.color, Rgba8::BLACK);
    assert_eq!(shadow.blur, 3.0);
    assert_eq!(shadow.opacity, 0.5);

    let glow = spec.glow().unwrap();
    assert_eq!(glow.color, Rgba8::rgb(255, 0, 0));
    assert_eq!(glow.radius, 10.0);
    assert_eq!(glow.opacity, 0.25);

    assert!(spec.outline().is_none());
    assert!(spec.depth3d().is_none());
}

#[test]
fn tagged_request_selects_one_effect() {
    let req = request(json!({"type": "3d_depth", "settings": {"layers": 5, "color": "#222"}}));
    let spec = EffectPresets::default().resolve(&req).unwrap();
    let depth = spec.depth3d().unwrap();
    assert_eq!(depth.layers, 5);
    assert_eq!(depth.colors, DepthColors::Fixed(Rgba8::rgb(0x22, 0x22, 0x22)));

    let req = request(json!({"type": "outline"}));
    assert_eq!(req.outline, Some(OutlinePatch::default()));
}

#[test]
fn unknown_effect_type_is_rejected() {
    let err = serde_json::from_value::<EffectRequest>(json!({"type": "sparkle"})).unwrap_err();
    assert!(err.to_string().contains("unknown effect type"), "{err}");
    assert!(serde_json::from_value::<EffectRequest>(json!({"bloom": {}})).is_err());
}

#[test]
fn keyed_form_accepts_3d_depth_alias() {
    let req = request(json!({"3d_depth": {"distance": 4.0}}));
    assert_eq!(req.depth3d.unwrap().distance, Some(4.0));
}

#[test]
fn opacity_is_clamped_on_resolve() {
    let spec = EffectPresets::default()
        .resolve(&request(json!({"outline": {"opacity": 3.5}})))
        .unwrap();
    assert_eq!(spec.outline().unwrap().opacity, 1.0);
}

#[test]
fn invalid_parameters_are_input_errors() {
    let presets = EffectPresets::default();
    for bad in [
        json!({"depth3d": {"layers": 0}}),
        json!({"depth3d": {"distance": -1.0}}),
        json!({"depth3d": {"color_gradient": []}}),
        json!({"depth3d": {"color": "#000", "color_gradient": ["#111"]}}),
        json!({"outline": {"width": 500}}),
    ] {
        let err = presets.resolve(&request(bad.clone())).unwrap_err();
        assert!(matches!(err, BacktextError::Input(_)), "{bad}: {err}");
    }
}

#[test]
fn depth_offsets_grow_along_angle() {
    let depth = EffectPresets::default().depth3d;
    let offsets: Vec<_> = (1..=5).map(|i| depth.layer_offset(i)).collect();
    assert_eq!(offsets, vec![(1, 1), (3, 3), (4, 4), (6, 6), (7, 7)]);

    let down = DepthSpec {
        angle_deg: 90.0,
        ..depth
    };
    assert_eq!(down.layer_offset(3), (0, 6));
}

#[test]
fn depth_gradient_spreads_stops_over_layers() {
    let depth = EffectPresets::default().depth3d;
    assert_eq!(depth.layer_color(1), Rgba8::rgb(0x33, 0x33, 0x33));
    assert_eq!(depth.layer_color(4), Rgba8::rgb(0x66, 0x66, 0x66));
    assert_eq!(depth.layer_color(10), Rgba8::rgb(0x99, 0x99, 0x99));
}

#[test]
fn dramatic_request_is_shadow_and_outline() {
    let spec = EffectPresets::default()
        .resolve(&EffectRequest::dramatic())
        .unwrap();
    assert!(spec.shadow().is_some());
    assert!(spec.outline().is_some());
    assert!(spec.glow().is_none());
    assert!(spec.depth3d().is_none());
}
