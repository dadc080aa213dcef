use super::*;
use serde_json::json;

#[test]
fn layer_deserializes_with_style_defaults() {
    let layer: TextLayer = serde_json::from_value(json!({
        "text": "hello",
        "position": {"x": 40, "y": -5}
    }))
    .unwrap();
    assert_eq!(layer.text(), "hello");
    assert_eq!(layer.position(), Position::new(40, -5));
    assert_eq!(layer.style().font_size, 120.0);
    assert_eq!(layer.style().color, Rgba8::WHITE);
    assert!(layer.style().effects.is_none());
}

#[test]
fn layer_rejects_bad_input() {
    for bad in [
        json!({"text": "   "}),
        json!({"text": "a\nb"}),
        json!({"text": "x", "style": {"font_size": -4}}),
        json!({"text": "x", "style": {"font_size": 0}}),
        json!({"text": "x", "style": {"color": "#zzz"}}),
    ] {
        assert!(serde_json::from_value::<TextLayer>(bad.clone()).is_err(), "{bad}");
    }
    let err = TextLayer::new("", Position::default(), TextStyle::default()).unwrap_err();
    assert!(matches!(err, BacktextError::Input(_)));
}

#[test]
fn layer_carries_effect_requests() {
    let layer: TextLayer = serde_json::from_value(json!({
        "text": "x",
        "style": {"effects": {"type": "glow", "settings": {"radius": 2}}}
    }))
    .unwrap();
    let fx = layer.style().effects.as_ref().unwrap();
    assert_eq!(fx.glow.as_ref().unwrap().radius, Some(2.0));
}

#[test]
fn dramatic_headline_uppercases_and_adds_period_once() {
    assert_eq!(DramaticText::new("we rise", Position::default()).headline(), "WE RISE.");
    assert_eq!(DramaticText::new("done.", Position::default()).headline(), "DONE.");
    let plain = DramaticText {
        uppercase: false,
        with_period: false,
        ..DramaticText::new("Quiet", Position::default())
    };
    assert_eq!(plain.headline(), "Quiet");
}

#[test]
fn dramatic_defaults_to_shadow_and_outline() {
    let layer = DramaticText::new("go", Position::new(1, 2))
        .into_layer()
        .unwrap();
    assert_eq!(layer.text(), "GO.");
    assert_eq!(layer.style().font_size, 150.0);
    assert_eq!(layer.style().effects, Some(EffectRequest::dramatic()));

    let mut custom = DramaticText::new("go", Position::default());
    custom.effects = Some(serde_json::from_value(json!({"glow": {}})).unwrap());
    let layer = custom.into_layer().unwrap();
    let fx = layer.style().effects.as_ref().unwrap();
    assert!(fx.glow.is_some() && fx.shadow.is_none());
}
