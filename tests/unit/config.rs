use super::*;

#[test]
fn defaults_match_service_layout() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.output_dir, PathBuf::from("uploads/processed"));
    assert_eq!(cfg.public_url_prefix, "/uploads/public");
    assert_eq!(cfg.defaults.font_name, "anton");
    assert_eq!(cfg.defaults.font_size, 120.0);
    assert_eq!(cfg.defaults.color, Rgba8::WHITE);
    assert_eq!(
        cfg.fonts.font_aliases.get("anton").map(String::as_str),
        Some("Anton-Regular.ttf")
    );
    assert_eq!(cfg.effect_presets.outline.width, 2);
}

#[test]
fn partial_json_overrides_only_named_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.json");
    std::fs::write(
        &path,
        r##"{
            "base_dir": "/srv/app",
            "fonts_dir": "fonts",
            "effect_presets": {"glow": {"color": "#00ff00", "radius": 4, "opacity": 0.2}},
            "defaults": {"font_size": 90}
        }"##,
    )
    .unwrap();

    let cfg = EngineConfig::from_json_file(&path).unwrap();
    assert_eq!(cfg.base_dir, PathBuf::from("/srv/app"));
    assert_eq!(cfg.font_sources().fonts_dir, PathBuf::from("/srv/app/fonts"));
    assert_eq!(cfg.output_path(), PathBuf::from("/srv/app/uploads/processed"));
    assert_eq!(cfg.effect_presets.glow.color, Rgba8::rgb(0, 255, 0));
    assert_eq!(cfg.effect_presets.shadow.offset, [5, 5]);
    assert_eq!(cfg.defaults.font_size, 90.0);
    assert_eq!(cfg.defaults.font_name, "anton");
}

#[test]
fn unreadable_and_malformed_configs_are_classified() {
    let dir = tempfile::tempdir().unwrap();
    let err = EngineConfig::from_json_file(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, BacktextError::Io(_)), "{err}");

    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = EngineConfig::from_json_file(&path).unwrap_err();
    assert!(matches!(err, BacktextError::Serde(_)), "{err}");
}
