use super::*;

fn empty_provider(dir: &Path) -> FontProvider {
    FontProvider::new(FontSources {
        fonts_dir: dir.to_path_buf(),
        system_font_dirs: Vec::new(),
        fallback_font_files: Vec::new(),
        font_aliases: BTreeMap::new(),
    })
}

#[test]
fn bitmap_measure_scales_with_size() {
    let font = Font::bitmap(16.0);
    assert_eq!(
        font.measure("HI"),
        TextSize {
            width: 22,
            height: 14
        }
    );
    assert_eq!(Font::bitmap(3.0).measure("A").width, 5);
    assert_eq!(Font::bitmap(120.0).measure("hello").height, 105);
    assert_eq!(Font::bitmap(16.0).measure("").width, 0);
}

#[test]
fn bitmap_rasterize_matches_measure() {
    let font = Font::bitmap(16.0);
    let mask = font.rasterize("H!").unwrap();
    let size = font.measure("H!");
    assert_eq!((mask.width, mask.height), (size.width, size.height));

    // Crossbar of H is row 3, scale 2.
    for x in 0..10 {
        assert_eq!(mask.coverage_at(x, 6), 255, "x={x}");
    }
    // Gap between columns above the crossbar.
    assert_eq!(mask.coverage_at(4, 0), 0);
    // Spacing column between glyphs.
    assert_eq!(mask.coverage_at(10, 6), 0);
}

#[test]
fn lowercase_folds_and_unknown_draws_box() {
    let font = Font::bitmap(8.0);
    assert_eq!(font.rasterize("h").unwrap(), font.rasterize("H").unwrap());
    let boxed = font.rasterize("\u{263a}").unwrap();
    assert_eq!(boxed.coverage_at(0, 0), 255);
    assert_eq!(boxed.coverage_at(2, 3), 0);
}

#[test]
fn unresolvable_font_falls_back_to_bitmap() {
    let dir = tempfile::tempdir().unwrap();
    let font = empty_provider(dir.path()).resolve("anton", 120.0);
    assert!(font.is_bitmap());
    assert_eq!(font.size(), 120.0);
}

#[test]
fn corrupt_font_file_falls_back_to_bitmap() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Broken.ttf"), b"nope").unwrap();
    let font = empty_provider(dir.path()).resolve("broken", 40.0);
    assert!(font.is_bitmap());
}

#[test]
fn missing_candidates_are_searched_once() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Broken.ttf"), b"nope").unwrap();
    let provider = empty_provider(dir.path());

    assert!(!provider.is_known_miss("ghost"));
    assert!(provider.resolve("ghost", 20.0).is_bitmap());
    assert!(provider.is_known_miss("ghost"));

    // A file found on disk is not a miss, even when it fails to load.
    assert!(provider.resolve("broken", 20.0).is_bitmap());
    assert!(!provider.is_known_miss("broken"));

    // Later additions are not picked up for a remembered miss.
    std::fs::write(dir.path().join("Ghost.ttf"), b"nope").unwrap();
    assert!(provider.resolve("ghost", 20.0).is_bitmap());
    assert!(provider.is_known_miss("ghost"));
}

#[test]
fn from_bytes_rejects_garbage() {
    let err = Font::from_bytes("x", b"garbage", 12.0).unwrap_err();
    assert!(matches!(err, BacktextError::Resource(_)), "{err}");
}

#[test]
fn candidate_matching_ignores_case_and_separators() {
    assert!(matches_candidate(Path::new("/f/Arial-Bold.TTF"), "Arial Bold"));
    assert!(matches_candidate(Path::new("/f/anton-regular.ttf"), "Anton-Regular.ttf"));
    assert!(!matches_candidate(Path::new("/f/Arial.txt"), "Arial"));
}

#[test]
fn outline_font_measure_agrees_with_rasterize_when_available() {
    let provider = FontProvider::new(FontSources::default());
    let font = provider.resolve("DejaVuSans", 48.0);
    if font.is_bitmap() {
        return;
    }
    let size = font.measure("hello");
    let mask = font.rasterize("hello").unwrap();
    assert_eq!((mask.width, mask.height), (size.width, size.height));
    assert!(mask.coverage.iter().any(|&c| c > 0));
}
