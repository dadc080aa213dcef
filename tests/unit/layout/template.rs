use super::*;

#[test]
fn square_subject_is_centered_on_facebook_post() {
    let subject = Canvas::filled(400, 400, Rgba8::rgb(255, 0, 0)).unwrap();
    let (canvas, placed) =
        layout_template(&subject, TemplatePreset::FacebookPost, Rgba8::BLACK, 10).unwrap();

    assert_eq!(canvas.size(), (1200, 630));
    assert_eq!((placed.width, placed.height), (504, 504));
    assert_eq!(placed.x, (1200 - 504) / 2);
    assert_eq!(placed.y, 63);
    assert!(placed.x >= 63 && placed.x + 504 <= 1200 - 63);

    let center = canvas.pixel(600, 315).unwrap();
    assert!(center.r >= 250 && center.g <= 5 && center.a == 255, "{center:?}");
    assert_eq!(canvas.pixel(10, 10), Some(Rgba8::BLACK));
}

#[test]
fn wide_subject_is_width_constrained() {
    let subject = Canvas::filled(800, 200, Rgba8::WHITE).unwrap();
    let (_, placed) =
        layout_template(&subject, TemplatePreset::InstagramPost, Rgba8::BLACK, 10).unwrap();
    assert_eq!((placed.width, placed.height), (864, 216));
    assert_eq!((placed.x, placed.y), (108, 432));
}

#[test]
fn transparent_subject_pixels_show_background() {
    let mut subject = Canvas::new(100, 100).unwrap();
    for y in 40..60 {
        for x in 40..60 {
            subject.put_pixel(x, y, Rgba8::WHITE);
        }
    }
    let bg = Rgba8::rgb(0, 0, 255);
    let (canvas, _) = layout_template(&subject, TemplatePreset::InstagramPost, bg, 0).unwrap();
    assert_eq!(canvas.pixel(20, 20), Some(bg));
    let center = canvas.pixel(540, 540).unwrap();
    assert!(center.r >= 250 && center.b == 255, "{center:?}");
}

#[test]
fn preset_names_round_trip_and_unknown_is_input_error() {
    for t in TemplatePreset::ALL {
        assert_eq!(TemplatePreset::from_name(t.name()).unwrap(), t);
    }
    assert_eq!(
        "YouTube_Thumbnail".parse::<TemplatePreset>().unwrap().dimensions(),
        (1280, 720)
    );
    let err = TemplatePreset::from_name("myspace_banner").unwrap_err();
    assert!(matches!(err, BacktextError::Input(_)));
}

#[test]
fn excessive_padding_is_input_error() {
    let subject = Canvas::filled(10, 10, Rgba8::WHITE).unwrap();
    let err =
        layout_template(&subject, TemplatePreset::FacebookPost, Rgba8::BLACK, 50).unwrap_err();
    assert!(matches!(err, BacktextError::Input(_)));
}
