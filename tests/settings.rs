extern crate gltoolbox;

use std::fs;

use gltoolbox::errors::Error;
use gltoolbox::settings::*;

#[test]
fn defaults() {
    let settings = Settings::default();
    assert_eq!(settings.shapes.samples, 360);
    assert_eq!(settings.shapes.color, [0.0, 0.0, 0.0, 1.0]);
    assert_eq!(settings.text.batch_capacity, 100);
    assert_eq!(settings.text.fallback, '?');
    assert_eq!(settings.text.charset.len(), 95);
    assert!(settings.text.charset.starts_with(' '));
    assert!(settings.text.charset.ends_with('~'));

    assert_eq!(Settings::from_json("{}").unwrap(), settings);
}

#[test]
fn partial_json() {
    let json = r#"
        {
            "shapes": { "samples": 64 },
            "text": { "pixel_size": 24, "color": [1.0, 1.0, 1.0], "charset": "0123456789" }
        }
    "#;

    let settings = Settings::from_json(json).unwrap();
    assert_eq!(settings.shapes.samples, 64);
    assert_eq!(settings.shapes.zindex, 0.0);
    assert_eq!(settings.text.pixel_size, 24);
    assert_eq!(settings.text.color, [1.0, 1.0, 1.0]);
    assert_eq!(settings.text.charset, "0123456789");
    assert_eq!(settings.text.padding, TextSettings::default().padding);
}

#[test]
fn malformed_json() {
    match Settings::from_json(r#"{ "shapes": { "samples": "many" } }"#) {
        Err(Error::Settings(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert!(Settings::from_json("[").is_err());
}

#[test]
fn load_from() {
    let path = std::env::temp_dir().join("gltoolbox-settings-load-from.json");
    fs::write(&path, r#"{ "text": { "line_spacing": 2.0 } }"#).unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings.text.line_spacing, 2.0);
    assert_eq!(settings.shapes, ShapeSettings::default());
    fs::remove_file(&path).unwrap();

    match Settings::load_from(&path) {
        Err(Error::Io(_)) => {}
        other => panic!("unexpected {:?}", other),
    }
}
