//! Settings file tests

use carteles::document::CanvasDocument;
use carteles::settings::{Settings, default_settings_path};
use carteles::types::{ElementKind, Geometry};
use carteles::types::PaperFormat;
use carteles::units::ExportQuality;
use std::fs;

#[test]
fn test_default_settings_path_location() {
    let path = default_settings_path();
    assert!(path.ends_with("carteles/settings.json"));
}

#[test]
fn test_empty_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{}").unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn test_partial_sections_merge_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(
        &path,
        r#"{
            "number_format": { "currency_symbol": "US$" },
            "editor": { "snap_enabled": true, "grid_size": 5, "page": { "format": "a3", "orientation": "landscape" } },
            "export": { "quality": "high" }
        }"#,
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings.number_format.currency_symbol, "US$");
    assert_eq!(settings.number_format.decimal_separator, ',');
    assert!(settings.editor.snap_enabled);
    assert_eq!(settings.editor.grid_size, 5.0);
    assert_eq!(settings.editor.history_limit, 100);
    assert_eq!(settings.export.quality, ExportQuality::High);

    let doc = settings.new_document();
    assert!(doc.config().snap_enabled);
    assert_eq!(doc.config().grid_size, 5.0);
    assert_eq!(doc.page().format, PaperFormat::A3);
}

#[test]
fn test_invalid_values_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{ "editor": { "min_zoom": 2.0, "max_zoom": 1.0 } }"#).unwrap();

    let err = Settings::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("zoom range"), "{err:#}");
}

#[test]
fn test_malformed_json_has_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{ nope").unwrap();

    let err = Settings::load_from(&path).unwrap_err();
    assert!(format!("{err:#}").contains("Invalid settings file"));
}

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    let mut settings = Settings::default();
    settings.editor.history_limit = 20;
    settings.export.quality = ExportQuality::Draft;
    settings.save_to(&path).unwrap();

    let loaded = Settings::load_from(&path).unwrap();
    assert_eq!(loaded, settings);
    assert_eq!(loaded.new_document().history().limit(), 20);
}

#[test]
fn test_invalid_date_pattern_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{ "number_format": { "date_pattern": "%Q" } }"#).unwrap();

    let err = Settings::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("date_pattern"), "{err:#}");
}

#[test]
fn test_open_document_uses_history_limit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("poster.json");

    let mut doc = CanvasDocument::default();
    doc.add_element(ElementKind::Text, Geometry::new(0.0, 0.0, 100.0, 20.0), "Oferta")
        .unwrap();
    doc.save_to_path(&path).unwrap();

    let mut settings = Settings::default();
    settings.editor.history_limit = 3;
    let mut reopened = settings.open_document(&path).unwrap();
    assert_eq!(reopened.history().limit(), 3);

    for i in 0..5 {
        reopened
            .add_element(ElementKind::Shape, Geometry::new(i as f32, 0.0, 10.0, 10.0), "")
            .unwrap();
    }
    assert_eq!(reopened.history_len(), 4);
    assert_eq!(CanvasDocument::load_from_path(&path).unwrap().history().limit(), 100);
}
