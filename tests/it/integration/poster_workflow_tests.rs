//! End-to-end poster workflow: settings, template binding, layout and export.

use crate::helpers::{builtin, empty_document, ladrillazo, record};
use carteles::binding::{NumberFormat, Provenance, resolve};
use carteles::constants::PX_PER_MM;
use carteles::document::CanvasDocument;
use carteles::error::ValidationIssue;
use carteles::export::ExportLayout;
use carteles::settings::Settings;
use carteles::types::{ElementId, ElementKind, Orientation, PaperFormat};
use carteles::units::{ExportQuality, UnitSystem};
use serde_json::json;
use tempfile::TempDir;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn test_ladrillazo_full_record_derives_installment() {
    let data = record(json!({ "name": "Producto X", "price": 1200, "sku": "ABC123" }));
    let resolved = resolve(ladrillazo(), &data).unwrap();

    assert_eq!(resolved.number("pricePerInstallment"), Some(100.0));
    assert_eq!(
        resolved.provenance("pricePerInstallment"),
        Some(Provenance::Derived)
    );
    assert!(resolved.issues().is_empty());
    assert!(resolved.validate().is_ok());
}

#[test]
fn test_ladrillazo_partial_record_reports_missing_fields() {
    let resolved = resolve(ladrillazo(), &record(json!({ "name": "Producto X" }))).unwrap();

    assert_eq!(resolved.len(), 4);
    assert_eq!(resolved.provenance("price"), Some(Provenance::Missing));
    assert_eq!(resolved.provenance("sku"), Some(Provenance::Missing));
    assert_eq!(
        resolved.provenance("pricePerInstallment"),
        Some(Provenance::Missing)
    );
    assert_eq!(
        resolved.issues(),
        &[
            ValidationIssue::MissingRequired {
                field: "price".to_string()
            },
            ValidationIssue::MissingRequired {
                field: "sku".to_string()
            },
        ]
    );

    let err = resolved.validate().unwrap_err();
    assert_eq!(err.issues.len(), 2);
}

#[test]
fn test_bind_template_lays_out_fields() {
    let mut doc = empty_document();
    let ids = doc.bind_template(ladrillazo());

    assert_eq!(ids, vec![ElementId(1), ElementId(2), ElementId(3), ElementId(4)]);
    assert_eq!(doc.template_id(), Some("ladrillazo"));
    assert_eq!(doc.history_len(), 2);

    let kinds: Vec<ElementKind> = doc.elements().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ElementKind::Text,
            ElementKind::PriceBlock,
            ElementKind::Text,
            ElementKind::PriceBlock,
        ]
    );

    let ys: Vec<f32> = doc.elements().iter().map(|e| e.geometry.y).collect();
    assert_eq!(ys, vec![20.0, 70.0, 200.0, 250.0]);

    let expected_width = 210.0 * PX_PER_MM - 40.0;
    for element in doc.elements() {
        assert_eq!(element.geometry.x, 20.0);
        assert!(approx(element.geometry.width, expected_width));
    }

    let fields: Vec<Option<&str>> = doc.elements().iter().map(|e| e.content.field_name()).collect();
    assert_eq!(
        fields,
        vec![Some("name"), Some("price"), Some("sku"), Some("pricePerInstallment")]
    );

    assert!(doc.undo());
    assert!(doc.is_empty());
}

#[test]
fn test_bind_template_adopts_page() {
    let mut doc = empty_document();
    doc.bind_template(builtin("segunda-unidad"));
    assert_eq!(doc.page().orientation, Orientation::Landscape);

    doc.bind_template(builtin("cuotas"));
    assert_eq!(doc.page().format, PaperFormat::A3);

    doc.undo();
    assert_eq!(doc.page().orientation, Orientation::Landscape);
}

#[test]
fn test_bind_resolved_skips_missing_fields() {
    let resolved = resolve(ladrillazo(), &record(json!({ "name": "Producto X" }))).unwrap();
    let mut doc = empty_document();
    let ids = doc.bind_resolved(ladrillazo(), &resolved);

    assert_eq!(ids.len(), 1);
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.elements()[0].content.field_name(), Some("name"));
}

#[test]
fn test_export_layout_scales_and_formats() {
    let data = record(json!({ "name": "Producto X", "price": 1200, "sku": "ABC123" }));
    let resolved = resolve(ladrillazo(), &data).unwrap();
    let mut doc = empty_document();
    let ids = doc.bind_template(ladrillazo());

    let layout = ExportLayout::build(
        &doc,
        &resolved,
        UnitSystem::from(ExportQuality::Standard),
        &NumberFormat::default(),
    );

    assert_eq!(layout.items.len(), 4);
    assert!(layout.omitted.is_empty());
    assert!(approx(layout.width, 210.0 * PX_PER_MM * 2.0));

    let name = layout.item(ids[0]).unwrap();
    assert_eq!(name.text.as_deref(), Some("Producto X"));
    assert_eq!(name.geometry.x, 40.0);
    assert_eq!(name.geometry.y, 40.0);
    assert_eq!(name.geometry.height, 80.0);

    let price = layout.item(ids[1]).unwrap();
    assert_eq!(price.text.as_deref(), Some("$ 1.200"));
    assert_eq!(price.field.as_deref(), Some("price"));

    let installment = layout.item(ids[3]).unwrap();
    assert_eq!(installment.text.as_deref(), Some("$ 100"));
}

#[test]
fn test_export_layout_omits_unresolved_fields() {
    let resolved = resolve(ladrillazo(), &record(json!({ "name": "Producto X" }))).unwrap();
    let mut doc = empty_document();
    let ids = doc.bind_template(ladrillazo());
    doc.add_element(
        ElementKind::Text,
        carteles::types::Geometry::new(20.0, 600.0, 200.0, 40.0),
        "Oferta",
    )
    .unwrap();

    let layout = ExportLayout::build(
        &doc,
        &resolved,
        UnitSystem::from(ExportQuality::Draft),
        &NumberFormat::default(),
    );

    assert_eq!(layout.omitted, vec![ids[1], ids[2], ids[3]]);
    let texts: Vec<Option<&str>> = layout.items.iter().map(|i| i.text.as_deref()).collect();
    assert_eq!(texts, vec![Some("Producto X"), Some("Oferta")]);
}

#[test]
fn test_settings_to_saved_poster() {
    let dir = TempDir::new().unwrap();
    let settings_path = dir.path().join("settings.json");

    let mut settings = Settings::default();
    settings.editor.snap_enabled = true;
    settings.editor.grid_size = 25.0;
    settings.save_to(&settings_path).unwrap();

    let settings = Settings::load_from(&settings_path).unwrap();
    let mut doc = settings.new_document();
    assert!(doc.config().snap_enabled);

    doc.bind_template(ladrillazo());
    // Margin 20 snaps to 25 on this grid
    assert!(doc.elements().iter().all(|e| e.geometry.x == 25.0));

    let poster_path = dir.path().join("poster.json");
    doc.save_to_path(&poster_path).unwrap();
    let loaded = CanvasDocument::load_from_path(&poster_path).unwrap();

    assert_eq!(loaded.id(), doc.id());
    assert_eq!(loaded.template_id(), Some("ladrillazo"));
    assert_eq!(loaded.elements(), doc.elements());
    assert!(!loaded.can_undo());

    let resolved = resolve(
        ladrillazo(),
        &record(json!({ "name": "Producto X", "price": 1200, "sku": "ABC123" })),
    )
    .unwrap();
    let layout = ExportLayout::build(
        &loaded,
        &resolved,
        UnitSystem::from(settings.export.quality),
        &settings.number_format,
    );
    assert_eq!(layout.items.len(), 4);
}
