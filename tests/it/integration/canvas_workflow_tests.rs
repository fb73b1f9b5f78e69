//! Canvas Workflow Integration Tests

use crate::helpers::{
    TestDocumentBuilder, assert_element_count, assert_position, assert_selection_valid,
    assert_z_permutation, document_with_texts, empty_document, z_order,
};
use carteles::document::{CanvasDocument, SelectionMode};
use carteles::error::DocumentError;
use carteles::types::{
    CanvasConfig, ElementContent, ElementId, ElementKind, Geometry, Position, Size,
    StyleOverrides, TextAlign,
};

#[test]
fn test_add_move_snap_undo_scenario() {
    let mut doc = TestDocumentBuilder::new().with_snap(10.0).build();

    let id = doc
        .add_element(ElementKind::Text, Geometry::new(0.0, 0.0, 100.0, 20.0), "Hello")
        .unwrap();
    assert_eq!(id.to_string(), "e1");

    doc.move_element(id, Position::new(53.0, 47.0)).unwrap();
    assert_position(&doc, id, 50.0, 50.0);

    assert!(doc.undo());
    assert_position(&doc, id, 0.0, 0.0);

    doc.move_element(id, Position::new(50.0, 50.0)).unwrap();
    assert_position(&doc, id, 50.0, 50.0);
}

#[test]
fn test_move_without_snap_keeps_exact_position() {
    let mut doc = document_with_texts(&["A"]);
    doc.move_element(ElementId(1), Position::new(53.5, 47.25)).unwrap();
    assert_position(&doc, ElementId(1), 53.5, 47.25);
}

#[test]
fn test_resize_snaps_to_grid() {
    let mut doc = TestDocumentBuilder::new()
        .with_snap(10.0)
        .with_text_element("A", (0.0, 0.0))
        .build();

    doc.resize_element(ElementId(1), Size::new(143.0, 4.0)).unwrap();
    let geometry = doc.element(ElementId(1)).unwrap().geometry;
    assert_eq!((geometry.width, geometry.height), (140.0, 10.0));
}

#[test]
fn test_zero_size_allowed_without_snap() {
    let mut doc = document_with_texts(&["A"]);
    doc.resize_element(ElementId(1), Size::new(0.0, 0.0)).unwrap();
    assert_eq!(doc.element(ElementId(1)).unwrap().geometry.size(), Size::new(0.0, 0.0));
}

#[test]
fn test_reorder_front_and_back() {
    let mut doc = document_with_texts(&["A", "B", "C"]);

    doc.reorder_to_front(ElementId(1)).unwrap();
    assert_eq!(z_order(&doc), vec![ElementId(2), ElementId(3), ElementId(1)]);

    doc.reorder_to_back(ElementId(3)).unwrap();
    assert_eq!(z_order(&doc), vec![ElementId(3), ElementId(2), ElementId(1)]);
    assert_z_permutation(&doc);
    assert_eq!(doc.element(ElementId(3)).unwrap().z_index, 0);
}

#[test]
fn test_step_forward_and_backward() {
    let mut doc = document_with_texts(&["A", "B", "C"]);

    doc.bring_forward(ElementId(1)).unwrap();
    assert_eq!(z_order(&doc), vec![ElementId(2), ElementId(1), ElementId(3)]);

    doc.send_backward(ElementId(3)).unwrap();
    assert_eq!(z_order(&doc), vec![ElementId(2), ElementId(3), ElementId(1)]);

    // Already at the edge: still recorded, order unchanged
    let before = doc.history_len();
    doc.send_backward(ElementId(2)).unwrap();
    assert_eq!(z_order(&doc), vec![ElementId(2), ElementId(3), ElementId(1)]);
    assert_eq!(doc.history_len(), before + 1);
}

#[test]
fn test_z_indices_stay_a_permutation() {
    let mut doc = empty_document();
    let mut ids = Vec::new();
    for i in 0..8 {
        let id = doc
            .add_element(
                ElementKind::Shape,
                Geometry::new(i as f32 * 10.0, 0.0, 10.0, 10.0),
                ElementContent::Empty,
            )
            .unwrap();
        ids.push(id);
    }

    doc.remove_element(ids[3]).unwrap();
    assert_z_permutation(&doc);
    doc.reorder_to_front(ids[0]).unwrap();
    doc.duplicate_element(ids[5]).unwrap();
    doc.remove_element(ids[7]).unwrap();
    doc.reorder_to_back(ids[6]).unwrap();
    doc.bring_forward(ids[1]).unwrap();
    doc.send_backward(ids[4]).unwrap();
    doc.remove_element(ids[0]).unwrap();
    assert_z_permutation(&doc);

    while doc.undo() {
        assert_z_permutation(&doc);
    }
}

#[test]
fn test_duplicate_offsets_by_grid_and_goes_on_top() {
    let mut doc = TestDocumentBuilder::new()
        .with_text_element("Oferta", (10.0, 20.0))
        .with_text_element("Precio", (200.0, 20.0))
        .build();
    doc.update_style(ElementId(1), &StyleOverrides::default().with_color("#d32f2f"))
        .unwrap();
    doc.select(&[ElementId(2)], SelectionMode::Replace).unwrap();

    let copy = doc.duplicate_element(ElementId(1)).unwrap();
    assert_eq!(copy, ElementId(3));

    let element = doc.element(copy).unwrap();
    assert_eq!(element.z_index, 2);
    assert_eq!(element.geometry.position(), Position::new(20.0, 30.0));
    assert_eq!(element.content, ElementContent::literal("Oferta"));
    assert_eq!(element.style.color.as_deref(), Some("#d32f2f"));
    assert!(doc.is_selected(ElementId(2)));
    assert!(!doc.is_selected(copy));
}

#[test]
fn test_style_and_content_edits() {
    let mut doc = document_with_texts(&["A"]);
    doc.update_style(ElementId(1), &StyleOverrides::default().with_font_size(32.0))
        .unwrap();
    doc.update_style(ElementId(1), &StyleOverrides::default().with_align(TextAlign::Center))
        .unwrap();
    doc.set_content(ElementId(1), ElementContent::field("price"))
        .unwrap();

    let element = doc.element(ElementId(1)).unwrap();
    assert_eq!(element.style.font_size, Some(32.0));
    assert_eq!(element.style.align, Some(TextAlign::Center));
    assert_eq!(element.content.field_name(), Some("price"));

    doc.undo();
    assert_eq!(
        doc.element(ElementId(1)).unwrap().content,
        ElementContent::literal("A")
    );
}

#[test]
fn test_move_selection_is_one_entry() {
    let mut doc = TestDocumentBuilder::new()
        .with_snap(10.0)
        .with_text_element("A", (0.0, 0.0))
        .with_text_element("B", (100.0, 0.0))
        .with_text_element("C", (200.0, 0.0))
        .build();
    doc.select(&[ElementId(1), ElementId(3)], SelectionMode::Replace)
        .unwrap();
    let before = doc.history_len();

    let moved = doc.move_selection_by(18.0, 32.0).unwrap();
    assert_eq!(moved, 2);
    assert_eq!(doc.history_len(), before + 1);
    assert_position(&doc, ElementId(1), 20.0, 30.0);
    assert_position(&doc, ElementId(2), 100.0, 0.0);
    assert_position(&doc, ElementId(3), 220.0, 30.0);

    doc.undo();
    assert_position(&doc, ElementId(1), 0.0, 0.0);
    assert_position(&doc, ElementId(3), 200.0, 0.0);
}

#[test]
fn test_empty_selection_operations_are_noops() {
    let mut doc = document_with_texts(&["A"]);
    let before = doc.history_len();
    assert_eq!(doc.move_selection_by(5.0, 5.0), Ok(0));
    assert_eq!(doc.remove_selection(), 0);
    assert_eq!(doc.history_len(), before);
}

#[test]
fn test_remove_selection() {
    let mut doc = document_with_texts(&["A", "B", "C"]);
    doc.select(&[ElementId(1), ElementId(2)], SelectionMode::Replace)
        .unwrap();

    assert_eq!(doc.remove_selection(), 2);
    assert_element_count(&doc, 1);
    assert!(doc.selected_ids().is_empty());
    assert_z_permutation(&doc);

    doc.undo();
    assert_element_count(&doc, 3);
    assert_selection_valid(&doc);
}

#[test]
fn test_element_at_picks_topmost() {
    let mut doc = TestDocumentBuilder::new()
        .with_element(
            ElementKind::Shape,
            Geometry::new(0.0, 0.0, 200.0, 200.0),
            ElementContent::Empty,
        )
        .with_element(
            ElementKind::Text,
            Geometry::new(50.0, 50.0, 50.0, 50.0),
            ElementContent::literal("top"),
        )
        .build();

    assert_eq!(doc.element_at(60.0, 60.0), Some(ElementId(2)));
    assert_eq!(doc.element_at(10.0, 10.0), Some(ElementId(1)));
    assert_eq!(doc.element_at(500.0, 500.0), None);

    doc.reorder_to_front(ElementId(1)).unwrap();
    assert_eq!(doc.element_at(60.0, 60.0), Some(ElementId(1)));

    doc.move_element(ElementId(1), Position::new(300.0, 300.0)).unwrap();
    assert_eq!(doc.element_at(60.0, 60.0), Some(ElementId(2)));

    doc.undo();
    assert_eq!(doc.element_at(10.0, 10.0), Some(ElementId(1)));
}

#[test]
fn test_marquee_selection() {
    let mut doc = document_with_texts(&["A", "B", "C"]);

    // Corners given bottom-right first
    assert_eq!(
        doc.elements_in_rect(150.0, 10.0, 0.0, 0.0),
        vec![ElementId(1), ElementId(2)]
    );

    doc.select(&[ElementId(3)], SelectionMode::Replace).unwrap();
    let hits = doc.select_in_rect(0.0, 0.0, 50.0, 50.0, SelectionMode::Add);
    assert_eq!(hits, 1);
    assert!(doc.is_selected(ElementId(1)));
    assert!(doc.is_selected(ElementId(3)));
}

#[test]
fn test_zoom_is_clamped() {
    let mut doc = empty_document();
    assert_eq!(doc.set_zoom(10.0), 3.0);
    assert_eq!(doc.set_zoom(0.01), 0.1);
    assert_eq!(doc.set_zoom(1.5), 1.5);
    assert_eq!(doc.set_zoom(f32::NAN), 1.5);

    let doc = CanvasDocument::new(CanvasConfig::default().with_zoom(7.0));
    assert_eq!(doc.config().zoom, 3.0);
}

#[test]
fn test_grid_size_validation() {
    let mut doc = empty_document();
    assert!(matches!(
        doc.set_grid_size(-1.0),
        Err(DocumentError::ConstraintViolation { .. })
    ));
    assert!(doc.set_grid_size(f32::NAN).is_err());
    doc.set_grid_size(0.0).unwrap();
    doc.set_snap_enabled(true);

    let id = doc
        .add_element(ElementKind::Text, Geometry::new(0.0, 0.0, 10.0, 10.0), "A")
        .unwrap();
    doc.move_element(id, Position::new(13.0, 17.0)).unwrap();
    assert_position(&doc, id, 13.0, 17.0);
}

#[test]
fn test_duplicate_without_grid_uses_default_offset() {
    let mut doc = document_with_texts(&["A"]);
    doc.set_grid_size(0.0).unwrap();
    let copy = doc.duplicate_element(ElementId(1)).unwrap();
    assert_position(&doc, copy, 10.0, 10.0);
}
