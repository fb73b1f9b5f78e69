//! Export layout: what an export or print consumer renders.
//!
//! Combines a document's elements with a resolved field set. Field
//! references become display text, geometry is converted to the caller's
//! unit system, and elements bound to unresolved fields are left out.

use crate::binding::{NumberFormat, ResolvedFieldSet};
use crate::document::CanvasDocument;
use crate::types::{ElementContent, ElementId, ElementKind, Geometry, StyleOverrides};
use crate::units::{UnitConverter, UnitSystem};
use serde::Serialize;

/// One element ready to rasterize
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExportItem {
    pub id: ElementId,
    pub kind: ElementKind,
    pub geometry: Geometry,
    pub z_index: u32,
    /// Display text or image reference; `None` for decorative elements
    pub text: Option<String>,
    /// Field the text came from
    pub field: Option<String>,
    pub style: StyleOverrides,
}

/// Page size and ordered items in one unit system.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExportLayout {
    pub width: f32,
    pub height: f32,
    /// Bottom to top
    pub items: Vec<ExportItem>,
    /// Elements skipped because their field has no value
    pub omitted: Vec<ElementId>,
}

impl ExportLayout {
    pub fn build(
        document: &CanvasDocument,
        fields: &ResolvedFieldSet,
        system: UnitSystem,
        format: &NumberFormat,
    ) -> Self {
        let (page_width, page_height) = document.config().page_size_px();
        let mut items = Vec::with_capacity(document.len());
        let mut omitted = Vec::new();

        for element in document.elements() {
            let (text, field) = match &element.content {
                ElementContent::Literal { value } => (Some(value.clone()), None),
                ElementContent::Empty => (None, None),
                ElementContent::Field { name } => match fields.display(name, format) {
                    Some(text) => (Some(text), Some(name.clone())),
                    None => {
                        omitted.push(element.id);
                        continue;
                    }
                },
            };
            items.push(ExportItem {
                id: element.id,
                kind: element.kind,
                geometry: UnitConverter::geometry_to(&element.geometry, system),
                z_index: element.z_index,
                text,
                field,
                style: element.style.clone(),
            });
        }

        if !omitted.is_empty() {
            tracing::debug!(count = omitted.len(), "Omitted elements bound to unresolved fields");
        }

        Self {
            width: UnitConverter::length_to(page_width, system),
            height: UnitConverter::length_to(page_height, system),
            items,
            omitted,
        }
    }

    pub fn item(&self, id: ElementId) -> Option<&ExportItem> {
        self.items.iter().find(|item| item.id == id)
    }
}
