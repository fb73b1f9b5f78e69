//! Canvas document engine.
//!
//! A [`CanvasDocument`] owns the placed elements of one poster, their z-order,
//! the selection and a linear undo/redo history. It is an explicit value owned
//! by one editor session; there is no global document.
//!
//! ## Invariants
//!
//! - `elements` is kept sorted by z-order and `z_index` equals the position,
//!   so z-indices are always exactly `0..len`.
//! - The selection only holds ids present in `elements`.
//! - Every mutating operation either fails without touching anything or
//!   records exactly one history entry.
//! - Selection and view changes (zoom, grid, snapping) are never recorded.

mod history;
mod selection;
mod snapshot;

pub use history::{DocumentState, History, HistoryEntry, HistoryEntryInfo, HistoryState};
pub use selection::{Selection, SelectionMode};
pub use snapshot::{DocumentSnapshot, SCHEMA_VERSION};

use crate::binding::ResolvedFieldSet;
use crate::constants::{
    DUPLICATE_OFFSET, MAX_HISTORY_ENTRIES, TEMPLATE_LAYOUT_GAP, TEMPLATE_LAYOUT_MARGIN,
};
use crate::error::{DocumentError, DocumentResult};
use crate::spatial_index::{Bounds, SpatialIndex};
use crate::template::{FieldSpec, FieldType, TemplateDefinition};
use crate::types::{
    CanvasConfig, CanvasElement, ElementContent, ElementId, ElementKind, Geometry, PageSetup,
    PaperFormat, Position, Size, StyleOverrides, validate_position, validate_size,
};
use crate::units::{clamp, snap, snap_extent};
use std::collections::BTreeSet;
use tracing::{debug, trace};
use uuid::Uuid;

/// One poster being edited.
#[derive(Debug)]
pub struct CanvasDocument {
    id: Uuid,
    template_id: Option<String>,
    config: CanvasConfig,
    elements: Vec<CanvasElement>,
    selection: Selection,
    history: History,
    next_element_id: u64,
    spatial_index: SpatialIndex,
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl CanvasDocument {
    pub fn new(mut config: CanvasConfig) -> Self {
        config.zoom = clamp(config.zoom, config.min_zoom, config.max_zoom);
        let history = History::new(
            DocumentState {
                elements: Vec::new(),
                page: config.page,
                template_id: None,
            },
            MAX_HISTORY_ENTRIES,
        );
        Self {
            id: Uuid::new_v4(),
            template_id: None,
            config,
            elements: Vec::new(),
            selection: Selection::new(),
            history,
            next_element_id: 1,
            spatial_index: SpatialIndex::new(),
        }
    }

    /// Keep at most `limit` undoable entries. Resets the history.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history = History::new(self.current_state(), limit);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Template the document was laid out from, if any
    pub fn template_id(&self) -> Option<&str> {
        self.template_id.as_deref()
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn page(&self) -> PageSetup {
        self.config.page
    }

    /// Elements ordered bottom to top
    pub fn elements(&self) -> &[CanvasElement] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&CanvasElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.element(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_ids(&self) -> &BTreeSet<ElementId> {
        self.selection.ids()
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selection.contains(id)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_state(&self) -> HistoryState {
        self.history.state()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn current_history_index(&self) -> usize {
        self.history.current_index()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // ========================================================================
    // Element operations (recorded)
    // ========================================================================

    /// Place a new element on top of the z-order. Geometry is taken as given,
    /// without snapping.
    pub fn add_element(
        &mut self,
        kind: ElementKind,
        geometry: Geometry,
        content: impl Into<ElementContent>,
    ) -> DocumentResult<ElementId> {
        geometry.validate()?;
        let id = self.push_element(kind, geometry, content.into(), StyleOverrides::default());
        self.commit(format!("Add {}", kind.label().to_lowercase()));
        debug!(element = %id, kind = ?kind, "Added element");
        Ok(id)
    }

    pub fn move_element(&mut self, id: ElementId, position: Position) -> DocumentResult<()> {
        validate_position(position)?;
        let index = self.index_of(id)?;
        let position = self.snap_position(position);

        let element = &mut self.elements[index];
        element.geometry = element.geometry.with_position(position);
        self.spatial_index.upsert(id, &element.geometry);

        self.commit(format!("Move {id}"));
        debug!(element = %id, x = position.x, y = position.y, "Moved element");
        Ok(())
    }

    pub fn resize_element(&mut self, id: ElementId, size: Size) -> DocumentResult<()> {
        validate_size(size)?;
        let index = self.index_of(id)?;
        let size = self.snap_size(size);

        let element = &mut self.elements[index];
        element.geometry = element.geometry.with_size(size);
        self.spatial_index.upsert(id, &element.geometry);

        self.commit(format!("Resize {id}"));
        debug!(element = %id, width = size.width, height = size.height, "Resized element");
        Ok(())
    }

    /// Remove an element. Elements above it move down one z step.
    pub fn remove_element(&mut self, id: ElementId) -> DocumentResult<()> {
        let index = self.index_of(id)?;
        self.elements.remove(index);
        self.selection.remove(id);
        self.spatial_index.remove(id);

        self.commit(format!("Remove {id}"));
        debug!(element = %id, "Removed element");
        Ok(())
    }

    /// Copy an element onto the top of the z-order, offset by one grid step.
    pub fn duplicate_element(&mut self, id: ElementId) -> DocumentResult<ElementId> {
        let source = self.elements[self.index_of(id)?].clone();
        let offset = self.duplicate_offset();
        let geometry = Geometry {
            x: source.geometry.x + offset,
            y: source.geometry.y + offset,
            ..source.geometry
        };

        let copy = self.push_element(source.kind, geometry, source.content, source.style);
        self.commit(format!("Duplicate {id}"));
        debug!(source = %id, element = %copy, "Duplicated element");
        Ok(copy)
    }

    pub fn reorder_to_front(&mut self, id: ElementId) -> DocumentResult<()> {
        let index = self.index_of(id)?;
        let element = self.elements.remove(index);
        self.elements.push(element);
        self.commit(format!("Bring {id} to front"));
        Ok(())
    }

    pub fn reorder_to_back(&mut self, id: ElementId) -> DocumentResult<()> {
        let index = self.index_of(id)?;
        let element = self.elements.remove(index);
        self.elements.insert(0, element);
        self.commit(format!("Send {id} to back"));
        Ok(())
    }

    /// Swap with the element directly above. No change when already on top.
    pub fn bring_forward(&mut self, id: ElementId) -> DocumentResult<()> {
        let index = self.index_of(id)?;
        if index + 1 < self.elements.len() {
            self.elements.swap(index, index + 1);
        }
        self.commit(format!("Bring {id} forward"));
        Ok(())
    }

    /// Swap with the element directly below. No change when already at the bottom.
    pub fn send_backward(&mut self, id: ElementId) -> DocumentResult<()> {
        let index = self.index_of(id)?;
        if index > 0 {
            self.elements.swap(index, index - 1);
        }
        self.commit(format!("Send {id} backward"));
        Ok(())
    }

    pub fn set_content(
        &mut self,
        id: ElementId,
        content: impl Into<ElementContent>,
    ) -> DocumentResult<()> {
        let index = self.index_of(id)?;
        self.elements[index].content = content.into();
        self.commit(format!("Edit {id} content"));
        Ok(())
    }

    /// Overlay the values set in `style` on the element's current style
    pub fn update_style(&mut self, id: ElementId, style: &StyleOverrides) -> DocumentResult<()> {
        let index = self.index_of(id)?;
        self.elements[index].style.merge(style);
        self.commit(format!("Style {id}"));
        Ok(())
    }

    /// Change paper format and orientation
    pub fn set_page(&mut self, page: PageSetup) -> DocumentResult<()> {
        validate_page(page)?;
        self.config.page = page;
        self.commit(format!("Set page {}", page.format.label()));
        debug!(format = page.format.label(), orientation = ?page.orientation, "Changed page");
        Ok(())
    }

    // ========================================================================
    // Selection-wide operations (recorded)
    // ========================================================================

    /// Move every selected element by a delta, as one history entry.
    ///
    /// Returns the number of elements moved. An empty selection is a no-op
    /// and records nothing.
    pub fn move_selection_by(&mut self, dx: f32, dy: f32) -> DocumentResult<usize> {
        validate_position(Position::new(dx, dy))?;
        if self.selection.is_empty() {
            return Ok(0);
        }

        let grid = self.active_grid();
        let mut moved = 0;
        for element in &mut self.elements {
            if !self.selection.contains(element.id) {
                continue;
            }
            let position = Position::new(
                snap(element.geometry.x + dx, grid),
                snap(element.geometry.y + dy, grid),
            );
            element.geometry = element.geometry.with_position(position);
            self.spatial_index.upsert(element.id, &element.geometry);
            moved += 1;
        }

        self.commit(format!("Move {moved} elements"));
        debug!(count = moved, dx, dy, "Moved selection");
        Ok(moved)
    }

    /// Remove every selected element, as one history entry.
    pub fn remove_selection(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        let before = self.elements.len();
        let selection = &self.selection;
        self.elements.retain(|e| !selection.contains(e.id));
        for id in self.selection.iter() {
            self.spatial_index.remove(id);
        }
        self.selection.clear();

        let removed = before - self.elements.len();
        self.commit(format!("Remove {removed} elements"));
        debug!(count = removed, "Removed selection");
        removed
    }

    // ========================================================================
    // Selection (not recorded)
    // ========================================================================

    /// Change the selection. Fails without touching it if any id is unknown.
    pub fn select(&mut self, ids: &[ElementId], mode: SelectionMode) -> DocumentResult<()> {
        if let Some(missing) = ids.iter().find(|id| !self.contains(**id)) {
            return Err(DocumentError::NotFound(*missing));
        }
        self.selection.apply(ids.iter().copied(), mode);
        trace!(mode = ?mode, selected = self.selection.len(), "Selection changed");
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Marquee selection over a canvas rectangle. Returns the number of
    /// elements the rectangle touched.
    pub fn select_in_rect(
        &mut self,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
        mode: SelectionMode,
    ) -> usize {
        let hits = self.elements_in_rect(min_x, min_y, max_x, max_y);
        self.selection.apply(hits.iter().copied(), mode);
        hits.len()
    }

    // ========================================================================
    // Hit testing
    // ========================================================================

    /// Topmost element under a canvas point
    pub fn element_at(&self, x: f32, y: f32) -> Option<ElementId> {
        self.spatial_index.topmost_at(&self.elements, x, y)
    }

    /// Elements intersecting a canvas rectangle, bottom to top.
    ///
    /// Corners may be given in any order.
    pub fn elements_in_rect(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<ElementId> {
        self.spatial_index
            .in_rect(&self.elements, Bounds::from_corners(x0, y0, x1, y1))
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Step back one entry. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(state) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(state);
        debug!(cursor = self.history.current_index(), "Undo");
        true
    }

    /// Step forward one entry. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(state) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(state);
        debug!(cursor = self.history.current_index(), "Redo");
        true
    }

    // ========================================================================
    // View state (not recorded)
    // ========================================================================

    /// Set the zoom, clamped to the configured range. Returns the applied zoom.
    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        if zoom.is_finite() {
            self.config.zoom = clamp(zoom, self.config.min_zoom, self.config.max_zoom);
        }
        self.config.zoom
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.config.snap_enabled = enabled;
    }

    /// Set the grid spacing. Zero disables snapping without clearing the flag.
    pub fn set_grid_size(&mut self, grid_size: f32) -> DocumentResult<()> {
        if !grid_size.is_finite() || grid_size < 0.0 {
            return Err(DocumentError::constraint(format!(
                "grid size {grid_size} must be finite and non-negative"
            )));
        }
        self.config.grid_size = grid_size;
        Ok(())
    }

    pub fn set_grid_visible(&mut self, visible: bool) {
        self.config.grid_visible = visible;
    }

    // ========================================================================
    // Template layout (recorded)
    // ========================================================================

    /// Lay out one element per template field, stacked top to bottom inside
    /// the page margins, as a single history entry.
    ///
    /// Adopts the template's page setup. Returns the new element ids in
    /// field order.
    pub fn bind_template(&mut self, template: &TemplateDefinition) -> Vec<ElementId> {
        self.layout_fields(template, template.fields().iter())
    }

    /// Like [`bind_template`](Self::bind_template), but only for fields that
    /// resolved to a value.
    pub fn bind_resolved(
        &mut self,
        template: &TemplateDefinition,
        resolved: &ResolvedFieldSet,
    ) -> Vec<ElementId> {
        let visible = template
            .fields()
            .iter()
            .filter(|spec| resolved.is_visible(&spec.name));
        self.layout_fields(template, visible)
    }

    fn layout_fields<'a>(
        &mut self,
        template: &TemplateDefinition,
        fields: impl Iterator<Item = &'a FieldSpec>,
    ) -> Vec<ElementId> {
        self.config.page = template.page();
        self.template_id = Some(template.id().to_string());

        let (page_width, _) = self.config.page_size_px();
        let width = (page_width - 2.0 * TEMPLATE_LAYOUT_MARGIN).max(0.0);
        let grid = self.active_grid();
        let mut y = TEMPLATE_LAYOUT_MARGIN;
        let mut ids = Vec::new();

        for spec in fields {
            let (kind, height) = layout_slot(spec.field_type);
            let geometry = Geometry::new(
                snap(TEMPLATE_LAYOUT_MARGIN, grid),
                snap(y, grid),
                width,
                height,
            );
            ids.push(self.push_element(
                kind,
                geometry,
                ElementContent::field(&spec.name),
                StyleOverrides::default(),
            ));
            y += height + TEMPLATE_LAYOUT_GAP;
        }

        self.commit(format!("Apply template {}", template.id()));
        debug!(template = template.id(), elements = ids.len(), "Laid out template");
        ids
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn index_of(&self, id: ElementId) -> DocumentResult<usize> {
        self.elements
            .iter()
            .position(|e| e.id == id)
            .ok_or(DocumentError::NotFound(id))
    }

    fn allocate_id(&mut self) -> ElementId {
        let id = ElementId(self.next_element_id);
        self.next_element_id += 1;
        id
    }

    /// Append an element on top without recording history
    fn push_element(
        &mut self,
        kind: ElementKind,
        geometry: Geometry,
        content: ElementContent,
        style: StyleOverrides,
    ) -> ElementId {
        let id = self.allocate_id();
        self.spatial_index.upsert(id, &geometry);
        self.elements.push(CanvasElement {
            id,
            kind,
            geometry,
            z_index: 0,
            style,
            content,
        });
        id
    }

    /// Compact z-order and record the current state
    fn commit(&mut self, label: String) {
        self.renumber();
        let state = self.current_state();
        self.history.record(label, state);
        trace!(
            cursor = self.history.current_index(),
            entries = self.history.len(),
            "Recorded history entry"
        );
    }

    fn renumber(&mut self) {
        for (z, element) in self.elements.iter_mut().enumerate() {
            element.z_index = z as u32;
        }
    }

    fn current_state(&self) -> DocumentState {
        DocumentState {
            elements: self.elements.clone(),
            page: self.config.page,
            template_id: self.template_id.clone(),
        }
    }

    fn restore(&mut self, state: DocumentState) {
        self.elements = state.elements;
        self.config.page = state.page;
        self.template_id = state.template_id;
        self.spatial_index.rebuild(&self.elements);
        let elements = &self.elements;
        self.selection
            .retain(|id| elements.iter().any(|e| e.id == id));
    }

    /// Grid spacing used for snapping, zero when snapping is off
    fn active_grid(&self) -> f32 {
        if self.config.snap_enabled {
            self.config.grid_size
        } else {
            0.0
        }
    }

    fn snap_position(&self, position: Position) -> Position {
        let grid = self.active_grid();
        let snapped = Position::new(snap(position.x, grid), snap(position.y, grid));
        if snapped != position {
            trace!(x = position.x, y = position.y, sx = snapped.x, sy = snapped.y, "Snapped position");
        }
        snapped
    }

    fn snap_size(&self, size: Size) -> Size {
        let grid = self.active_grid();
        Size::new(snap_extent(size.width, grid), snap_extent(size.height, grid))
    }

    fn duplicate_offset(&self) -> f32 {
        if self.config.grid_size > 0.0 {
            self.config.grid_size
        } else {
            DUPLICATE_OFFSET
        }
    }
}

/// Element kind and height for a field laid out from a template
fn layout_slot(field_type: FieldType) -> (ElementKind, f32) {
    match field_type {
        FieldType::Currency => (ElementKind::PriceBlock, 120.0),
        FieldType::ImageRef => (ElementKind::Image, 160.0),
        _ => (ElementKind::Text, 40.0),
    }
}

pub(crate) fn validate_page(page: PageSetup) -> DocumentResult<()> {
    if let PaperFormat::Custom {
        width_mm,
        height_mm,
    } = page.format
    {
        if !(width_mm.is_finite() && height_mm.is_finite() && width_mm > 0.0 && height_mm > 0.0) {
            return Err(DocumentError::constraint(format!(
                "custom paper {width_mm}x{height_mm} mm must be positive"
            )));
        }
    }
    Ok(())
}
