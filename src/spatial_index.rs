//! Spatial Index Module
//!
//! R-tree over element bounding boxes. The tree only answers "which boxes
//! touch this point or rectangle"; stacking order stays with the document,
//! so the z-ordered queries take the element list as input.

use crate::types::{CanvasElement, ElementId, Geometry};
use rstar::{AABB, RTree, RTreeObject};
use std::collections::{HashMap, HashSet};

/// Axis-aligned rectangle in canvas coordinates with ordered corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    /// Rectangle spanned by two opposite corners given in any order
    pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    pub fn of(geometry: &Geometry) -> Self {
        Self {
            min_x: geometry.x,
            min_y: geometry.y,
            max_x: geometry.max_x(),
            max_y: geometry.max_y(),
        }
    }

    #[inline]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    fn envelope(&self) -> AABB<[f32; 2]> {
        AABB::from_corners([self.min_x, self.min_y], [self.max_x, self.max_y])
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: ElementId,
    bounds: Bounds,
}

impl RTreeObject for Entry {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bounds.envelope()
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Bounding-box index over the elements of one document.
pub struct SpatialIndex {
    tree: RTree<Entry>,
    bounds: HashMap<ElementId, Bounds>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self {
            tree: RTree::new(),
            bounds: HashMap::new(),
        }
    }

    pub fn from_elements(elements: &[CanvasElement]) -> Self {
        let mut index = Self::new();
        index.rebuild(elements);
        index
    }

    /// Bulk-load from scratch, replacing every entry
    pub fn rebuild(&mut self, elements: &[CanvasElement]) {
        let entries: Vec<Entry> = elements
            .iter()
            .map(|e| Entry {
                id: e.id,
                bounds: Bounds::of(&e.geometry),
            })
            .collect();
        self.bounds = entries.iter().map(|e| (e.id, e.bounds)).collect();
        self.tree = RTree::bulk_load(entries);
    }

    /// Insert an element or move its existing entry
    pub fn upsert(&mut self, id: ElementId, geometry: &Geometry) {
        let bounds = Bounds::of(geometry);
        if let Some(old) = self.bounds.insert(id, bounds) {
            self.tree.remove(&Entry { id, bounds: old });
        }
        self.tree.insert(Entry { id, bounds });
    }

    pub fn remove(&mut self, id: ElementId) -> bool {
        match self.bounds.remove(&id) {
            Some(bounds) => self.tree.remove(&Entry { id, bounds }).is_some(),
            None => false,
        }
    }

    pub fn bounds(&self, id: ElementId) -> Option<Bounds> {
        self.bounds.get(&id).copied()
    }

    /// Ids whose box contains the point, in no particular order
    pub fn hits_at(&self, x: f32, y: f32) -> HashSet<ElementId> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([x, y]))
            .filter(|entry| entry.bounds.contains_point(x, y))
            .map(|entry| entry.id)
            .collect()
    }

    /// Ids whose box touches the rectangle, in no particular order
    pub fn hits_in(&self, rect: Bounds) -> HashSet<ElementId> {
        self.tree
            .locate_in_envelope_intersecting(&rect.envelope())
            .map(|entry| entry.id)
            .collect()
    }

    /// Topmost element under the point. `elements` must be in z-order.
    pub fn topmost_at(&self, elements: &[CanvasElement], x: f32, y: f32) -> Option<ElementId> {
        let hits = self.hits_at(x, y);
        if hits.is_empty() {
            return None;
        }
        elements.iter().rev().map(|e| e.id).find(|id| hits.contains(id))
    }

    /// Elements touching the rectangle, bottom to top
    pub fn in_rect(&self, elements: &[CanvasElement], rect: Bounds) -> Vec<ElementId> {
        let hits = self.hits_in(rect);
        elements
            .iter()
            .map(|e| e.id)
            .filter(|id| hits.contains(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("len", &self.bounds.len())
            .finish()
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
