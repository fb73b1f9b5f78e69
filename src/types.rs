//! Core types for the poster canvas.
//!
//! This module defines the data structures placed on a poster document:
//! element identifiers, geometry, content payloads, style overrides and the
//! canvas-level page and grid configuration.

use crate::constants::{DEFAULT_GRID_SIZE, DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM, PX_PER_MM};
use crate::error::{DocumentError, DocumentResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Element Identifiers
// ============================================================================

/// Unique identifier of an element within one document.
///
/// Displayed and serialized as `e<n>` (`e1`, `e2`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

impl FromStr for ElementId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix('e')
            .and_then(|n| n.parse::<u64>().ok())
            .map(ElementId)
            .ok_or_else(|| format!("invalid element id: {s:?}"))
    }
}

impl TryFrom<String> for ElementId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ElementId> for String {
    fn from(id: ElementId) -> Self {
        id.to_string()
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// A position in editor pixels at zoom 1.0
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A size in editor pixels at zoom 1.0
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Placement of an element, in the canonical unit (editor pixels at zoom 1.0).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Geometry {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn with_position(self, position: Position) -> Self {
        Self {
            x: position.x,
            y: position.y,
            ..self
        }
    }

    pub fn with_size(self, size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
            ..self
        }
    }

    /// Right edge
    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.max_x() && y >= self.y && y <= self.max_y()
    }

    /// Reject geometry that would corrupt the document: non-finite values
    /// anywhere, or a negative width/height.
    pub fn validate(&self) -> DocumentResult<()> {
        validate_position(self.position())?;
        validate_size(self.size())
    }
}

pub(crate) fn validate_position(position: Position) -> DocumentResult<()> {
    if !position.x.is_finite() || !position.y.is_finite() {
        return Err(DocumentError::constraint(format!(
            "position ({}, {}) is not finite",
            position.x, position.y
        )));
    }
    Ok(())
}

pub(crate) fn validate_size(size: Size) -> DocumentResult<()> {
    if !size.width.is_finite() || !size.height.is_finite() {
        return Err(DocumentError::constraint(format!(
            "size {}x{} is not finite",
            size.width, size.height
        )));
    }
    if size.width < 0.0 || size.height < 0.0 {
        return Err(DocumentError::constraint(format!(
            "size {}x{} is negative",
            size.width, size.height
        )));
    }
    Ok(())
}

// ============================================================================
// Elements
// ============================================================================

/// What kind of visual unit an element is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Text,
    Image,
    PriceBlock,
    Shape,
    Barcode,
}

impl ElementKind {
    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::Text => "Text",
            ElementKind::Image => "Image",
            ElementKind::PriceBlock => "Price",
            ElementKind::Shape => "Shape",
            ElementKind::Barcode => "Barcode",
        }
    }
}

/// What an element displays: literal content or a reference to a template field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementContent {
    /// Fixed content typed in the editor
    Literal { value: String },
    /// Value of a resolved template field, looked up by name at export time
    Field { name: String },
    /// Purely decorative element (shapes, frames)
    Empty,
}

impl ElementContent {
    pub fn literal(value: impl Into<String>) -> Self {
        ElementContent::Literal {
            value: value.into(),
        }
    }

    pub fn field(name: impl Into<String>) -> Self {
        ElementContent::Field { name: name.into() }
    }

    /// The referenced field name, if this content is bound to a field
    pub fn field_name(&self) -> Option<&str> {
        match self {
            ElementContent::Field { name } => Some(name),
            _ => None,
        }
    }
}

impl From<&str> for ElementContent {
    fn from(value: &str) -> Self {
        ElementContent::literal(value)
    }
}

impl From<String> for ElementContent {
    fn from(value: String) -> Self {
        ElementContent::Literal { value }
    }
}

/// Horizontal text alignment
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Per-element style overrides. Unset values inherit the renderer's defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    /// Text color as hex string (e.g., "#d32f2f")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
    /// Rotation in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
}

impl StyleOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay every value set in `other` on top of this style.
    pub fn merge(&mut self, other: &StyleOverrides) {
        if other.font_size.is_some() {
            self.font_size = other.font_size;
        }
        if other.font_weight.is_some() {
            self.font_weight.clone_from(&other.font_weight);
        }
        if other.color.is_some() {
            self.color.clone_from(&other.color);
        }
        if other.background.is_some() {
            self.background.clone_from(&other.background);
        }
        if other.align.is_some() {
            self.align = other.align;
        }
        if other.rotation.is_some() {
            self.rotation = other.rotation;
        }
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = Some(align);
        self
    }
}

/// A visual unit placed on the poster.
///
/// Owned by a [`CanvasDocument`](crate::document::CanvasDocument); `z_index`
/// is maintained by the document and always lies in `0..len`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasElement {
    pub id: ElementId,
    pub kind: ElementKind,
    pub geometry: Geometry,
    pub z_index: u32,
    #[serde(default, skip_serializing_if = "StyleOverrides::is_empty")]
    pub style: StyleOverrides,
    pub content: ElementContent,
}

// ============================================================================
// Page & Canvas Configuration
// ============================================================================

/// Paper format of the printed poster
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperFormat {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperFormat {
    /// Portrait width and height in millimetres
    pub fn size_mm(&self) -> (f32, f32) {
        match self {
            PaperFormat::A3 => (297.0, 420.0),
            PaperFormat::A4 => (210.0, 297.0),
            PaperFormat::A5 => (148.0, 210.0),
            PaperFormat::Letter => (215.9, 279.4),
            PaperFormat::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaperFormat::A3 => "A3",
            PaperFormat::A4 => "A4",
            PaperFormat::A5 => "A5",
            PaperFormat::Letter => "Letter",
            PaperFormat::Custom { .. } => "Custom",
        }
    }
}

/// Page orientation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Paper format plus orientation. Part of the undoable document state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSetup {
    pub format: PaperFormat,
    pub orientation: Orientation,
}

impl PageSetup {
    pub fn new(format: PaperFormat, orientation: Orientation) -> Self {
        Self {
            format,
            orientation,
        }
    }

    /// Page width and height in millimetres, orientation applied
    pub fn size_mm(&self) -> (f32, f32) {
        let (w, h) = self.format.size_mm();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Page width and height in editor pixels at zoom 1.0
    pub fn size_px(&self) -> (f32, f32) {
        let (w, h) = self.size_mm();
        (w * PX_PER_MM, h * PX_PER_MM)
    }
}

/// Canvas-level configuration of a document.
///
/// Only `page` is recorded in history; grid, snapping and zoom are view state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub page: PageSetup,
    /// Grid spacing in editor pixels at zoom 1.0
    pub grid_size: f32,
    pub grid_visible: bool,
    pub snap_enabled: bool,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            page: PageSetup::default(),
            grid_size: DEFAULT_GRID_SIZE,
            grid_visible: true,
            snap_enabled: false,
            zoom: DEFAULT_ZOOM,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl CanvasConfig {
    pub fn with_page(mut self, page: PageSetup) -> Self {
        self.page = page;
        self
    }

    pub fn with_snap(mut self, grid_size: f32) -> Self {
        self.grid_size = grid_size;
        self.snap_enabled = true;
        self
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    /// Page size in editor pixels at zoom 1.0
    pub fn page_size_px(&self) -> (f32, f32) {
        self.page.size_px()
    }
}
