//! Unit and coordinate conversion.
//!
//! Element geometry is stored in one canonical unit: editor pixels at zoom 1.0.
//! This module converts that unit to and from paper millimetres, on-screen
//! editor pixels at a zoom factor, and export pixels at a scale factor, and
//! provides the grid snapping used by the document engine.
//!
//! All functions are pure and total. `NaN` inputs propagate as `NaN`.

use crate::constants::{EXPORT_SCALE_DRAFT, EXPORT_SCALE_HIGH, EXPORT_SCALE_STANDARD, PX_PER_MM};
use crate::types::Geometry;
use serde::{Deserialize, Serialize};

/// Export resolution presets
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportQuality {
    Draft,
    #[default]
    Standard,
    High,
}

impl ExportQuality {
    /// Scale factor applied to canonical editor pixels
    pub fn scale(&self) -> f32 {
        match self {
            ExportQuality::Draft => EXPORT_SCALE_DRAFT,
            ExportQuality::Standard => EXPORT_SCALE_STANDARD,
            ExportQuality::High => EXPORT_SCALE_HIGH,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportQuality::Draft => "Draft",
            ExportQuality::Standard => "Standard",
            ExportQuality::High => "High",
        }
    }
}

/// Target unit system for reading geometry out of a document
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UnitSystem {
    /// On-screen pixels at the given zoom
    EditorPx { zoom: f32 },
    /// Paper millimetres
    Millimeters,
    /// Export pixels at the given scale factor
    ExportPx { scale: f32 },
}

impl From<ExportQuality> for UnitSystem {
    fn from(quality: ExportQuality) -> Self {
        UnitSystem::ExportPx {
            scale: quality.scale(),
        }
    }
}

pub struct UnitConverter;

impl UnitConverter {
    /// Convert paper millimetres to editor pixels at `zoom`
    #[inline]
    pub fn mm_to_editor_px(mm: f32, zoom: f32) -> f32 {
        mm * PX_PER_MM * zoom
    }

    /// Convert editor pixels at `zoom` back to paper millimetres
    #[inline]
    pub fn editor_px_to_mm(px: f32, zoom: f32) -> f32 {
        px / (PX_PER_MM * zoom)
    }

    /// Rescale canonical editor pixels (zoom 1.0) to export pixels.
    ///
    /// Independent of the current editor zoom.
    #[inline]
    pub fn editor_px_to_export_px(px: f32, export_scale: f32) -> f32 {
        px * export_scale
    }

    /// Convert export pixels back to canonical editor pixels
    #[inline]
    pub fn export_px_to_editor_px(px: f32, export_scale: f32) -> f32 {
        px / export_scale
    }

    /// Convert a canonical length to the target unit system
    #[inline]
    pub fn length_to(px: f32, system: UnitSystem) -> f32 {
        match system {
            UnitSystem::EditorPx { zoom } => px * zoom,
            UnitSystem::Millimeters => Self::editor_px_to_mm(px, 1.0),
            UnitSystem::ExportPx { scale } => Self::editor_px_to_export_px(px, scale),
        }
    }

    /// Convert canonical geometry to the target unit system
    pub fn geometry_to(geometry: &Geometry, system: UnitSystem) -> Geometry {
        Geometry {
            x: Self::length_to(geometry.x, system),
            y: Self::length_to(geometry.y, system),
            width: Self::length_to(geometry.width, system),
            height: Self::length_to(geometry.height, system),
        }
    }
}

/// Round `value` to the nearest multiple of `grid_size`.
///
/// No-op when `grid_size` is not strictly positive.
#[inline]
pub fn snap(value: f32, grid_size: f32) -> f32 {
    if !(grid_size > 0.0) {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Snap a size so it never collapses below one grid step.
#[inline]
pub fn snap_extent(value: f32, grid_size: f32) -> f32 {
    if !(grid_size > 0.0) {
        return value;
    }
    snap(value, grid_size).max(grid_size)
}

/// Limit `value` to `[min, max]`. A `NaN` value is returned unchanged.
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}
