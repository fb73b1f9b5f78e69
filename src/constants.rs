//! Engine-wide constants.
//!
//! Centralizes unit ratios, editor limits and defaults so the converter,
//! the document engine and the settings layer agree on the same numbers.

// ============================================================================
// Units
// ============================================================================

/// Editor pixels per millimetre at zoom 1.0 (96 DPI / 25.4 mm per inch)
pub const PX_PER_MM: f32 = 96.0 / 25.4;

// ============================================================================
// Zoom
// ============================================================================

/// Minimum zoom level
pub const MIN_ZOOM: f32 = 0.1;

/// Maximum zoom level
pub const MAX_ZOOM: f32 = 3.0;

/// Default zoom level
pub const DEFAULT_ZOOM: f32 = 1.0;

// ============================================================================
// Grid & Snapping
// ============================================================================

/// Default grid spacing in editor pixels (zoom 1.0)
pub const DEFAULT_GRID_SIZE: f32 = 10.0;

/// Offset applied to duplicated elements when the grid is unusable
pub const DUPLICATE_OFFSET: f32 = 10.0;

/// Vertical gap between elements laid out from a template
pub const TEMPLATE_LAYOUT_GAP: f32 = 10.0;

/// Margin around elements laid out from a template
pub const TEMPLATE_LAYOUT_MARGIN: f32 = 20.0;

// ============================================================================
// History
// ============================================================================

/// Maximum undo history entries to keep (excluding the baseline)
pub const MAX_HISTORY_ENTRIES: usize = 100;

// ============================================================================
// Export
// ============================================================================

/// Export scale factor for draft output
pub const EXPORT_SCALE_DRAFT: f32 = 1.0;

/// Export scale factor for standard output
pub const EXPORT_SCALE_STANDARD: f32 = 2.0;

/// Export scale factor for high quality output
pub const EXPORT_SCALE_HIGH: f32 = 3.0;

// ============================================================================
// Binding
// ============================================================================

/// Minor-unit digits used when a currency field does not declare its own
pub const DEFAULT_CURRENCY_DECIMALS: u8 = 2;

/// Default currency symbol for displayed prices
pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";
