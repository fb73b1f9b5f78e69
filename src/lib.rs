//! Carteles - template binding and layout engine for retail promotional posters.
//!
//! The engine is four cooperating pieces, all synchronous and in-memory:
//!
//! - [`template`]: declarative poster templates and their registry
//! - [`binding`]: resolution of product/promotion data against a template
//! - [`units`]: conversion between millimetres, editor pixels and export pixels
//! - [`document`]: the canvas document with z-order, selection and undo/redo
//!
//! [`export`] joins a document and a resolved field set into what a renderer
//! draws. Rasterization, PDF output and storage backends are left to the host.

pub mod binding;
pub mod constants;
pub mod document;
pub mod error;
pub mod export;
pub mod logging;
pub mod settings;
pub mod spatial_index;
pub mod template;
pub mod types;
pub mod units;

pub use binding::{DataRecord, NumberFormat, Provenance, ResolvedField, ResolvedFieldSet, resolve};
pub use document::{CanvasDocument, HistoryState, SelectionMode};
pub use error::{
    BindingError, DocumentError, PersistError, TemplateError, ValidationError, ValidationIssue,
};
pub use export::ExportLayout;
pub use settings::Settings;
pub use template::{FieldSpec, FieldType, TemplateDefinition, TemplateRegistry};
pub use types::{
    CanvasConfig, CanvasElement, ElementContent, ElementId, ElementKind, Geometry, Position, Size,
};
pub use units::{ExportQuality, UnitConverter, UnitSystem};
