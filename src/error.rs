//! Error types for the poster engine.
//!
//! Each component reports failures through its own enum so callers can tell
//! a template authoring bug from a data-quality issue or an editor misuse.

use crate::types::ElementId;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while building or looking up template definitions.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// No template registered under this id
    #[error("template not found: {id}")]
    NotFound { id: String },

    /// Two templates share the same id
    #[error("duplicate template id: {id}")]
    DuplicateTemplate { id: String },

    /// A template declares the same field twice
    #[error("template {template}: field {field} declared more than once")]
    DuplicateField { template: String, field: String },

    /// A derivation names a field the template does not declare
    #[error("template {template}: field {field} derives from unknown field {reference}")]
    UnknownReference {
        template: String,
        field: String,
        reference: String,
    },

    /// A derivation names a field declared after it
    #[error("template {template}: field {field} derives from {reference}, which is declared later")]
    ForwardReference {
        template: String,
        field: String,
        reference: String,
    },

    /// Derivation rules reference each other circularly
    #[error("template {template}: derivation cycle {}", .cycle.join(" -> "))]
    DerivationCycle { template: String, cycle: Vec<String> },

    /// A derivation is declared on a field that cannot hold a number
    #[error("template {template}: field {field} of type {field_type} cannot be derived")]
    InvalidDerivation {
        template: String,
        field: String,
        field_type: String,
    },

    /// Template source could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Template source is not valid JSON
    #[error("template parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type alias for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Fatal binding failures. Data-quality problems are never reported here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindingError {
    /// A derived field's inputs are not resolvable in declaration order
    #[error("template {template}: derivation cycle at field {field}")]
    DerivationCycle { template: String, field: String },
}

/// One problem found while resolving a template against a data record.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    /// A required field is absent after derivation and fallback
    #[error("required field {field} is missing")]
    MissingRequired { field: String },

    /// A supplied value could not be read as the field's type
    #[error("field {field} expects {expected}, got {found}")]
    InvalidValue {
        field: String,
        expected: String,
        found: String,
    },
}

impl ValidationIssue {
    /// Name of the field this issue refers to
    pub fn field(&self) -> &str {
        match self {
            Self::MissingRequired { field } | Self::InvalidValue { field, .. } => field,
        }
    }
}

/// Non-fatal validation failure for a whole resolution.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{} field(s) failed validation: {}", .issues.len(), describe(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn describe(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised by canvas document operations.
///
/// A failed operation leaves the document and its history untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// The element id does not exist in the document
    #[error("element not found: {0}")]
    NotFound(ElementId),

    /// Geometry or configuration would break a document invariant
    #[error("constraint violation: {reason}")]
    ConstraintViolation { reason: String },
}

impl DocumentError {
    pub(crate) fn constraint(reason: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            reason: reason.into(),
        }
    }
}

/// Result type alias for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Errors raised while saving or rehydrating a serialized document.
#[derive(Error, Debug)]
pub enum PersistError {
    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Document was written by a newer schema
    #[error("unsupported document version {found} (max {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Document content breaks an invariant
    #[error("corrupt document: {0}")]
    Corrupt(String),
}

impl From<tempfile::PersistError> for PersistError {
    fn from(e: tempfile::PersistError) -> Self {
        PersistError::Io(e.error)
    }
}
