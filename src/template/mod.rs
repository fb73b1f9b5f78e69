//! Template module - declarative poster templates.
//!
//! Every poster variant is a [`TemplateDefinition`]: an ordered list of
//! [`FieldSpec`] declarations with types, fallbacks and derivation rules.
//! One generic resolver and one generic layout consume them; there is no
//! per-template code.

mod definition;
mod registry;

pub use definition::*;
pub use registry::*;
