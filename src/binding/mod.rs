//! Binding module - merges product and promotion data into templates.
//!
//! - [`DataRecord`]: raw values addressed by field name or dotted path
//! - [`resolve`]: per-field resolution with provenance and validation issues
//! - [`NumberFormat`]: display text for resolved values

mod format;
mod record;
mod resolver;
mod value;

pub use format::{DEFAULT_DATE_PATTERN, NumberFormat, is_valid_date_pattern};
pub use record::{DataRecord, is_absent};
pub use resolver::{Provenance, ResolvedField, ResolvedFieldSet, resolve};
pub use value::{FieldValue, FinancingOption, parse_date, parse_number, parse_value, round_to};
