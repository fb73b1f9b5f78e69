//! Binding resolver: merges a data record into a template's field declarations.
//!
//! Fields are resolved in declaration order. Each one is taken from the
//! record, computed from earlier fields, or defaulted to its fallback, in
//! that order of preference. Data problems never abort a resolution; they are
//! collected as [`ValidationIssue`]s next to the (partial) result.

use super::format::NumberFormat;
use super::record::{DataRecord, is_absent};
use super::value::{FieldValue, parse_value, round_to};
use crate::constants::DEFAULT_CURRENCY_DECIMALS;
use crate::error::{BindingError, ValidationError, ValidationIssue};
use crate::template::{Derivation, FieldSpec, FieldType, Operand, TemplateDefinition};
use serde::Serialize;
use std::collections::HashMap;

/// Where a resolved value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Supplied,
    Derived,
    Fallback,
    Missing,
}

/// Outcome of binding one field.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedField {
    pub name: String,
    pub field_type: FieldType,
    /// Minor-unit digits used for this field's numbers
    pub decimals: u8,
    pub value: Option<FieldValue>,
    pub provenance: Provenance,
}

impl ResolvedField {
    fn missing(spec: &FieldSpec) -> Self {
        Self {
            name: spec.name.clone(),
            field_type: spec.field_type,
            decimals: decimals_of(spec),
            value: None,
            provenance: Provenance::Missing,
        }
    }

    fn with(spec: &FieldSpec, value: FieldValue, provenance: Provenance) -> Self {
        Self {
            value: Some(value),
            provenance,
            ..Self::missing(spec)
        }
    }

    pub fn number(&self) -> Option<f64> {
        self.value.as_ref().and_then(FieldValue::as_number)
    }

    /// Whether this field has something to render
    pub fn is_visible(&self) -> bool {
        self.value.is_some()
    }
}

/// Full resolution of a template: one entry per field, in declaration order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedFieldSet {
    template_id: String,
    fields: Vec<ResolvedField>,
    issues: Vec<ValidationIssue>,
}

impl ResolvedFieldSet {
    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn fields(&self) -> &[ResolvedField] {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.get(name).and_then(|f| f.value.as_ref())
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ResolvedField::number)
    }

    pub fn provenance(&self, name: &str) -> Option<Provenance> {
        self.get(name).map(|f| f.provenance)
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.get(name).is_some_and(ResolvedField::is_visible)
    }

    /// Fields that have a value to render, in declaration order
    pub fn visible_fields(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields.iter().filter(|f| f.is_visible())
    }

    /// Formatted display text of a field, `None` when it has no value
    pub fn display(&self, name: &str, format: &NumberFormat) -> Option<String> {
        let field = self.get(name)?;
        let value = field.value.as_ref()?;
        Some(format.value(field.field_type, value, field.decimals))
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Turn collected issues into an error, for callers that block on them
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                issues: self.issues.clone(),
            })
        }
    }
}

/// Resolve `template` against `data`.
///
/// Returns every field of the template, in order, together with the list of
/// validation issues. Fails only when a derivation reads a field that cannot
/// have been resolved yet, which is a template defect.
pub fn resolve(
    template: &TemplateDefinition,
    data: &DataRecord,
) -> Result<ResolvedFieldSet, BindingError> {
    let specs = template.fields();
    let mut fields: Vec<ResolvedField> = Vec::with_capacity(specs.len());
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(specs.len());
    let mut issues = Vec::new();

    for spec in specs {
        let resolved = resolve_field(template, spec, data, &fields, &positions, &mut issues)?;
        positions.insert(spec.name.as_str(), fields.len());
        fields.push(resolved);
    }

    if issues.is_empty() {
        tracing::debug!(template = template.id(), fields = fields.len(), "Resolved template");
    } else {
        tracing::warn!(
            template = template.id(),
            fields = fields.len(),
            issues = issues.len(),
            "Resolved template with validation issues"
        );
    }

    Ok(ResolvedFieldSet {
        template_id: template.id().to_string(),
        fields,
        issues,
    })
}

fn resolve_field(
    template: &TemplateDefinition,
    spec: &FieldSpec,
    data: &DataRecord,
    resolved: &[ResolvedField],
    positions: &HashMap<&str, usize>,
    issues: &mut Vec<ValidationIssue>,
) -> Result<ResolvedField, BindingError> {
    let lookup = |name: &str| positions.get(name).map(|&i| &resolved[i]);

    // Every dependency must already be resolved in declaration order
    for reference in spec.references() {
        if lookup(reference).is_none() {
            return Err(BindingError::DerivationCycle {
                template: template.id().to_string(),
                field: spec.name.clone(),
            });
        }
    }

    if let Some(raw) = data.get(&spec.name) {
        return Ok(match parse_value(spec.field_type, raw) {
            Ok(value) => ResolvedField::with(spec, finish(spec, value, &lookup), Provenance::Supplied),
            Err(found) => {
                issues.push(ValidationIssue::InvalidValue {
                    field: spec.name.clone(),
                    expected: spec.field_type.label().to_string(),
                    found,
                });
                ResolvedField::missing(spec)
            }
        });
    }

    if let Some(rule) = &spec.derive {
        if let Some(n) = derive(rule, &lookup) {
            let value = FieldValue::Number(round_to(n, decimals_of(spec)));
            return Ok(ResolvedField::with(spec, value, Provenance::Derived));
        }
    }

    if let Some(raw) = spec.fallback.as_ref().filter(|raw| !is_absent(raw)) {
        return Ok(match parse_value(spec.field_type, raw) {
            Ok(value) => ResolvedField::with(spec, finish(spec, value, &lookup), Provenance::Fallback),
            Err(found) => {
                issues.push(ValidationIssue::InvalidValue {
                    field: spec.name.clone(),
                    expected: spec.field_type.label().to_string(),
                    found,
                });
                ResolvedField::missing(spec)
            }
        });
    }

    if spec.required {
        issues.push(ValidationIssue::MissingRequired {
            field: spec.name.clone(),
        });
    }
    Ok(ResolvedField::missing(spec))
}

/// Post-process a parsed value: price financing plans against the base field.
fn finish<'a>(
    spec: &FieldSpec,
    value: FieldValue,
    lookup: &impl Fn(&str) -> Option<&'a ResolvedField>,
) -> FieldValue {
    match (value, spec.base.as_deref()) {
        (FieldValue::Financing(mut options), Some(base)) => {
            if let Some(base_field) = lookup(base) {
                if let Some(price) = base_field.number() {
                    for option in &mut options {
                        option.price_against(price, base_field.decimals);
                    }
                }
            }
            FieldValue::Financing(options)
        }
        (value, _) => value,
    }
}

/// Evaluate a derivation rule. `None` when an input is unresolved or the
/// result is not a finite number.
fn derive<'a>(rule: &Derivation, lookup: &impl Fn(&str) -> Option<&'a ResolvedField>) -> Option<f64> {
    let number = |name: &str| lookup(name).and_then(ResolvedField::number);
    let operand = |op: &Operand| match op {
        Operand::Field(name) => number(name),
        Operand::Constant(c) => Some(*c),
    };

    let result = match rule {
        Derivation::PercentOff { base, percent } => number(base)? * (100.0 - number(percent)?) / 100.0,
        Derivation::Surcharge { base, percent } => number(base)? * (100.0 + number(percent)?) / 100.0,
        Derivation::Divide { field, by } => {
            let divisor = operand(by)?;
            if divisor == 0.0 {
                return None;
            }
            number(field)? / divisor
        }
        Derivation::Multiply { field, by } => number(field)? * operand(by)?,
    };
    result.is_finite().then_some(result)
}

fn decimals_of(spec: &FieldSpec) -> u8 {
    spec.decimals.unwrap_or(match spec.field_type {
        FieldType::Currency => DEFAULT_CURRENCY_DECIMALS,
        _ => 2,
    })
}
