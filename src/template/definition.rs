//! Template definitions: the semantic fields a poster layout accepts.
//!
//! A template is pure data. It is validated once, when it is built, so the
//! binding resolver can walk its fields linearly in declaration order.

use crate::error::{TemplateError, TemplateResult};
use crate::types::PageSetup;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Semantic type of a template field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Currency,
    Percentage,
    /// Plain quantity (installment count, net weight, units per pack)
    Number,
    Text,
    Date,
    ImageRef,
    FinancingList,
}

impl FieldType {
    /// Whether values of this type are numbers and can be derived
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Currency | FieldType::Percentage | FieldType::Number
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldType::Currency => "currency",
            FieldType::Percentage => "percentage",
            FieldType::Number => "number",
            FieldType::Text => "text",
            FieldType::Date => "date",
            FieldType::ImageRef => "image_ref",
            FieldType::FinancingList => "financing_list",
        }
    }
}

/// Right-hand operand of a derivation: another field or a constant.
///
/// In JSON a string names a field and a number is a constant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Field(String),
    Constant(f64),
}

impl Operand {
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Operand::Field(name) => Some(name),
            Operand::Constant(_) => None,
        }
    }
}

/// How a numeric field is computed from fields declared before it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Derivation {
    /// `base × (100 − percent) / 100`
    PercentOff { base: String, percent: String },
    /// `base × (100 + percent) / 100`
    Surcharge { base: String, percent: String },
    /// `field / by`; unresolved when the divisor is zero
    Divide { field: String, by: Operand },
    /// `field × by`
    Multiply { field: String, by: Operand },
}

impl Derivation {
    /// Names of the fields this rule reads
    pub fn references(&self) -> Vec<&str> {
        match self {
            Derivation::PercentOff { base, percent } | Derivation::Surcharge { base, percent } => {
                vec![base.as_str(), percent.as_str()]
            }
            Derivation::Divide { field, by } | Derivation::Multiply { field, by } => {
                let mut refs = vec![field.as_str()];
                refs.extend(by.field_name());
                refs
            }
        }
    }
}

/// Declaration of one field accepted by a template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, also the (possibly dotted) lookup path in the data record
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    /// Raw value used when the record supplies nothing and no rule applies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derive: Option<Derivation>,
    /// Minor-unit digits for rounding derived values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    /// Price field used to compute installment amounts of a financing list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Human-readable label for editors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            fallback: None,
            derive: None,
            decimals: None,
            base: None,
            label: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<serde_json::Value>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    pub fn derived(mut self, rule: Derivation) -> Self {
        self.derive = Some(rule);
        self
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = Some(decimals);
        self
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Every field name this declaration depends on
    pub fn references(&self) -> Vec<&str> {
        let mut refs = self
            .derive
            .as_ref()
            .map(Derivation::references)
            .unwrap_or_default();
        refs.extend(self.base.as_deref());
        refs
    }
}

/// Unvalidated template as it appears in configuration files.
#[derive(Clone, Debug, Deserialize)]
pub struct TemplateSource {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub page: PageSetup,
    pub fields: Vec<FieldSpec>,
}

/// A validated, immutable template definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TemplateSource")]
pub struct TemplateDefinition {
    id: String,
    name: String,
    page: PageSetup,
    fields: Vec<FieldSpec>,
}

impl TemplateDefinition {
    /// Build and validate a template.
    ///
    /// Fails on duplicate field names, derivations over non-numeric fields,
    /// references to unknown or later-declared fields, and derivation cycles.
    pub fn new(id: impl Into<String>, fields: Vec<FieldSpec>) -> TemplateResult<Self> {
        let id = id.into();
        Self::from_source(TemplateSource {
            name: None,
            id,
            page: PageSetup::default(),
            fields,
        })
    }

    pub fn from_source(source: TemplateSource) -> TemplateResult<Self> {
        validate_fields(&source.id, &source.fields)?;
        Ok(Self {
            name: source.name.unwrap_or_else(|| source.id.clone()),
            id: source.id,
            page: source.page,
            fields: source.fields,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_page(mut self, page: PageSetup) -> Self {
        self.page = page;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default page setup for posters built from this template
    pub fn page(&self) -> PageSetup {
        self.page
    }

    /// Field declarations in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }
}

impl TryFrom<TemplateSource> for TemplateDefinition {
    type Error = TemplateError;

    fn try_from(source: TemplateSource) -> Result<Self, Self::Error> {
        Self::from_source(source)
    }
}

fn validate_fields(template: &str, fields: &[FieldSpec]) -> TemplateResult<()> {
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(fields.len());
    for (i, field) in fields.iter().enumerate() {
        if positions.insert(field.name.as_str(), i).is_some() {
            return Err(TemplateError::DuplicateField {
                template: template.to_string(),
                field: field.name.clone(),
            });
        }
    }

    for field in fields {
        if field.derive.is_some() && !field.field_type.is_numeric() {
            return Err(TemplateError::InvalidDerivation {
                template: template.to_string(),
                field: field.name.clone(),
                field_type: field.field_type.label().to_string(),
            });
        }
        for reference in field.references() {
            if !positions.contains_key(reference) {
                return Err(TemplateError::UnknownReference {
                    template: template.to_string(),
                    field: field.name.clone(),
                    reference: reference.to_string(),
                });
            }
        }
    }

    if let Some(cycle) = find_cycle(fields, &positions) {
        return Err(TemplateError::DerivationCycle {
            template: template.to_string(),
            cycle,
        });
    }

    for (i, field) in fields.iter().enumerate() {
        for reference in field.references() {
            if positions[reference] >= i {
                return Err(TemplateError::ForwardReference {
                    template: template.to_string(),
                    field: field.name.clone(),
                    reference: reference.to_string(),
                });
            }
        }
    }

    Ok(())
}

/// Depth-first search over the reference graph. Returns the first cycle
/// found as a path that starts and ends on the same field.
fn find_cycle(fields: &[FieldSpec], positions: &HashMap<&str, usize>) -> Option<Vec<String>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    fn visit(
        node: usize,
        fields: &[FieldSpec],
        positions: &HashMap<&str, usize>,
        marks: &mut [Mark],
        stack: &mut Vec<usize>,
    ) -> Option<Vec<String>> {
        marks[node] = Mark::InProgress;
        stack.push(node);

        for reference in fields[node].references() {
            let next = positions[reference];
            match marks[next] {
                Mark::InProgress => {
                    let start = stack.iter().position(|&n| n == next).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        stack[start..].iter().map(|&n| fields[n].name.clone()).collect();
                    cycle.push(fields[next].name.clone());
                    return Some(cycle);
                }
                Mark::Unvisited => {
                    if let Some(cycle) = visit(next, fields, positions, marks, stack) {
                        return Some(cycle);
                    }
                }
                Mark::Done => {}
            }
        }

        stack.pop();
        marks[node] = Mark::Done;
        None
    }

    let mut marks = vec![Mark::Unvisited; fields.len()];
    let mut stack = Vec::new();
    for node in 0..fields.len() {
        if marks[node] == Mark::Unvisited {
            if let Some(cycle) = visit(node, fields, positions, &mut marks, &mut stack) {
                return Some(cycle);
            }
        }
    }
    None
}
