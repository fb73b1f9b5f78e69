//! Template registry: lookup of template definitions by id.
//!
//! Definitions are static configuration loaded once at startup. The registry
//! holds no other state and is `Send + Sync`, so a single instance can be
//! shared by reference or behind an `Arc` by any number of readers.

use super::definition::{FieldSpec, TemplateDefinition, TemplateSource};
use crate::error::{TemplateError, TemplateResult};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Built-in template set, embedded at compile time
const BUILTIN_TEMPLATES: &str = include_str!("builtin.json");

static BUILTIN: Lazy<TemplateRegistry> = Lazy::new(|| {
    TemplateRegistry::from_json_str(BUILTIN_TEMPLATES)
        .expect("built-in template definitions must be valid")
});

/// On-disk shape of a template file: either a bare array or `{"templates": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum TemplateFile {
    Wrapped { templates: Vec<TemplateSource> },
    Bare(Vec<TemplateSource>),
}

impl TemplateFile {
    fn into_sources(self) -> Vec<TemplateSource> {
        match self {
            TemplateFile::Wrapped { templates } => templates,
            TemplateFile::Bare(templates) => templates,
        }
    }
}

/// Registry of template definitions, in registration order.
#[derive(Clone, Debug, Default)]
pub struct TemplateRegistry {
    templates: Vec<TemplateDefinition>,
    index: HashMap<String, usize>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide built-in templates
    pub fn builtin() -> &'static TemplateRegistry {
        &BUILTIN
    }

    /// Build a registry from already validated templates.
    pub fn from_templates<I>(templates: I) -> TemplateResult<Self>
    where
        I: IntoIterator<Item = TemplateDefinition>,
    {
        let mut registry = Self::new();
        for template in templates {
            registry.insert(template)?;
        }
        Ok(registry)
    }

    /// Parse and validate a JSON template file.
    pub fn from_json_str(json: &str) -> TemplateResult<Self> {
        let file: TemplateFile = serde_json::from_str(json)?;
        let templates = file
            .into_sources()
            .into_iter()
            .map(TemplateDefinition::from_source)
            .collect::<TemplateResult<Vec<_>>>()?;
        let registry = Self::from_templates(templates)?;
        tracing::info!(templates = registry.len(), "Loaded template definitions");
        Ok(registry)
    }

    /// Load a JSON template file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> TemplateResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Register a template. Ids must be unique.
    pub fn insert(&mut self, template: TemplateDefinition) -> TemplateResult<()> {
        if self.index.contains_key(template.id()) {
            return Err(TemplateError::DuplicateTemplate {
                id: template.id().to_string(),
            });
        }
        self.index
            .insert(template.id().to_string(), self.templates.len());
        self.templates.push(template);
        Ok(())
    }

    /// Look up a template by id.
    pub fn get_template(&self, template_id: &str) -> TemplateResult<&TemplateDefinition> {
        self.index
            .get(template_id)
            .map(|&i| &self.templates[i])
            .ok_or_else(|| TemplateError::NotFound {
                id: template_id.to_string(),
            })
    }

    /// Field declarations of a template, in declaration order.
    pub fn list_field_specs(&self, template_id: &str) -> TemplateResult<&[FieldSpec]> {
        self.get_template(template_id).map(TemplateDefinition::fields)
    }

    pub fn contains(&self, template_id: &str) -> bool {
        self.index.contains_key(template_id)
    }

    pub fn template_ids(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(TemplateDefinition::id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemplateDefinition> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
