//! Serialized form of a canvas document.
//!
//! The persistence layer stores and returns [`DocumentSnapshot`]s; history
//! and selection are session state and are not part of it.

use super::{CanvasDocument, DocumentState, History, validate_page};
use crate::constants::MAX_HISTORY_ENTRIES;
use crate::error::PersistError;
use crate::spatial_index::SpatialIndex;
use crate::types::{CanvasConfig, CanvasElement};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Current document schema version
pub const SCHEMA_VERSION: u32 = 1;

/// A versioned, self-contained copy of a document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub version: u32,
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    pub config: CanvasConfig,
    pub elements: Vec<CanvasElement>,
    /// Next id to hand out, so ids are never reused across sessions
    pub next_element_id: u64,
}

impl DocumentSnapshot {
    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl CanvasDocument {
    /// Capture the document for persistence
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            version: SCHEMA_VERSION,
            id: self.id,
            template_id: self.template_id.clone(),
            config: self.config.clone(),
            elements: self.elements.clone(),
            next_element_id: self.next_element_id,
        }
    }

    /// Rehydrate an editing session.
    ///
    /// Rejects snapshots from a newer schema, duplicated element ids and
    /// invalid geometry. Elements are ordered by their stored z-index and
    /// renumbered densely. The loaded state becomes the history baseline.
    pub fn from_snapshot(snapshot: DocumentSnapshot) -> Result<Self, PersistError> {
        Self::from_snapshot_with_limit(snapshot, MAX_HISTORY_ENTRIES)
    }

    /// [`from_snapshot`](Self::from_snapshot) keeping at most `history_limit`
    /// undoable entries.
    pub fn from_snapshot_with_limit(
        snapshot: DocumentSnapshot,
        history_limit: usize,
    ) -> Result<Self, PersistError> {
        if snapshot.version > SCHEMA_VERSION {
            return Err(PersistError::UnsupportedVersion {
                found: snapshot.version,
                supported: SCHEMA_VERSION,
            });
        }

        let mut seen = HashSet::with_capacity(snapshot.elements.len());
        for element in &snapshot.elements {
            if !seen.insert(element.id) {
                return Err(PersistError::Corrupt(format!(
                    "element id {} appears more than once",
                    element.id
                )));
            }
            element
                .geometry
                .validate()
                .map_err(|e| PersistError::Corrupt(format!("element {}: {e}", element.id)))?;
        }
        validate_page(snapshot.config.page).map_err(|e| PersistError::Corrupt(e.to_string()))?;

        let mut elements = snapshot.elements;
        // Stable sort keeps stored order for equal z-indices
        elements.sort_by_key(|e| e.z_index);
        for (z, element) in elements.iter_mut().enumerate() {
            element.z_index = z as u32;
        }

        let highest = elements.iter().map(|e| e.id.0).max().unwrap_or(0);
        let next_element_id = snapshot.next_element_id.max(highest + 1);

        let mut document = Self::new(snapshot.config);
        document.id = snapshot.id;
        document.template_id = snapshot.template_id;
        document.spatial_index = SpatialIndex::from_elements(&elements);
        document.history = History::new(
            DocumentState {
                elements: elements.clone(),
                page: document.config.page,
                template_id: document.template_id.clone(),
            },
            history_limit,
        );
        document.elements = elements;
        document.next_element_id = next_element_id;

        tracing::debug!(
            document = %document.id,
            elements = document.elements.len(),
            "Loaded document snapshot"
        );
        Ok(document)
    }

    /// Write the document as JSON, atomically replacing `path`.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let json = self.snapshot().to_json()?;
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        file.persist(path)?;

        tracing::debug!(path = %path.display(), "Saved document");
        Ok(())
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        Self::load_from_path_with_limit(path, MAX_HISTORY_ENTRIES)
    }

    pub fn load_from_path_with_limit(
        path: impl AsRef<Path>,
        history_limit: usize,
    ) -> Result<Self, PersistError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_snapshot_with_limit(DocumentSnapshot::from_json(&json)?, history_limit)
    }
}
