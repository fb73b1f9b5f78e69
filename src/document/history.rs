//! Linear undo/redo history.
//!
//! Entries are full snapshots of the undoable document state. Entry 0 is the
//! baseline the document started from; the cursor always points at the entry
//! matching the live document.

use crate::constants::MAX_HISTORY_ENTRIES;
use crate::types::{CanvasElement, PageSetup};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// The part of a document that undo/redo restores.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentState {
    pub elements: Vec<CanvasElement>,
    pub page: PageSetup,
    /// Template the layout was bound from
    pub template_id: Option<String>,
}

/// One immutable, labeled snapshot.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    label: String,
    timestamp: DateTime<Utc>,
    state: DocumentState,
}

impl HistoryEntry {
    fn new(label: impl Into<String>, state: DocumentState) -> Self {
        Self {
            label: label.into(),
            timestamp: Utc::now(),
            state,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn state(&self) -> &DocumentState {
        &self.state
    }
}

/// Label and time of a history entry, as exposed to the editor UI
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoryEntryInfo {
    pub label: String,
    pub timestamp: DateTime<Utc>,
}

/// Read-only view of the history for the editor UI.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
    pub current_index: usize,
    pub entries: Vec<HistoryEntryInfo>,
}

/// Bounded linear history with a cursor.
#[derive(Clone, Debug)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    limit: usize,
}

impl History {
    /// Start a history from the baseline state, keeping at most `limit`
    /// entries besides the baseline.
    pub fn new(initial: DocumentState, limit: usize) -> Self {
        Self {
            entries: vec![HistoryEntry::new("Initial state", initial)],
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Append a snapshot after the cursor. Entries past the cursor are
    /// discarded; the oldest entries go once the limit is exceeded.
    pub fn record(&mut self, label: impl Into<String>, state: DocumentState) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(HistoryEntry::new(label, state));

        let overflow = self.entries.len().saturating_sub(self.limit + 1);
        if overflow > 0 {
            self.entries.drain(..overflow);
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back, returning the state to restore
    pub fn undo(&mut self) -> Option<&DocumentState> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor].state)
    }

    /// Step forward, returning the state to restore
    pub fn redo(&mut self) -> Option<&DocumentState> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(&self.entries[self.cursor].state)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn current_index(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn state(&self) -> HistoryState {
        HistoryState {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            current_index: self.cursor,
            entries: self
                .entries
                .iter()
                .map(|e| HistoryEntryInfo {
                    label: e.label.clone(),
                    timestamp: e.timestamp,
                })
                .collect(),
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(
            DocumentState {
                elements: Vec::new(),
                page: PageSetup::default(),
                template_id: None,
            },
            MAX_HISTORY_ENTRIES,
        )
    }
}
