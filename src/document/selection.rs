//! Selection state of a canvas document.
//!
//! Selection is ephemeral editor state: it is never recorded in history.

use crate::types::ElementId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a `select` call combines with the current selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Selection becomes exactly the given ids
    #[default]
    Replace,
    /// Given ids are added
    Add,
    /// Each given id flips between selected and unselected
    Toggle,
}

/// Set of selected element ids plus the most recently selected one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    ids: BTreeSet<ElementId>,
    primary: Option<ElementId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply<I>(&mut self, ids: I, mode: SelectionMode)
    where
        I: IntoIterator<Item = ElementId>,
    {
        match mode {
            SelectionMode::Replace => {
                self.ids.clear();
                self.primary = None;
                for id in ids {
                    self.ids.insert(id);
                    self.primary = Some(id);
                }
            }
            SelectionMode::Add => {
                for id in ids {
                    self.ids.insert(id);
                    self.primary = Some(id);
                }
            }
            SelectionMode::Toggle => {
                for id in ids {
                    if self.ids.remove(&id) {
                        if self.primary == Some(id) {
                            self.primary = None;
                        }
                    } else {
                        self.ids.insert(id);
                        self.primary = Some(id);
                    }
                }
            }
        }
        if self.primary.is_none() {
            self.primary = self.ids.iter().next_back().copied();
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.primary = None;
    }

    pub fn remove(&mut self, id: ElementId) -> bool {
        let removed = self.ids.remove(&id);
        if self.primary == Some(id) {
            self.primary = self.ids.iter().next_back().copied();
        }
        removed
    }

    /// Keep only ids for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(ElementId) -> bool) {
        self.ids.retain(|id| keep(*id));
        if self.primary.is_some_and(|p| !self.ids.contains(&p)) {
            self.primary = self.ids.iter().next_back().copied();
        }
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.ids.contains(&id)
    }

    /// Most recently selected id still in the selection
    pub fn primary(&self) -> Option<ElementId> {
        self.primary
    }

    pub fn ids(&self) -> &BTreeSet<ElementId> {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
