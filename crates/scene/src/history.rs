//! Linear undo/redo over value snapshots.
//!
//! The present state itself is owned by the caller (the store); the history
//! keeps copies of superseded states in `past` and undone ones in `future`,
//! plus the description of how each state was reached.

use std::fmt;

pub const INITIAL_DESCRIPTION: &str = "Open document";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    NothingToUndo,
    NothingToRedo,
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::NothingToUndo => write!(f, "nothing to undo"),
            HistoryError::NothingToRedo => write!(f, "nothing to redo"),
        }
    }
}

impl std::error::Error for HistoryError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryConfig {
    /// Maximum `past` depth; the oldest entry is dropped beyond it.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry<S> {
    pub snapshot: S,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct History<S> {
    past: Vec<HistoryEntry<S>>,
    future: Vec<HistoryEntry<S>>,
    present_description: String,
    config: HistoryConfig,
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<S> History<S> {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            past: Vec::new(),
            future: Vec::new(),
            present_description: INITIAL_DESCRIPTION.to_string(),
            config,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn present_description(&self) -> &str {
        &self.present_description
    }

    /// Descriptions from oldest to the present state.
    pub fn descriptions(&self) -> Vec<&str> {
        self.past
            .iter()
            .map(|e| e.description.as_str())
            .chain(std::iter::once(self.present_description.as_str()))
            .collect()
    }

    /// Descriptions of undone states, next redo first.
    pub fn redo_descriptions(&self) -> Vec<&str> {
        self.future
            .iter()
            .rev()
            .map(|e| e.description.as_str())
            .collect()
    }

    /// Records that `previous` was superseded by a new present reached via
    /// `description`. Always clears `future`.
    pub fn record(&mut self, previous: S, description: impl Into<String>) {
        let superseded = std::mem::replace(&mut self.present_description, description.into());
        self.past.push(HistoryEntry {
            snapshot: previous,
            description: superseded,
        });
        self.future.clear();

        if let Some(limit) = self.config.limit {
            let excess = self.past.len().saturating_sub(limit);
            self.past.drain(..excess);
        }
    }

    /// Swaps `present` for the most recent past snapshot.
    ///
    /// Returns the restored snapshot and the description of the change undone.
    pub fn undo(&mut self, present: S) -> Result<(S, String), HistoryError> {
        let entry = self.past.pop().ok_or(HistoryError::NothingToUndo)?;
        let undone = std::mem::replace(&mut self.present_description, entry.description);
        self.future.push(HistoryEntry {
            snapshot: present,
            description: undone.clone(),
        });
        Ok((entry.snapshot, undone))
    }

    /// Mirror of [`History::undo`]; returns the description of the change redone.
    pub fn redo(&mut self, present: S) -> Result<(S, String), HistoryError> {
        let entry = self.future.pop().ok_or(HistoryError::NothingToRedo)?;
        let superseded = std::mem::replace(&mut self.present_description, entry.description);
        self.past.push(HistoryEntry {
            snapshot: present,
            description: superseded,
        });
        Ok((entry.snapshot, self.present_description.clone()))
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.present_description = INITIAL_DESCRIPTION.to_string();
    }
}
